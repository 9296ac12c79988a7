//! Row types mirroring the SQLite schema plus the denormalized rows produced
//! by the report queries. They stay plain data holders; persistence lives in
//! `db` and presentation in `ui`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// An album is addressed by title; the year is what the year report filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub year: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Album {
    /// `Title (Year)`, the form every list view shows albums in.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A song together with the names of everything linked to it. Each list is
/// ordered by the related entity's natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongOverview {
    pub song: Song,
    pub artists: Vec<String>,
    pub albums: Vec<String>,
    pub categories: Vec<String>,
}

impl SongOverview {
    /// `Title - Artist A, Artist B`, omitting the hyphen for songs nobody plays.
    pub fn display_title(&self) -> String {
        if self.artists.is_empty() {
            self.song.title.clone()
        } else {
            format!("{} - {}", self.song.title, self.artists.join(", "))
        }
    }
}

/// Row of the songs-by-artist report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongCredit {
    pub song_title: String,
    pub artist_name: String,
}

/// Row of the albums-in-category report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumCredit {
    pub album_title: String,
    pub artist_name: String,
}
