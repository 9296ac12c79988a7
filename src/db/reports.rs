//! Fixed read-only report queries. Each one joins across the junction tables
//! and returns denormalized rows ready for display; a parameter matching
//! nothing yields an empty list.

use rusqlite::params;

use super::{collect_rows, Catalog};
use crate::error::{StoreContext, StoreError};
use crate::models::{AlbumCredit, SongCredit};

impl Catalog {
    /// Every song the named artist plays.
    pub fn songs_by_artist(&self, artist_name: &str) -> Result<Vec<SongCredit>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare(
                "SELECT s.Title, a.Name
                 FROM Song s
                 INNER JOIN Plays p ON p.SongID = s.SongID
                 INNER JOIN Artist a ON a.ArtistID = p.ArtistID
                 WHERE a.Name = ?1
                 ORDER BY a.Name, s.Title",
            )
            .store_context("failed to prepare songs by artist report")?;

        collect_rows(
            &mut stmt,
            params![artist_name],
            "failed to run songs by artist report",
            |row| {
                Ok(SongCredit {
                    song_title: row.get(0)?,
                    artist_name: row.get(1)?,
                })
            },
        )
    }

    /// Artists playing a song that sits on an album from `year`, one row per
    /// artist/song/album path. An artist with several such songs appears once
    /// per song. The filter is the album of the song, not anything stored on
    /// the artist.
    pub fn artists_with_albums_in_year(&self, year: i64) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare(
                "SELECT a.Name
                 FROM Artist a
                 INNER JOIN Plays p ON p.ArtistID = a.ArtistID
                 INNER JOIN Song s ON s.SongID = p.SongID
                 INNER JOIN IsOn io ON io.SongID = s.SongID
                 INNER JOIN Album al ON al.AlbumID = io.AlbumID
                 WHERE al.Year = ?1
                 ORDER BY a.Name",
            )
            .store_context("failed to prepare artists by year report")?;

        collect_rows(
            &mut stmt,
            params![year],
            "failed to run artists by year report",
            |row| row.get(0),
        )
    }

    /// Album/artist pairs for albums carrying a song of the category, where the
    /// artist plays that same song.
    pub fn albums_in_category(&self, category_name: &str) -> Result<Vec<AlbumCredit>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare(
                "SELECT DISTINCT al.Title, a.Name
                 FROM Album al
                 INNER JOIN IsOn io ON io.AlbumID = al.AlbumID
                 INNER JOIN Song s ON s.SongID = io.SongID
                 INNER JOIN Plays p ON p.SongID = s.SongID
                 INNER JOIN Artist a ON a.ArtistID = p.ArtistID
                 INNER JOIN IsIn ii ON ii.SongID = s.SongID
                 INNER JOIN Category c ON c.CategoryID = ii.CategoryID
                 WHERE c.CategoryName = ?1
                 ORDER BY al.Title, a.Name",
            )
            .store_context("failed to prepare albums by category report")?;

        collect_rows(
            &mut stmt,
            params![category_name],
            "failed to run albums by category report",
            |row| {
                Ok(AlbumCredit {
                    album_title: row.get(0)?,
                    artist_name: row.get(1)?,
                })
            },
        )
    }
}
