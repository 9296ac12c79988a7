//! Song-centred junction tables. Links are accepted without checking that
//! either endpoint exists; [`Catalog::prune_dangling_links`] is the explicit
//! cleanup step after deletes.

use std::fmt;

use rusqlite::params;
use tracing::{debug, warn};

use super::albums::album_from_row;
use super::{collect_rows, Catalog};
use crate::error::{StoreContext, StoreError};
use crate::models::{Album, Artist, Category};

/// The three many-to-many relationships, each pairing a song with one other
/// entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Song ↔ Artist.
    Plays,
    /// Song ↔ Category.
    IsIn,
    /// Song ↔ Album.
    IsOn,
}

impl Relation {
    pub const ALL: [Relation; 3] = [Relation::Plays, Relation::IsIn, Relation::IsOn];

    fn table(self) -> &'static str {
        match self {
            Relation::Plays => "Plays",
            Relation::IsIn => "IsIn",
            Relation::IsOn => "IsOn",
        }
    }

    /// Column holding the non-song endpoint.
    fn other_column(self) -> &'static str {
        match self {
            Relation::Plays => "ArtistID",
            Relation::IsIn => "CategoryID",
            Relation::IsOn => "AlbumID",
        }
    }

    fn other_table(self) -> &'static str {
        match self {
            Relation::Plays => "Artist",
            Relation::IsIn => "Category",
            Relation::IsOn => "Album",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Rows removed by [`Catalog::prune_dangling_links`], per relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrunedLinks {
    pub plays: usize,
    pub is_in: usize,
    pub is_on: usize,
}

impl PrunedLinks {
    /// Rows removed across all three relationships.
    pub fn total(&self) -> usize {
        self.plays + self.is_in + self.is_on
    }
}

impl Catalog {
    /// Store the pair unless it is already present. Returns whether a new row
    /// was written.
    pub fn link(&self, relation: Relation, song_id: i64, other_id: i64) -> Result<bool, StoreError> {
        let sql = format!(
            "INSERT OR IGNORE INTO {} (SongID, {}) VALUES (?1, ?2)",
            relation.table(),
            relation.other_column()
        );
        let inserted = self
            .conn()?
            .execute(&sql, params![song_id, other_id])
            .store_context("failed to link song")?;

        debug!(%relation, song_id, other_id, inserted, "linked song");
        Ok(inserted > 0)
    }

    /// Remove the pair if present. Returns whether it existed.
    pub fn unlink(
        &self,
        relation: Relation,
        song_id: i64,
        other_id: i64,
    ) -> Result<bool, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE SongID = ?1 AND {} = ?2",
            relation.table(),
            relation.other_column()
        );
        let deleted = self
            .conn()?
            .execute(&sql, params![song_id, other_id])
            .store_context("failed to unlink song")?;

        debug!(%relation, song_id, other_id, deleted, "unlinked song");
        Ok(deleted > 0)
    }

    /// Artists playing the song, ordered by name.
    pub fn artists_for_song(&self, song_id: i64) -> Result<Vec<Artist>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare(
                "SELECT a.ArtistID, a.Name
                 FROM Artist a
                 INNER JOIN Plays p ON p.ArtistID = a.ArtistID
                 WHERE p.SongID = ?1
                 ORDER BY a.Name",
            )
            .store_context("failed to prepare song artists query")?;

        collect_rows(&mut stmt, [song_id], "failed to load song artists", |row| {
            Ok(Artist {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
    }

    /// Categories the song is in, ordered by name.
    pub fn categories_for_song(&self, song_id: i64) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare(
                "SELECT c.CategoryID, c.CategoryName
                 FROM Category c
                 INNER JOIN IsIn i ON i.CategoryID = c.CategoryID
                 WHERE i.SongID = ?1
                 ORDER BY c.CategoryName",
            )
            .store_context("failed to prepare song categories query")?;

        collect_rows(
            &mut stmt,
            [song_id],
            "failed to load song categories",
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }

    /// Albums the song is on, ordered by title.
    pub fn albums_for_song(&self, song_id: i64) -> Result<Vec<Album>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare(
                "SELECT a.AlbumID, a.Title, a.Year
                 FROM Album a
                 INNER JOIN IsOn i ON i.AlbumID = a.AlbumID
                 WHERE i.SongID = ?1
                 ORDER BY a.Title",
            )
            .store_context("failed to prepare song albums query")?;

        collect_rows(&mut stmt, [song_id], "failed to load song albums", album_from_row)
    }

    /// Delete junction rows whose song or other endpoint no longer exists.
    pub fn prune_dangling_links(&self) -> Result<PrunedLinks, StoreError> {
        let conn = self.conn()?;
        let mut pruned = PrunedLinks::default();

        for relation in Relation::ALL {
            let other = relation.other_column();
            let sql = format!(
                "DELETE FROM {table}
                 WHERE SongID NOT IN (SELECT SongID FROM Song)
                    OR {other} NOT IN (SELECT {other} FROM {other_table})",
                table = relation.table(),
                other_table = relation.other_table(),
            );
            let removed = conn
                .execute(&sql, [])
                .store_context("failed to prune dangling links")?;

            match relation {
                Relation::Plays => pruned.plays = removed,
                Relation::IsIn => pruned.is_in = removed,
                Relation::IsOn => pruned.is_on = removed,
            }
        }

        if pruned.total() > 0 {
            warn!(?pruned, "removed dangling links");
        }
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SchemaSource;

    fn catalog() -> Catalog {
        Catalog::open_in_memory(&SchemaSource::Bundled).unwrap()
    }

    fn pair_count(catalog: &Catalog, relation: Relation) -> i64 {
        catalog
            .conn()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {relation}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn linking_twice_stores_one_pair() {
        let catalog = catalog();
        let song = catalog.create_song("Beat It").unwrap();
        let artist = catalog.create_artist("Michael Jackson").unwrap();

        assert!(catalog.link(Relation::Plays, song, artist).unwrap());
        assert!(!catalog.link(Relation::Plays, song, artist).unwrap());

        assert_eq!(pair_count(&catalog, Relation::Plays), 1);
        assert_eq!(catalog.artists_for_song(song).unwrap().len(), 1);
    }

    #[test]
    fn unlinking_an_absent_pair_is_a_no_op() {
        let catalog = catalog();
        let song = catalog.create_song("Beat It").unwrap();
        let album = catalog.create_album("Thriller", 1982).unwrap();

        assert!(!catalog.unlink(Relation::IsOn, song, album).unwrap());

        catalog.link(Relation::IsOn, song, album).unwrap();
        assert!(catalog.unlink(Relation::IsOn, song, album).unwrap());
        assert!(catalog.albums_for_song(song).unwrap().is_empty());
    }

    #[test]
    fn related_rows_are_ordered_by_key() {
        let catalog = catalog();
        let song = catalog.create_song("Mixed").unwrap();
        for name in ["Soul", "Funk", "Pop"] {
            let id = catalog.create_category(name).unwrap();
            catalog.link(Relation::IsIn, song, id).unwrap();
        }
        let later = catalog.create_album("Zebra", 2001).unwrap();
        let earlier = catalog.create_album("Alpha", 2020).unwrap();
        catalog.link(Relation::IsOn, song, later).unwrap();
        catalog.link(Relation::IsOn, song, earlier).unwrap();

        let categories: Vec<_> = catalog
            .categories_for_song(song)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(categories, vec!["Funk", "Pop", "Soul"]);

        let albums: Vec<_> = catalog
            .albums_for_song(song)
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(albums, vec!["Alpha", "Zebra"]);
    }

    #[test]
    fn unknown_song_has_no_relations() {
        let catalog = catalog();
        assert!(catalog.artists_for_song(42).unwrap().is_empty());
        assert!(catalog.categories_for_song(42).unwrap().is_empty());
        assert!(catalog.albums_for_song(42).unwrap().is_empty());
    }

    #[test]
    fn links_to_missing_rows_are_accepted() {
        let catalog = catalog();
        assert!(catalog.link(Relation::Plays, 7, 9).unwrap());
        assert_eq!(pair_count(&catalog, Relation::Plays), 1);
    }

    #[test]
    fn deletes_leave_links_until_pruned() {
        let catalog = catalog();
        let song = catalog.create_song("Beat It").unwrap();
        let kept = catalog.create_song("Billie Jean").unwrap();
        let artist = catalog.create_artist("Michael Jackson").unwrap();
        let album = catalog.create_album("Thriller", 1982).unwrap();
        let pop = catalog.create_category("Pop").unwrap();

        catalog.link(Relation::Plays, song, artist).unwrap();
        catalog.link(Relation::Plays, kept, artist).unwrap();
        catalog.link(Relation::IsOn, song, album).unwrap();
        catalog.link(Relation::IsOn, kept, album).unwrap();
        catalog.link(Relation::IsIn, kept, pop).unwrap();

        assert!(catalog.delete_song("Beat It").unwrap());
        assert!(catalog.delete_category("Pop").unwrap());
        assert_eq!(pair_count(&catalog, Relation::Plays), 2);
        assert_eq!(pair_count(&catalog, Relation::IsIn), 1);

        let pruned = catalog.prune_dangling_links().unwrap();
        assert_eq!(
            pruned,
            PrunedLinks {
                plays: 1,
                is_in: 1,
                is_on: 1,
            }
        );
        assert_eq!(pruned.total(), 3);

        assert_eq!(catalog.artists_for_song(kept).unwrap().len(), 1);
        assert_eq!(catalog.albums_for_song(kept).unwrap().len(), 1);
        assert_eq!(catalog.prune_dangling_links().unwrap().total(), 0);
    }
}
