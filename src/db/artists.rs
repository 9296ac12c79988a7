use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{collect_rows, Catalog};
use crate::error::{StoreContext, StoreError};
use crate::models::Artist;

const ENTITY: &str = "artist";

impl Catalog {
    /// Insert a new artist and return its generated id.
    pub fn create_artist(&self, name: &str) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO Artist (Name) VALUES (?1)", params![name])
            .map_err(|err| StoreError::from_write(err, ENTITY, name, "failed to insert artist"))?;

        let id = conn.last_insert_rowid();
        debug!(id, name, "created artist");
        Ok(id)
    }

    /// Every artist, ordered by name.
    pub fn artists(&self) -> Result<Vec<Artist>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT ArtistID, Name FROM Artist ORDER BY Name")
            .store_context("failed to prepare artist query")?;

        collect_rows(&mut stmt, [], "failed to load artists", |row| {
            Ok(Artist {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
    }

    /// Exact, case-sensitive name lookup. `None` when no artist matches.
    pub fn artist_by_name(&self, name: &str) -> Result<Option<Artist>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT ArtistID, Name FROM Artist WHERE Name = ?1",
                params![name],
                |row| {
                    Ok(Artist {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .store_context("failed to look up artist")
    }

    /// Rename every artist called `old_name`. Returns whether anything changed.
    pub fn update_artist(&self, old_name: &str, new_name: &str) -> Result<bool, StoreError> {
        let updated = self
            .conn()?
            .execute(
                "UPDATE Artist SET Name = ?1 WHERE Name = ?2",
                params![new_name, old_name],
            )
            .map_err(|err| {
                StoreError::from_write(err, ENTITY, new_name, "failed to update artist")
            })?;

        debug!(old_name, new_name, updated, "renamed artist");
        Ok(updated > 0)
    }

    /// Delete every artist called `name`. Links in `Plays` are left in place.
    pub fn delete_artist(&self, name: &str) -> Result<bool, StoreError> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM Artist WHERE Name = ?1", params![name])
            .store_context("failed to delete artist")?;

        debug!(name, deleted, "deleted artist");
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Catalog, SchemaSource};
    use crate::error::StoreError;

    fn catalog() -> Catalog {
        Catalog::open_in_memory(&SchemaSource::Bundled).unwrap()
    }

    fn names(catalog: &Catalog) -> Vec<String> {
        catalog
            .artists()
            .unwrap()
            .into_iter()
            .map(|artist| artist.name)
            .collect()
    }

    #[test]
    fn created_artist_can_be_fetched_by_name() {
        let catalog = catalog();
        let id = catalog.create_artist("Michael Jackson").unwrap();

        let artist = catalog.artist_by_name("Michael Jackson").unwrap().unwrap();
        assert_eq!(artist.id, id);
        assert_eq!(artist.name, "Michael Jackson");
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let catalog = catalog();
        catalog.create_artist("Prince").unwrap();

        assert!(catalog.artist_by_name("prince").unwrap().is_none());
        assert!(catalog.artist_by_name("Prince ").unwrap().is_none());
    }

    #[test]
    fn listing_is_sorted_regardless_of_insertion_order() {
        let catalog = catalog();
        assert!(catalog.artists().unwrap().is_empty());

        for name in ["Queen", "ABBA", "Madonna", "abba"] {
            catalog.create_artist(name).unwrap();
        }

        // BINARY collation: uppercase sorts before lowercase.
        assert_eq!(names(&catalog), vec!["ABBA", "Madonna", "Queen", "abba"]);
    }

    #[test]
    fn ids_are_never_reused() {
        let catalog = catalog();
        let first = catalog.create_artist("Blondie").unwrap();
        catalog.delete_artist("Blondie").unwrap();
        let second = catalog.create_artist("Blondie").unwrap();

        assert!(second > first);
    }

    #[test]
    fn duplicate_name_is_a_constraint_violation() {
        let catalog = catalog();
        catalog.create_artist("Queen").unwrap();

        let err = catalog.create_artist("Queen").unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation { .. }));
        assert_eq!(names(&catalog), vec!["Queen"]);
    }

    #[test]
    fn update_reports_whether_a_row_matched() {
        let catalog = catalog();
        catalog.create_artist("Prince").unwrap();

        assert!(catalog.update_artist("Prince", "The Artist").unwrap());
        assert!(!catalog.update_artist("Prince", "Someone Else").unwrap());
        assert_eq!(names(&catalog), vec!["The Artist"]);
    }

    #[test]
    fn renaming_onto_an_existing_name_fails() {
        let catalog = catalog();
        catalog.create_artist("A").unwrap();
        catalog.create_artist("B").unwrap();

        let err = catalog.update_artist("A", "B").unwrap_err();
        assert!(matches!(
            err,
            StoreError::ConstraintViolation { ref key, .. } if key == "B"
        ));
        assert_eq!(names(&catalog), vec!["A", "B"]);
    }

    #[test]
    fn deleting_an_unknown_name_changes_nothing() {
        let catalog = catalog();
        catalog.create_artist("Queen").unwrap();

        assert!(!catalog.delete_artist("Nobody").unwrap());
        assert_eq!(names(&catalog), vec!["Queen"]);

        assert!(catalog.delete_artist("Queen").unwrap());
        assert!(catalog.artists().unwrap().is_empty());
    }
}
