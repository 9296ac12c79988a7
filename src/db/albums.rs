use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{collect_rows, Catalog};
use crate::error::{StoreContext, StoreError};
use crate::models::Album;

const ENTITY: &str = "album";

pub(super) fn album_from_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
    })
}

impl Catalog {
    /// Insert an album with its release year and return the generated id. A
    /// title already in use fails with `ConstraintViolation`.
    pub fn create_album(&self, title: &str, year: i64) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO Album (Title, Year) VALUES (?1, ?2)",
            params![title, year],
        )
        .map_err(|err| StoreError::from_write(err, ENTITY, title, "failed to insert album"))?;

        let id = conn.last_insert_rowid();
        debug!(id, title, year, "created album");
        Ok(id)
    }

    /// Every album, ordered by title. The year plays no part in the ordering.
    pub fn albums(&self) -> Result<Vec<Album>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT AlbumID, Title, Year FROM Album ORDER BY Title")
            .store_context("failed to prepare album query")?;

        collect_rows(&mut stmt, [], "failed to load albums", album_from_row)
    }

    /// Exact, case-sensitive title lookup.
    pub fn album_by_title(&self, title: &str) -> Result<Option<Album>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT AlbumID, Title, Year FROM Album WHERE Title = ?1",
                params![title],
                album_from_row,
            )
            .optional()
            .store_context("failed to look up album")
    }

    /// Rewrite title and year of every album titled `old_title`.
    pub fn update_album(
        &self,
        old_title: &str,
        new_title: &str,
        new_year: i64,
    ) -> Result<bool, StoreError> {
        let updated = self
            .conn()?
            .execute(
                "UPDATE Album SET Title = ?1, Year = ?2 WHERE Title = ?3",
                params![new_title, new_year, old_title],
            )
            .map_err(|err| {
                StoreError::from_write(err, ENTITY, new_title, "failed to update album")
            })?;

        debug!(old_title, new_title, new_year, updated, "updated album");
        Ok(updated > 0)
    }

    /// Links in `IsOn` survive the delete.
    pub fn delete_album(&self, title: &str) -> Result<bool, StoreError> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM Album WHERE Title = ?1", params![title])
            .store_context("failed to delete album")?;

        debug!(title, deleted, "deleted album");
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Catalog, SchemaSource};
    use crate::models::Album;

    fn catalog() -> Catalog {
        Catalog::open_in_memory(&SchemaSource::Bundled).unwrap()
    }

    #[test]
    fn album_keeps_its_year() {
        let catalog = catalog();
        let id = catalog.create_album("Thriller", 1982).unwrap();

        assert_eq!(
            catalog.album_by_title("Thriller").unwrap(),
            Some(Album {
                id,
                title: "Thriller".into(),
                year: 1982,
            })
        );
    }

    #[test]
    fn update_rewrites_title_and_year() {
        let catalog = catalog();
        catalog.create_album("Bad", 1986).unwrap();

        assert!(catalog.update_album("Bad", "Bad (Special Edition)", 2001).unwrap());
        assert!(catalog.album_by_title("Bad").unwrap().is_none());

        let album = catalog.album_by_title("Bad (Special Edition)").unwrap().unwrap();
        assert_eq!(album.year, 2001);
        assert!(!catalog.update_album("Bad", "Whatever", 1999).unwrap());
    }

    #[test]
    fn listing_orders_by_title_not_year() {
        let catalog = catalog();
        catalog.create_album("Thriller", 1982).unwrap();
        catalog.create_album("Bad", 1987).unwrap();
        catalog.create_album("Off the Wall", 1979).unwrap();

        let titles: Vec<_> = catalog.albums().unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["Bad", "Off the Wall", "Thriller"]);
    }

    #[test]
    fn delete_by_unknown_title_returns_false() {
        let catalog = catalog();
        catalog.create_album("Thriller", 1982).unwrap();

        assert!(!catalog.delete_album("Dangerous").unwrap());
        assert_eq!(catalog.albums().unwrap().len(), 1);
        assert!(catalog.delete_album("Thriller").unwrap());
        assert!(catalog.albums().unwrap().is_empty());
    }
}
