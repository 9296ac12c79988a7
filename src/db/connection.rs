use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::info;

use super::schema::{self, SchemaSource, SchemaStatus};
use crate::error::{StoreContext, StoreError};

/// Backing storage for a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Handle over the catalog database. It owns the single connection for the
/// process lifetime; once closed every operation fails with
/// [`StoreError::NotInitialized`].
pub struct Catalog {
    conn: Option<Connection>,
    location: StoreLocation,
    schema_status: SchemaStatus,
}

impl Catalog {
    /// Open (creating if needed) the database file at `path` and make sure the
    /// schema exists.
    pub fn open(path: &Path, schema: &SchemaSource) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                StoreError::backend(
                    format!("failed to create data directory {}", parent.display()),
                    err,
                )
            })?;
        }

        let conn = Connection::open(path).map_err(|err| {
            StoreError::backend(format!("failed to open {}", path.display()), err)
        })?;
        info!(path = %path.display(), "opened catalog database");

        Self::with_connection(conn, StoreLocation::File(path.to_path_buf()), schema)
    }

    /// Private database that disappears with the handle. Used by tests and
    /// throwaway sessions.
    pub fn open_in_memory(schema: &SchemaSource) -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().store_context("failed to open in-memory database")?;
        Self::with_connection(conn, StoreLocation::Memory, schema)
    }

    fn with_connection(
        conn: Connection,
        location: StoreLocation,
        schema: &SchemaSource,
    ) -> Result<Self, StoreError> {
        let schema_status = schema::initialize(&conn, schema)?;
        Ok(Self {
            conn: Some(conn),
            location,
            schema_status,
        })
    }

    /// Release the connection. Calling it twice is harmless.
    pub fn close(&mut self) -> Result<(), StoreError> {
        match self.conn.take() {
            Some(conn) => {
                conn.close()
                    .map_err(|(_, err)| StoreError::backend("failed to close database", err))?;
                info!(location = ?self.location, "closed catalog database");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// `false` once [`Catalog::close`] has run.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// The file or in-memory database this handle was opened on.
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Whether opening created the schema or found it already in place.
    pub fn schema_status(&self) -> SchemaStatus {
        self.schema_status
    }

    pub(crate) fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Relation;

    #[test]
    fn closed_catalog_reports_not_initialized() {
        let mut catalog = Catalog::open_in_memory(&SchemaSource::Bundled).unwrap();
        assert!(catalog.is_open());

        catalog.close().unwrap();
        catalog.close().unwrap();

        assert!(!catalog.is_open());
        assert!(matches!(catalog.artists(), Err(StoreError::NotInitialized)));
        assert!(matches!(
            catalog.create_song("Billie Jean"),
            Err(StoreError::NotInitialized)
        ));
        assert!(matches!(
            catalog.songs_by_artist("Michael Jackson"),
            Err(StoreError::NotInitialized)
        ));
    }

    #[test]
    fn every_kind_of_operation_fails_after_close() {
        let mut catalog = Catalog::open_in_memory(&SchemaSource::Bundled).unwrap();
        let song = catalog.create_song("Beat It").unwrap();
        let artist = catalog.create_artist("Michael Jackson").unwrap();
        catalog.close().unwrap();

        fn closed<T>(result: Result<T, StoreError>) -> bool {
            matches!(result, Err(StoreError::NotInitialized))
        }

        assert!(closed(catalog.link(Relation::Plays, song, artist)));
        assert!(closed(catalog.unlink(Relation::Plays, song, artist)));
        assert!(closed(catalog.artists_for_song(song)));
        assert!(closed(catalog.prune_dangling_links()));

        assert!(closed(catalog.update_artist("Michael Jackson", "MJ")));
        assert!(closed(catalog.update_category("Pop", "Rock")));
        assert!(closed(catalog.update_album("Thriller", "Bad", 1987)));
        assert!(closed(catalog.update_song("Beat It", "Thriller")));

        assert!(closed(catalog.delete_artist("Michael Jackson")));
        assert!(closed(catalog.delete_category("Pop")));
        assert!(closed(catalog.delete_album("Thriller")));
        assert!(closed(catalog.delete_song("Beat It")));

        assert!(closed(catalog.artist_by_name("Michael Jackson")));
        assert!(closed(catalog.category_by_name("Pop")));
        assert!(closed(catalog.album_by_title("Thriller")));
        assert!(closed(catalog.song_by_title("Beat It")));

        assert!(closed(catalog.song_overviews()));
        assert!(closed(catalog.artists_with_albums_in_year(1982)));
        assert!(closed(catalog.albums_in_category("Pop")));
    }

    #[test]
    fn reopening_a_file_keeps_its_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("music.sqlite");

        let mut first = Catalog::open(&path, &SchemaSource::Bundled).unwrap();
        assert_eq!(first.schema_status(), SchemaStatus::Created);
        first.create_artist("Queen").unwrap();
        first.close().unwrap();

        let second = Catalog::open(&path, &SchemaSource::Bundled).unwrap();
        assert_eq!(second.schema_status(), SchemaStatus::Reused);
        assert_eq!(second.location(), &StoreLocation::File(path.clone()));
        let names: Vec<_> = second.artists().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Queen".to_string()]);
    }

    #[test]
    fn missing_schema_file_aborts_open() {
        let dir = tempfile::tempdir().unwrap();
        let source = SchemaSource::File(dir.path().join("absent.sql"));

        let result = Catalog::open(&dir.path().join("music.sqlite"), &source);
        assert!(matches!(result, Err(StoreError::SchemaNotFound { .. })));
    }
}
