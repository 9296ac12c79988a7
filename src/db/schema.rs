use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::PathBuf;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{StoreContext, StoreError};

/// Definition script shipped with the binary.
pub const BUNDLED_SCHEMA: &str = include_str!("../../schema.sql");

/// Tables the store issues statements against. A definition script that does
/// not create all of them is rejected.
pub const REQUIRED_TABLES: [&str; 7] = [
    "Artist", "Category", "Album", "Song", "Plays", "IsIn", "IsOn",
];

/// Where the schema definition script comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaSource {
    #[default]
    Bundled,
    File(PathBuf),
}

impl SchemaSource {
    /// Read the definition script. A missing file is reported separately from
    /// other read failures so startup can tell the user what to fix.
    pub fn load(&self) -> Result<Cow<'static, str>, StoreError> {
        match self {
            SchemaSource::Bundled => Ok(Cow::Borrowed(BUNDLED_SCHEMA)),
            SchemaSource::File(path) => match fs::read_to_string(path) {
                Ok(script) => Ok(Cow::Owned(script)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    Err(StoreError::SchemaNotFound { path: path.clone() })
                }
                Err(err) => Err(StoreError::backend(
                    format!("failed to read schema definition {}", path.display()),
                    err,
                )),
            },
        }
    }
}

/// Outcome of [`initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Created,
    Reused,
}

/// Create the schema when the database holds no objects yet, otherwise leave
/// whatever is there untouched. The script runs inside one transaction, so an
/// invalid definition leaves the database empty.
pub fn initialize(conn: &Connection, source: &SchemaSource) -> Result<SchemaStatus, StoreError> {
    let objects: i64 = conn
        .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
        .store_context("failed to inspect database schema")?;

    if objects > 0 {
        debug!(objects, "reusing existing schema");
        return Ok(SchemaStatus::Reused);
    }

    let script = source.load()?;
    let tx = conn
        .unchecked_transaction()
        .store_context("failed to begin schema transaction")?;

    tx.execute_batch(&script)
        .map_err(|err| StoreError::SchemaInvalid {
            reason: err.to_string(),
        })?;

    let missing = missing_tables(&tx)?;
    if !missing.is_empty() {
        return Err(StoreError::SchemaInvalid {
            reason: format!("missing tables: {}", missing.join(", ")),
        });
    }

    tx.commit().store_context("failed to commit schema")?;
    info!(?source, "created catalog schema");
    Ok(SchemaStatus::Created)
}

fn missing_tables(conn: &Connection) -> Result<Vec<&'static str>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .store_context("failed to prepare table lookup")?;

    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        if !stmt.exists([table]).store_context("failed to look up table")? {
            missing.push(table);
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_schema_creates_every_table() {
        let conn = Connection::open_in_memory().unwrap();
        let status = initialize(&conn, &SchemaSource::Bundled).unwrap();

        assert_eq!(status, SchemaStatus::Created);
        assert!(missing_tables(&conn).unwrap().is_empty());
    }

    #[test]
    fn second_initialization_reuses_existing_tables() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn, &SchemaSource::Bundled).unwrap();
        conn.execute("INSERT INTO Artist (Name) VALUES ('Prince')", [])
            .unwrap();

        // The file source does not exist; it must not even be read.
        let source = SchemaSource::File(PathBuf::from("/nonexistent/schema.sql"));
        let status = initialize(&conn, &source).unwrap();

        assert_eq!(status, SchemaStatus::Reused);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM Artist", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn missing_definition_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        let conn = Connection::open_in_memory().unwrap();

        let err = initialize(&conn, &SchemaSource::File(path.clone())).unwrap_err();
        match err {
            StoreError::SchemaNotFound { path: reported } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn broken_definition_is_rejected_and_rolled_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CREATE TABLE Artist (ArtistID INTEGER PRIMARY KEY, Name TEXT);").unwrap();
        writeln!(file, "CREATE TABLE Song (oops").unwrap();
        let conn = Connection::open_in_memory().unwrap();

        let err = initialize(&conn, &SchemaSource::File(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, StoreError::SchemaInvalid { .. }));

        let objects: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .unwrap();
        assert_eq!(objects, 0);
    }

    #[test]
    fn incomplete_definition_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CREATE TABLE Artist (ArtistID INTEGER PRIMARY KEY, Name TEXT);").unwrap();
        let conn = Connection::open_in_memory().unwrap();

        let err = initialize(&conn, &SchemaSource::File(file.path().to_path_buf())).unwrap_err();
        match err {
            StoreError::SchemaInvalid { reason } => {
                assert!(reason.contains("Category"), "{reason}");
                assert!(!reason.contains("Artist"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
