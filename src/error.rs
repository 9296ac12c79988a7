//! Typed failures surfaced by the catalog store and report queries.
//!
//! "No matching row" is not an error at this layer: lookups return `Option`,
//! updates and deletes return `bool`. `NotFound` exists for callers that need
//! to turn such an outcome into a failure of their own.

use std::path::PathBuf;

use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

/// Boxed source for backend failures, which come from SQLite or the filesystem.
pub type BackendSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The catalog was closed (or never opened) before the call.
    #[error("the catalog database is not open")]
    NotInitialized,

    /// A write collided with a uniqueness or structural constraint.
    #[error("{entity} \"{key}\" already exists")]
    ConstraintViolation { entity: &'static str, key: String },

    #[error("{entity} \"{key}\" was not found")]
    NotFound { entity: &'static str, key: String },

    #[error("schema definition not found at {}", path.display())]
    SchemaNotFound { path: PathBuf },

    #[error("schema definition is invalid: {reason}")]
    SchemaInvalid { reason: String },

    /// SQLite or I/O fault unrelated to application logic.
    #[error("{context}")]
    Backend {
        context: String,
        #[source]
        source: BackendSource,
    },
}

impl StoreError {
    /// Build a `NotFound` for a lookup that matched nothing.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub(crate) fn backend(
        context: impl Into<String>,
        source: impl Into<BackendSource>,
    ) -> Self {
        StoreError::Backend {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Classify a failed write. Only key collisions (`UNIQUE` or
    /// `PRIMARY KEY`) become `ConstraintViolation`; `NOT NULL`, `CHECK` and
    /// other failures from a custom schema stay backend failures carrying
    /// SQLite's own message.
    pub(crate) fn from_write(
        err: rusqlite::Error,
        entity: &'static str,
        key: &str,
        context: &str,
    ) -> Self {
        if is_key_collision(&err) {
            StoreError::ConstraintViolation {
                entity,
                key: key.to_string(),
            }
        } else {
            StoreError::backend(context, err)
        }
    }
}

fn is_key_collision(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
    )
}

/// Attach an operation description to a SQLite failure, mirroring what
/// `anyhow::Context` does for the front-end.
pub(crate) trait StoreContext<T> {
    fn store_context(self, context: &str) -> Result<T, StoreError>;
}

impl<T> StoreContext<T> for Result<T, rusqlite::Error> {
    fn store_context(self, context: &str) -> Result<T, StoreError> {
        self.map_err(|err| StoreError::backend(context, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn unique_failures_are_classified_as_constraint_violations() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err();

        let mapped = StoreError::from_write(err, "artist", "a", "failed to insert");
        assert!(matches!(
            mapped,
            StoreError::ConstraintViolation { entity: "artist", ref key } if key == "a"
        ));
        assert_eq!(mapped.to_string(), "artist \"a\" already exists");
    }

    #[test]
    fn primary_key_collisions_are_constraint_violations() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (song TEXT, artist TEXT, PRIMARY KEY (song, artist));
             INSERT INTO t VALUES ('Beat It', 'Michael Jackson');",
        )
        .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('Beat It', 'Michael Jackson')", [])
            .unwrap_err();

        let mapped = StoreError::from_write(err, "song", "Beat It", "failed to insert");
        assert!(matches!(mapped, StoreError::ConstraintViolation { .. }));
    }

    #[test]
    fn not_null_and_check_failures_do_not_claim_a_duplicate() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (name TEXT NOT NULL, year INTEGER CHECK (year > 1900));",
        )
        .unwrap();

        let missing = conn
            .execute("INSERT INTO t (name, year) VALUES (NULL, 1982)", [])
            .unwrap_err();
        let mapped = StoreError::from_write(missing, "album", "", "failed to insert album");
        assert!(matches!(mapped, StoreError::Backend { .. }));
        assert!(!mapped.to_string().contains("already exists"));

        let too_old = conn
            .execute("INSERT INTO t (name, year) VALUES ('Thriller', 1800)", [])
            .unwrap_err();
        let mapped = StoreError::from_write(too_old, "album", "Thriller", "failed to insert album");
        match mapped {
            StoreError::Backend { context, source } => {
                assert_eq!(context, "failed to insert album");
                assert!(source.to_string().contains("CHECK"), "{source}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_write_failures_stay_backend_failures() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .execute("INSERT INTO missing VALUES (1)", [])
            .unwrap_err();

        let mapped = StoreError::from_write(err, "artist", "a", "failed to insert artist");
        match mapped {
            StoreError::Backend { context, .. } => assert_eq!(context, "failed to insert artist"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
