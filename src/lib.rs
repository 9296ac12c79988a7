//! Core library surface for the music catalog.
//!
//! The persistence layer lives in [`db`] and is reached through a single
//! [`Catalog`] handle. The `bin` target layers configuration, logging and the
//! terminal UI on top of it.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// Store handle plus the relationship and schema types its API takes.
pub use db::{Catalog, PrunedLinks, Relation, SchemaSource, SchemaStatus, StoreLocation};

pub use error::StoreError;

/// Domain rows and report results.
pub use models::{Album, AlbumCredit, Artist, Category, Song, SongCredit, SongOverview};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
