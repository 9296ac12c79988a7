//! Command-line and environment configuration. Anything left unset falls back
//! to a file inside `~/.music-catalog/`.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use directories::BaseDirs;

use crate::db::SchemaSource;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".music-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "music.sqlite";
const LOG_FILE_NAME: &str = "music-catalog.log";

fn parse_path(s: &str) -> Result<PathBuf> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}

#[derive(Parser, Debug, Default)]
#[command(name = "music-catalog", version, about = "Terminal music library catalog")]
pub struct CliArgs {
    /// SQLite database file. Created when missing.
    #[arg(long, env = "MUSIC_CATALOG_DB", value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Schema definition script applied to an empty database. The bundled
    /// schema is used when omitted.
    #[arg(long, env = "MUSIC_CATALOG_SCHEMA", value_parser = parse_path)]
    pub schema: Option<PathBuf>,

    /// File receiving log output. Filter with RUST_LOG.
    #[arg(long, env = "MUSIC_CATALOG_LOG", value_parser = parse_path)]
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub schema: SchemaSource,
    pub log_path: PathBuf,
}

impl Config {
    /// Fill every unset path from the data directory.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let db_path = match args.db {
            Some(path) => path,
            None => data_dir()?.join(DB_FILE_NAME),
        };
        let log_path = match args.log_file {
            Some(path) => path,
            None => data_dir()?.join(LOG_FILE_NAME),
        };
        let schema = args
            .schema
            .map(SchemaSource::File)
            .unwrap_or_default();

        Ok(Self {
            db_path,
            schema,
            log_path,
        })
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
