//! Binary entry point: resolve configuration, start file logging, open the
//! catalog and drive the Ratatui event loop until the user exits.
use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{error, info};

use music_catalog::config::{CliArgs, Config};
use music_catalog::{logging, run_app, App, Catalog};

fn main() -> anyhow::Result<()> {
    let config = Config::from_args(CliArgs::parse())?;
    logging::init(&config.log_path)?;
    info!(db = %config.db_path.display(), "starting music catalog");

    let catalog = Catalog::open(&config.db_path, &config.schema)
        .with_context(|| format!("failed to open catalog at {}", config.db_path.display()))?;
    info!(status = ?catalog.schema_status(), "catalog ready");

    let mut app = App::new(catalog);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        error!("terminal session failed: {err:#}");
    }

    let mut catalog = app.into_catalog();
    let closed = catalog.close().context("failed to close catalog");
    finish_session(result, closed)
}

/// Combine the session outcome with the close outcome. A session failure
/// stays the primary error; a close failure on top of it is appended.
fn finish_session(session: anyhow::Result<()>, closed: anyhow::Result<()>) -> anyhow::Result<()> {
    match (session, closed) {
        (Err(err), Err(close_err)) => {
            error!("{close_err:#}");
            Err(anyhow!("{err:#} (closing the catalog also failed: {close_err:#})"))
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), closed) => {
            closed?;
            info!("catalog closed");
            Ok(())
        }
    }
}
