//! Persistence module split across logical submodules. Every submodule adds an
//! `impl Catalog` block, so callers only ever hold a [`Catalog`].

mod albums;
mod artists;
mod categories;
mod connection;
mod links;
mod reports;
pub mod schema;
mod songs;

use rusqlite::{Params, Row, Statement};

use crate::error::{StoreContext, StoreError};

pub use connection::{Catalog, StoreLocation};
pub use links::{PrunedLinks, Relation};
pub use schema::{SchemaSource, SchemaStatus};

/// Run a prepared query and collect every mapped row, labelling failures with
/// `context`.
fn collect_rows<T, P, F>(
    stmt: &mut Statement<'_>,
    params: P,
    context: &str,
    map: F,
) -> Result<Vec<T>, StoreError>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    stmt.query_map(params, map)
        .store_context(context)?
        .collect::<Result<Vec<_>, _>>()
        .store_context(context)
}
