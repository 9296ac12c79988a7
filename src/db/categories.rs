use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{collect_rows, Catalog};
use crate::error::{StoreContext, StoreError};
use crate::models::Category;

const ENTITY: &str = "category";

impl Catalog {
    /// Insert a new category and return its generated id.
    pub fn create_category(&self, name: &str) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO Category (CategoryName) VALUES (?1)",
            params![name],
        )
        .map_err(|err| StoreError::from_write(err, ENTITY, name, "failed to insert category"))?;

        let id = conn.last_insert_rowid();
        debug!(id, name, "created category");
        Ok(id)
    }

    /// Every category, ordered by name.
    pub fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT CategoryID, CategoryName FROM Category ORDER BY CategoryName")
            .store_context("failed to prepare category query")?;

        collect_rows(&mut stmt, [], "failed to load categories", |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
    }

    /// Exact, case-sensitive name lookup. `None` when no category matches.
    pub fn category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT CategoryID, CategoryName FROM Category WHERE CategoryName = ?1",
                params![name],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .store_context("failed to look up category")
    }

    /// Rename every category called `old_name`. Returns whether anything
    /// changed.
    pub fn update_category(&self, old_name: &str, new_name: &str) -> Result<bool, StoreError> {
        let updated = self
            .conn()?
            .execute(
                "UPDATE Category SET CategoryName = ?1 WHERE CategoryName = ?2",
                params![new_name, old_name],
            )
            .map_err(|err| {
                StoreError::from_write(err, ENTITY, new_name, "failed to update category")
            })?;

        debug!(old_name, new_name, updated, "renamed category");
        Ok(updated > 0)
    }

    /// Links in `IsIn` survive the delete.
    pub fn delete_category(&self, name: &str) -> Result<bool, StoreError> {
        let deleted = self
            .conn()?
            .execute(
                "DELETE FROM Category WHERE CategoryName = ?1",
                params![name],
            )
            .store_context("failed to delete category")?;

        debug!(name, deleted, "deleted category");
        Ok(deleted > 0)
    }
}
