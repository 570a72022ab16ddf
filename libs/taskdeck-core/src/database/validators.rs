//! Referential checks run before task mutations

use crate::error::{Result, TaskdeckError};
use sqlx::SqlitePool;
use tracing::instrument;
use uuid::Uuid;

/// Validate that a category exists and belongs to `owner`
///
/// A category owned by someone else is reported as not found rather than
/// forbidden, so callers cannot probe other owners' category ids.
///
/// # Errors
///
/// Returns `CategoryNotFound` if no such category is visible to `owner`.
#[instrument(skip(pool))]
pub(crate) async fn validate_category_owned(
    pool: &SqlitePool,
    owner: Uuid,
    category_id: Uuid,
) -> Result<()> {
    let exists = sqlx::query("SELECT 1 FROM categories WHERE id = ? AND owner_id = ?")
        .bind(category_id.to_string())
        .bind(owner.to_string())
        .fetch_optional(pool)
        .await?
        .is_some();

    if !exists {
        return Err(TaskdeckError::category_not_found(category_id));
    }
    Ok(())
}
