//! Row mapping utilities for converting database rows to domain models

use crate::error::{Result, TaskdeckError};
use crate::models::{Category, Task};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Storage format for timestamps (UTC, sortable as text)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored UUID column
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| TaskdeckError::database(format!("invalid uuid {value:?}: {e}")))
}

/// Parse a stored timestamp column
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| TaskdeckError::database(format!("invalid timestamp {value:?}: {e}")))
}

/// Parse an optional stored date column
pub(crate) fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| TaskdeckError::database(format!("invalid date {s:?}: {e}")))
        })
        .transpose()
}

/// Map a database row to a [`Task`]
///
/// Expects the column set produced by [`super::query_builders::TASK_SELECT`],
/// including the joined `category_name`.
///
/// # Errors
///
/// Returns a database error if a stored value cannot be decoded.
pub(crate) fn map_task_row(row: &SqliteRow) -> Result<Task> {
    Ok(Task {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        owner_id: parse_uuid(&row.get::<String, _>("owner_id"))?,
        title: row.get("title"),
        description: row.get("description"),
        completed: row.get::<i64, _>("completed") != 0,
        due_date: parse_optional_date(row.get("due_date"))?,
        category_id: row
            .get::<Option<String>, _>("category_id")
            .as_deref()
            .map(parse_uuid)
            .transpose()?,
        category_name: row.get("category_name"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

/// Map a database row to a [`Category`]
///
/// The `task_count` column is optional; lookups that do not aggregate it
/// yield a count of zero.
pub(crate) fn map_category_row(row: &SqliteRow) -> Result<Category> {
    let task_count: i64 = row.try_get("task_count").unwrap_or(0);

    Ok(Category {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        owner_id: parse_uuid(&row.get::<String, _>("owner_id"))?,
        name: row.get("name"),
        color: row.get("color"),
        task_count: u32::try_from(task_count.max(0)).unwrap_or(u32::MAX),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_round_trip() {
        let parsed = parse_timestamp("2024-06-15 10:30:00").unwrap();
        assert_eq!(parsed.format(TIMESTAMP_FORMAT).to_string(), "2024-06-15 10:30:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-01-01".to_string())).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert!(parse_optional_date(Some("01/01/2024".to_string())).is_err());
    }

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_uuid(&Uuid::new_v4().to_string()).is_ok());
    }
}
