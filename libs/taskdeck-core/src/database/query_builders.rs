//! SQL assembly for dynamic task queries and partial updates
//!
//! Conditions and SET lists are built from typed criteria; user input only
//! ever reaches the database through bind parameters.

use crate::database::mappers::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::models::{TaskFilters, UpdateTaskRequest};
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::query::Query;
use uuid::Uuid;

/// Base SELECT for task rows, joined with the category name
pub(crate) const TASK_SELECT: &str = "\
SELECT t.id, t.owner_id, t.title, t.description, t.completed, t.due_date, \
t.category_id, c.name AS category_name, t.created_at, t.updated_at \
FROM tasks t LEFT JOIN categories c ON c.id = t.category_id";

/// A value destined for a bind parameter
#[derive(Debug, Clone)]
pub(crate) enum SqlValue {
    Text(String),
    Int(i64),
}

/// Bind a slice of values onto a query in order
pub(crate) fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Int(i) => query.bind(*i),
        };
    }
    query
}

/// Builder for owner-scoped task SELECTs from filter criteria
#[derive(Debug, Clone)]
pub(crate) struct TaskSelectBuilder {
    conditions: Vec<&'static str>,
    binds: Vec<SqlValue>,
}

impl TaskSelectBuilder {
    /// Start a query scoped to `owner`
    pub(crate) fn for_owner(owner: Uuid) -> Self {
        Self {
            conditions: vec!["t.owner_id = ?"],
            binds: vec![SqlValue::Text(owner.to_string())],
        }
    }

    /// Apply filter criteria; each present option adds one conjunct
    pub(crate) fn with_filters(mut self, filters: &TaskFilters) -> Self {
        if let Some(category_id) = filters.category_id {
            self.conditions.push("t.category_id = ?");
            self.binds.push(SqlValue::Text(category_id.to_string()));
        }

        if let Some(completed) = filters.completed {
            self.conditions.push("t.completed = ?");
            self.binds.push(SqlValue::Int(i64::from(completed)));
        }

        // Inclusive calendar-day bounds on the creation timestamp; the
        // stored text format sorts chronologically.
        if let Some(from) = filters.created_from {
            self.conditions.push("t.created_at >= ?");
            self.binds
                .push(SqlValue::Text(format!("{} 00:00:00", from.format(DATE_FORMAT))));
        }

        if let Some(to) = filters.created_to {
            self.conditions.push("t.created_at <= ?");
            self.binds
                .push(SqlValue::Text(format!("{} 23:59:59", to.format(DATE_FORMAT))));
        }

        self
    }

    /// Build the SQL text, newest tasks first with a stable tiebreak
    pub(crate) fn sql(&self) -> String {
        format!(
            "{TASK_SELECT} WHERE {} ORDER BY t.created_at DESC, t.rowid ASC",
            self.conditions.join(" AND ")
        )
    }

    /// Consume the builder, returning the bind values in clause order
    pub(crate) fn into_binds(self) -> Vec<SqlValue> {
        self.binds
    }
}

/// Builder for partial UPDATEs on the tasks table
///
/// Always refreshes `updated_at`; callers append the WHERE binds after the
/// SET binds.
#[derive(Debug, Clone)]
pub(crate) struct TaskUpdateBuilder {
    sets: Vec<&'static str>,
    binds: Vec<SqlValue>,
}

impl TaskUpdateBuilder {
    /// Build the SET list from the fields present in `request`
    pub(crate) fn from_request(request: &UpdateTaskRequest) -> Self {
        let mut sets = Vec::new();
        let mut binds = Vec::new();

        if let Some(title) = &request.title {
            sets.push("title = ?");
            binds.push(SqlValue::Text(title.clone()));
        }

        if let Some(description) = &request.description {
            sets.push("description = ?");
            binds.push(SqlValue::Text(description.clone()));
        }

        if let Some(completed) = request.completed {
            sets.push("completed = ?");
            binds.push(SqlValue::Int(i64::from(completed)));
        }

        if let Some(due_date) = request.due_date {
            sets.push("due_date = ?");
            binds.push(SqlValue::Text(due_date.format(DATE_FORMAT).to_string()));
        }

        if let Some(category_id) = request.category_id {
            sets.push("category_id = ?");
            binds.push(SqlValue::Text(category_id.to_string()));
        }

        Self { sets, binds }
    }

    /// True when no fields are being updated
    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Build the UPDATE statement, stamping `updated_at` with `now`
    pub(crate) fn sql_and_binds(
        mut self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> (String, Vec<SqlValue>) {
        self.sets.push("updated_at = ?");
        self.binds
            .push(SqlValue::Text(now.format(TIMESTAMP_FORMAT).to_string()));

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ? AND owner_id = ?",
            self.sets.join(", ")
        );
        (sql, self.binds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_select_owner_only() {
        let builder = TaskSelectBuilder::for_owner(Uuid::new_v4())
            .with_filters(&TaskFilters::default());

        let sql = builder.sql();
        assert!(sql.starts_with(TASK_SELECT));
        assert!(sql.contains("WHERE t.owner_id = ?"));
        assert!(sql.ends_with("ORDER BY t.created_at DESC, t.rowid ASC"));
        assert_eq!(builder.into_binds().len(), 1);
    }

    #[test]
    fn test_select_all_filters_conjoined() {
        let filters = TaskFilters {
            category_id: Some(Uuid::new_v4()),
            completed: Some(true),
            created_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            created_to: NaiveDate::from_ymd_opt(2024, 12, 31),
        };
        let builder = TaskSelectBuilder::for_owner(Uuid::new_v4()).with_filters(&filters);

        let sql = builder.sql();
        assert!(sql.contains("t.category_id = ? AND t.completed = ?"));
        assert!(sql.contains("t.created_at >= ? AND t.created_at <= ?"));
        assert_eq!(builder.into_binds().len(), 5);
    }

    #[test]
    fn test_created_bounds_cover_whole_days() {
        let filters = TaskFilters {
            created_from: NaiveDate::from_ymd_opt(2024, 3, 5),
            created_to: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..TaskFilters::default()
        };
        let binds = TaskSelectBuilder::for_owner(Uuid::new_v4())
            .with_filters(&filters)
            .into_binds();

        match (&binds[1], &binds[2]) {
            (SqlValue::Text(from), SqlValue::Text(to)) => {
                assert_eq!(from, "2024-03-05 00:00:00");
                assert_eq!(to, "2024-03-05 23:59:59");
            }
            _ => panic!("expected text binds for date bounds"),
        }
    }

    #[test]
    fn test_update_builder_empty_request() {
        let builder = TaskUpdateBuilder::from_request(&UpdateTaskRequest::default());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_update_builder_stamps_updated_at() {
        let request = UpdateTaskRequest {
            title: Some("New title".to_string()),
            completed: Some(true),
            ..UpdateTaskRequest::default()
        };
        let builder = TaskUpdateBuilder::from_request(&request);
        assert!(!builder.is_empty());

        let (sql, binds) = builder.sql_and_binds(chrono::Utc::now());
        assert!(sql.contains("title = ?"));
        assert!(sql.contains("completed = ?"));
        assert!(sql.contains("updated_at = ?"));
        assert!(sql.ends_with("WHERE id = ? AND owner_id = ?"));
        assert_eq!(binds.len(), 3);
    }
}
