//! Data models for taskdeck entities

use crate::due::DueStatus;
use crate::error::{Result, TaskdeckError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length for task titles and category names
pub const MAX_NAME_LEN: usize = 255;

/// Color assigned to categories created implicitly during CSV import
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Main task entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user; scopes all queries and mutations
    pub owner_id: Uuid,
    /// Task title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Completion flag
    pub completed: bool,
    /// Optional due date (calendar day, no time component)
    pub due_date: Option<NaiveDate>,
    /// Optional category; must belong to the same owner
    pub category_id: Option<Uuid>,
    /// Category name resolved at query time, not separately persisted
    pub category_name: Option<String>,
    /// Creation timestamp (store-assigned)
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp (store-assigned)
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Compute the derived due status for this task as of `today`
    #[must_use]
    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        DueStatus::evaluate(self.due_date, self.completed, today)
    }
}

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub owner_id: Uuid,
    /// Category name, unique per owner
    pub name: String,
    /// Hex RGB color, `#` followed by six hex digits
    pub color: String,
    /// Number of tasks referencing this category (populated by list queries)
    pub task_count: u32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Task creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title (required)
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Completion flag (defaults to false)
    pub completed: Option<bool>,
    /// Optional due date
    pub due_date: Option<NaiveDate>,
    /// Optional category reference
    pub category_id: Option<Uuid>,
}

/// Partial task update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
}

impl UpdateTaskRequest {
    /// True when the request carries no field changes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
            && self.category_id.is_none()
    }
}

/// Category creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    /// Category name (required)
    pub name: String,
    /// Hex color; defaults to [`DEFAULT_CATEGORY_COLOR`]
    pub color: Option<String>,
}

/// Partial category update request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Filter criteria for task queries
///
/// Absent criteria are unconstrained; all present criteria apply
/// conjunctively. Date bounds are inclusive and apply to the creation
/// timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilters {
    /// Restrict to tasks with this exact category
    pub category_id: Option<Uuid>,
    /// Restrict to completed (`true`) or incomplete (`false`) tasks
    pub completed: Option<bool>,
    /// Inclusive lower bound on the creation date
    pub created_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date
    pub created_to: Option<NaiveDate>,
}

impl TaskFilters {
    /// Evaluate the filters as a pure predicate over a task
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(category_id) = self.category_id {
            if task.category_id != Some(category_id) {
                return false;
            }
        }

        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }

        let created = task.created_at.date_naive();
        if let Some(from) = self.created_from {
            if created < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if created > to {
                return false;
            }
        }

        true
    }
}

/// Validate a task title or category name
///
/// # Errors
///
/// Returns a validation error if the value is empty after trimming or
/// longer than [`MAX_NAME_LEN`] characters.
pub fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TaskdeckError::validation(format!(
            "{field} must not be empty"
        )));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(TaskdeckError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a category color: `#` followed by exactly six hex digits
///
/// # Errors
///
/// Returns a validation error if the value does not match the format.
pub fn validate_color(color: &str) -> Result<()> {
    let hex = color
        .strip_prefix('#')
        .ok_or_else(|| TaskdeckError::validation(format!("invalid color: {color}")))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TaskdeckError::validation(format!(
            "invalid color: {color}"
        )));
    }
    Ok(())
}
