//! Builder for composing task filter criteria

use crate::models::TaskFilters;
use chrono::NaiveDate;
use uuid::Uuid;

/// Builder for constructing task queries with filters
///
/// Filters are independent and combine conjunctively; the builder never
/// assumes mutual exclusivity between criteria.
#[derive(Debug, Clone)]
pub struct TaskFilterBuilder {
    filters: TaskFilters,
}

impl TaskFilterBuilder {
    /// Create a new filter builder with no constraints
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: TaskFilters::default(),
        }
    }

    /// Restrict to tasks in the given category
    #[must_use]
    pub const fn category(mut self, category_id: Uuid) -> Self {
        self.filters.category_id = Some(category_id);
        self
    }

    /// Restrict to completed or incomplete tasks
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.filters.completed = Some(completed);
        self
    }

    /// Restrict by creation date range (inclusive bounds)
    #[must_use]
    pub const fn created_range(
        mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        self.filters.created_from = from;
        self.filters.created_to = to;
        self
    }

    /// Build the final filters
    #[must_use]
    pub fn build(self) -> TaskFilters {
        self.filters
    }
}

impl Default for TaskFilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
