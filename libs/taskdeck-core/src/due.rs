//! Due-date status evaluation
//!
//! The evaluator is a pure function over a task's due date and completion
//! flag. The reference date is always passed in by the caller so the result
//! is deterministic regardless of when it runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived due-date status; computed on demand, never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueStatus {
    /// Due date falls on `today` or tomorrow
    pub due_soon: bool,
    /// Due date is strictly in the past and the task is not completed
    pub overdue: bool,
}

impl DueStatus {
    /// Evaluate the due status of a task as of `today`
    ///
    /// A task with no due date is neither due soon nor overdue. The two
    /// flags are mutually exclusive: tomorrow is never in the past.
    #[must_use]
    pub fn evaluate(due_date: Option<NaiveDate>, completed: bool, today: NaiveDate) -> Self {
        let Some(due) = due_date else {
            return Self::default();
        };

        Self {
            due_soon: due == today || Some(due) == today.succ_opt(),
            overdue: due < today && !completed,
        }
    }
}
