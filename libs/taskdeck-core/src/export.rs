//! CSV export pipeline
//!
//! Streams a filtered, ordered task set to any `io::Write` sink. Rows come
//! off the repository's task stream one at a time, so memory use stays flat
//! regardless of how many tasks match.

use crate::error::Result;
use crate::models::{Task, TaskFilters};
use crate::repository::TaskRepository;
use chrono::{DateTime, Local};
use futures_util::TryStreamExt;
use std::io;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Fixed header row for exported files
pub const EXPORT_HEADER: [&str; 7] = [
    "Title",
    "Description",
    "Status",
    "Due Date",
    "Category",
    "Created At",
    "Updated At",
];

/// MIME type for the exported payload
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// CSV exporter for task data
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new exporter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Suggested filename for an export started at `now`
    #[must_use]
    pub fn filename(now: DateTime<Local>) -> String {
        format!("tasks_{}.csv", now.format("%Y-%m-%d_%H-%M-%S"))
    }

    /// Stream the owner's tasks matching `filters` to `writer` as CSV
    ///
    /// Tasks are ordered newest-first by creation time. Returns the number
    /// of data rows written. Quoting follows standard CSV rules: fields
    /// containing the delimiter, quotes, or newlines are quoted with
    /// embedded quotes doubled.
    ///
    /// # Errors
    ///
    /// Aborts on the first repository or write failure.
    #[instrument(skip(self, repo, writer))]
    pub async fn export<W: io::Write>(
        &self,
        repo: &dyn TaskRepository,
        owner: Uuid,
        filters: &TaskFilters,
        writer: W,
    ) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(EXPORT_HEADER)?;

        let mut rows = repo.stream_tasks(owner, filters.clone());
        let mut written = 0usize;
        while let Some(task) = rows.try_next().await? {
            csv_writer.write_record(Self::record(&task))?;
            written += 1;
        }

        csv_writer.flush()?;
        debug!("Exported {written} tasks");
        Ok(written)
    }

    /// Render one task as its CSV field values
    fn record(task: &Task) -> [String; 7] {
        [
            task.title.clone(),
            task.description.clone().unwrap_or_default(),
            if task.completed {
                "Completed".to_string()
            } else {
                "Incomplete".to_string()
            },
            task.due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            task.category_name.clone().unwrap_or_default(),
            format_local(task.created_at),
            format_local(task.updated_at),
        ]
    }
}

/// Format a stored UTC timestamp in the server's local time
fn format_local(timestamp: DateTime<chrono::Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
