//! CSV import pipeline
//!
//! Rows are processed independently: one bad row records an error and the
//! import moves on. Only upload-level problems (wrong extension, oversized
//! file) abort the whole operation before any row is touched.

use crate::database::DATE_FORMAT;
use crate::error::{Result, TaskdeckError};
use crate::models::CreateTaskRequest;
use crate::repository::TaskRepository;
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Maximum accepted upload size: 2048 KB
pub const MAX_IMPORT_BYTES: u64 = 2 * 1024 * 1024;

/// Accepted upload extensions
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["csv", "txt"];

/// Outcome of a bulk import: successes and per-row failures together
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    /// Number of tasks created
    pub imported: usize,
    /// One message per failed row, in file order, each tagged with the
    /// row's 1-based position among the data rows
    pub errors: Vec<String>,
}

/// CSV importer for task data
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvImporter;

impl CsvImporter {
    /// Create a new importer
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Import tasks for `owner` from the file at `path`
    ///
    /// The upload is validated before any row is parsed; the file handle is
    /// dropped on every exit path.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a wrong extension or oversized file,
    /// or an IO error if the file cannot be opened. Row-level failures do
    /// not error; they are reported in the summary.
    #[instrument(skip(self, repo))]
    pub async fn import_file(
        &self,
        repo: &dyn TaskRepository,
        owner: Uuid,
        path: &Path,
    ) -> Result<ImportSummary> {
        validate_upload(path)?;
        let file = File::open(path)?;
        self.import_reader(repo, owner, file).await
    }

    /// Import tasks for `owner` from an already-open CSV stream
    ///
    /// The first record is discarded as a header without validation.
    /// Columns by position: title, description, status, due date,
    /// category name. Rows with an empty title are skipped silently.
    ///
    /// # Errors
    ///
    /// Only unrecoverable read failures on the underlying stream error out;
    /// per-row problems are accumulated in the summary.
    pub async fn import_reader<R: io::Read + Send>(
        &self,
        repo: &dyn TaskRepository,
        owner: Uuid,
        reader: R,
    ) -> Result<ImportSummary> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut summary = ImportSummary::default();
        for (index, record) in csv_reader.records().enumerate() {
            let row_number = index + 1;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Row {row_number} unreadable: {e}");
                    summary.errors.push(format!("Row {row_number}: {e}"));
                    continue;
                }
            };

            match self.import_row(repo, owner, &record).await {
                Ok(true) => summary.imported += 1,
                // Blank title: treated as a malformed line, not an error.
                Ok(false) => {}
                Err(e) => {
                    warn!("Row {row_number} rejected: {e}");
                    summary.errors.push(format!("Row {row_number}: {e}"));
                }
            }
        }

        debug!(
            "Imported {} tasks, {} rows failed",
            summary.imported,
            summary.errors.len()
        );
        Ok(summary)
    }

    /// Process one data row; `Ok(false)` means the row was skipped
    async fn import_row(
        &self,
        repo: &dyn TaskRepository,
        owner: Uuid,
        record: &StringRecord,
    ) -> Result<bool> {
        let title = record.get(0).unwrap_or("");
        if title.trim().is_empty() {
            return Ok(false);
        }

        let description = record.get(1).unwrap_or("");
        let status = record.get(2).unwrap_or("").trim().to_lowercase();
        let due_raw = record.get(3).unwrap_or("").trim();
        let category_name = record.get(4).unwrap_or("").trim();

        let due_date = if due_raw.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(due_raw, DATE_FORMAT)
                    .map_err(|_| TaskdeckError::invalid_date(due_raw))?,
            )
        };

        let category_id = if category_name.is_empty() {
            None
        } else {
            Some(
                repo.find_or_create_category(owner, category_name)
                    .await?
                    .id,
            )
        };

        let request = CreateTaskRequest {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            completed: Some(status == "completed"),
            due_date,
            category_id,
        };
        repo.create_task(owner, request).await?;
        Ok(true)
    }
}

/// Validate an upload before any row processing
///
/// # Errors
///
/// Returns a validation error if the extension is not `.csv`/`.txt` or the
/// file exceeds [`MAX_IMPORT_BYTES`].
pub fn validate_upload(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    if !extension
        .as_deref()
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e))
    {
        return Err(TaskdeckError::validation(format!(
            "unsupported file type: {}",
            path.display()
        )));
    }

    let size = std::fs::metadata(path)?.len();
    if size > MAX_IMPORT_BYTES {
        return Err(TaskdeckError::validation(format!(
            "file exceeds {} KB limit",
            MAX_IMPORT_BYTES / 1024
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::CsvExporter;
    use crate::models::{TaskFilters, DEFAULT_CATEGORY_COLOR};
    use crate::test_utils::create_test_store;
    use std::io::Cursor;
    use std::io::Write;

    const HEADER: &str = "Title,Description,Status,Due Date,Category,Created At,Updated At\n";

    async fn import_str(
        store: &crate::database::TaskStore,
        owner: Uuid,
        csv: &str,
    ) -> ImportSummary {
        CsvImporter::new()
            .import_reader(store, owner, Cursor::new(csv.as_bytes().to_vec()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_import_concrete_scenario() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let csv = format!(
            "{HEADER}Buy milk,,completed,2024-01-01,Errands\n,desc,,,\n"
        );
        let summary = import_str(&store, owner, &csv).await;

        assert_eq!(summary.imported, 1);
        assert!(summary.errors.is_empty());

        let tasks = store.find_tasks(owner, &TaskFilters::default()).await.unwrap();
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.title, "Buy milk");
        assert!(task.completed);
        assert_eq!(
            task.due_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(task.category_name.as_deref(), Some("Errands"));

        let categories = store.list_categories(owner).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].color, DEFAULT_CATEGORY_COLOR);
    }

    #[tokio::test]
    async fn test_empty_title_rows_are_skipped_silently() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let csv = format!("{HEADER},no title here,,,\n   ,also blank,,,\n");
        let summary = import_str(&store, owner, &csv).await;

        assert_eq!(summary.imported, 0);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date_row_fails_without_aborting() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let csv = format!(
            "{HEADER}One,,,2024-01-01,\nTwo,,,,\nThree,,,not-a-date,\nFour,,completed,,\n"
        );
        let summary = import_str(&store, owner, &csv).await;

        assert_eq!(summary.imported, 3);
        assert_eq!(summary.errors.len(), 1);
        // Numbered by physical data-row position.
        assert!(summary.errors[0].starts_with("Row 3:"));
        assert!(summary.errors[0].contains("not-a-date"));
    }

    #[tokio::test]
    async fn test_status_matching_is_case_insensitive() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let csv = format!("{HEADER}A,, COMPLETED ,,\nB,,done,,\nC,,,,\n");
        let summary = import_str(&store, owner, &csv).await;
        assert_eq!(summary.imported, 3);

        let tasks = store.find_tasks(owner, &TaskFilters::default()).await.unwrap();
        let by_title = |t: &str| tasks.iter().find(|x| x.title == t).unwrap().completed;
        assert!(by_title("A"));
        assert!(!by_title("B"));
        assert!(!by_title("C"));
    }

    #[tokio::test]
    async fn test_import_reuses_existing_category() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let existing = store.find_or_create_category(owner, "Work").await.unwrap();

        let csv = format!("{HEADER}A,,,,Work\nB,,,,Work\n");
        let summary = import_str(&store, owner, &csv).await;
        assert_eq!(summary.imported, 2);

        let categories = store.list_categories(owner).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, existing.id);
        assert_eq!(categories[0].task_count, 2);
    }

    #[tokio::test]
    async fn test_overlong_title_is_a_row_error() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let csv = format!("{HEADER}{},,,,\nOk,,,,\n", "x".repeat(300));
        let summary = import_str(&store, owner, &csv).await;

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("Row 1:"));
    }

    #[tokio::test]
    async fn test_short_rows_are_tolerated() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let csv = format!("{HEADER}Just a title\n");
        let summary = import_str(&store, owner, &csv).await;

        assert_eq!(summary.imported, 1);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn test_upload_validation_rejects_wrong_extension() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"Title\nA\n").unwrap();

        let err = CsvImporter::new()
            .import_file(&store, owner, file.path())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskdeckError::Validation { .. }));

        // Nothing was processed.
        assert!(store
            .find_tasks(owner, &TaskFilters::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_upload_validation_rejects_oversized_file() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(&vec![b'x'; (MAX_IMPORT_BYTES + 1) as usize])
            .unwrap();

        let err = CsvImporter::new()
            .import_file(&store, owner, file.path())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskdeckError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_import_from_file_accepts_csv_and_txt() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        for suffix in [".csv", ".txt", ".CSV"] {
            let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
            write!(file, "{HEADER}From {suffix},,,,\n").unwrap();
            file.flush().unwrap();

            let summary = CsvImporter::new()
                .import_file(&store, owner, file.path())
                .await
                .unwrap();
            assert_eq!(summary.imported, 1);
        }
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let store = create_test_store().await;
        let owner = Uuid::new_v4();

        let category = store.find_or_create_category(owner, "Errands").await.unwrap();
        store
            .create_task(
                owner,
                crate::models::CreateTaskRequest {
                    title: "Quoted, \"title\"".to_string(),
                    description: Some("line one".to_string()),
                    completed: Some(true),
                    due_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 4),
                    category_id: Some(category.id),
                },
            )
            .await
            .unwrap();
        store
            .create_task(
                owner,
                crate::models::CreateTaskRequest {
                    title: "Plain".to_string(),
                    ..crate::models::CreateTaskRequest::default()
                },
            )
            .await
            .unwrap();

        let mut buffer = Vec::new();
        CsvExporter::new()
            .export(&store, owner, &TaskFilters::default(), &mut buffer)
            .await
            .unwrap();

        // Re-import into a fresh owner and compare the surviving fields.
        let other = Uuid::new_v4();
        let summary = CsvImporter::new()
            .import_reader(&store, other, Cursor::new(buffer))
            .await
            .unwrap();
        assert_eq!(summary.imported, 2);
        assert!(summary.errors.is_empty());

        let original = store.find_tasks(owner, &TaskFilters::default()).await.unwrap();
        let reimported = store.find_tasks(other, &TaskFilters::default()).await.unwrap();
        assert_eq!(original.len(), reimported.len());
        for task in &original {
            let twin = reimported
                .iter()
                .find(|t| t.title == task.title)
                .expect("round-tripped task");
            assert_eq!(twin.description, task.description);
            assert_eq!(twin.completed, task.completed);
            assert_eq!(twin.due_date, task.due_date);
            assert_eq!(twin.category_name, task.category_name);
        }
    }
}
