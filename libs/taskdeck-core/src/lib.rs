//! taskdeck core - personal task tracking with CSV import/export
//!
//! This library implements the task data pipeline behind taskdeck:
//! owner-scoped task and category storage, filtered retrieval with computed
//! due-date status, and a streaming CSV import/export subsystem with
//! row-level error recovery.
//!
//! # Quick start
//!
//! ```no_run
//! use taskdeck_core::{CreateTaskRequest, TaskFilters, TaskRepository, TaskStore};
//! use std::path::Path;
//! use uuid::Uuid;
//!
//! # async fn example() -> taskdeck_core::Result<()> {
//! let store = TaskStore::new(Path::new("tasks.db")).await?;
//! let owner = Uuid::nil();
//!
//! store
//!     .create_task(
//!         owner,
//!         CreateTaskRequest {
//!             title: "Buy milk".to_string(),
//!             ..CreateTaskRequest::default()
//!         },
//!     )
//!     .await?;
//!
//! let tasks = store.find_tasks(owner, &TaskFilters::default()).await?;
//! println!("{} open tasks", tasks.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Crate features
//!
//! - `test-utils`: in-memory store factory and mock data seeding (testing only)

pub mod config;
pub mod database;
pub mod due;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod query;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::TaskdeckConfig;
pub use database::{StoreOptions, TaskStore};
pub use due::DueStatus;
pub use error::{Result, TaskdeckError};
pub use export::{CsvExporter, CSV_CONTENT_TYPE, EXPORT_HEADER};
pub use import::{CsvImporter, ImportSummary, ALLOWED_EXTENSIONS, MAX_IMPORT_BYTES};
pub use models::{
    Category, CreateCategoryRequest, CreateTaskRequest, Task, TaskFilters, UpdateCategoryRequest,
    UpdateTaskRequest, DEFAULT_CATEGORY_COLOR, MAX_NAME_LEN,
};
pub use query::TaskFilterBuilder;
pub use repository::TaskRepository;

/// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use uuid::Uuid;
