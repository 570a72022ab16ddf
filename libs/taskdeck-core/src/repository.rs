//! Repository contract between the task pipelines and persistence
//!
//! The import/export pipelines depend on this trait, never on a concrete
//! store. Every call takes an explicit owner id; the core never reads
//! identity from ambient state.

use crate::error::Result;
use crate::models::{
    Category, CreateCategoryRequest, CreateTaskRequest, Task, TaskFilters, UpdateCategoryRequest,
    UpdateTaskRequest,
};
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use uuid::Uuid;

/// Abstract contract for querying and mutating tasks and categories
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch the owner's tasks matching `filters`, newest first
    async fn find_tasks(&self, owner: Uuid, filters: &TaskFilters) -> Result<Vec<Task>>;

    /// Stream the owner's tasks matching `filters`, newest first
    ///
    /// Rows are yielded one at a time so callers can serialize arbitrarily
    /// large result sets without buffering them.
    fn stream_tasks(&self, owner: Uuid, filters: TaskFilters) -> BoxStream<'static, Result<Task>>;

    /// Fetch a single task owned by `owner`
    async fn get_task(&self, owner: Uuid, id: Uuid) -> Result<Task>;

    /// Create a task owned by `owner`; timestamps are store-assigned
    async fn create_task(&self, owner: Uuid, request: CreateTaskRequest) -> Result<Task>;

    /// Apply a partial update to a task owned by `owner`
    async fn update_task(&self, owner: Uuid, id: Uuid, request: UpdateTaskRequest)
        -> Result<Task>;

    /// Flip a task's completion flag
    async fn toggle_task(&self, owner: Uuid, id: Uuid) -> Result<Task>;

    /// Delete a task owned by `owner`
    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<()>;

    /// Look up a category by exact name for `owner`, creating it with the
    /// default color if it does not exist
    ///
    /// Idempotent: repeated calls with the same `(owner, name)` return the
    /// same category, including under concurrent callers.
    async fn find_or_create_category(&self, owner: Uuid, name: &str) -> Result<Category>;

    /// List the owner's categories, ordered by name
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>>;

    /// Create a category owned by `owner`
    async fn create_category(&self, owner: Uuid, request: CreateCategoryRequest)
        -> Result<Category>;

    /// Apply a partial update to a category owned by `owner`
    async fn update_category(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<Category>;

    /// Delete a category owned by `owner`, detaching its tasks
    ///
    /// Tasks referencing the category keep existing; their category
    /// reference is nulled, not cascaded.
    async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<()>;
}
