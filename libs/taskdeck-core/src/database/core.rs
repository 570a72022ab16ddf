//! SQLite-backed implementation of the task repository

use crate::database::mappers::{
    map_category_row, map_task_row, DATE_FORMAT, TIMESTAMP_FORMAT,
};
use crate::database::query_builders::{
    bind_values, SqlValue, TaskSelectBuilder, TaskUpdateBuilder, TASK_SELECT,
};
use crate::database::validators::validate_category_owned;
use crate::error::{Result, TaskdeckError};
use crate::models::{
    validate_color, validate_name, Category, CreateCategoryRequest, CreateTaskRequest, Task,
    TaskFilters, UpdateCategoryRequest, UpdateTaskRequest, DEFAULT_CATEGORY_COLOR,
};
use crate::repository::TaskRepository;
use async_stream::try_stream;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use futures_core::stream::BoxStream;
use futures_util::TryStreamExt;
use sqlx::pool::PoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    color TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (owner_id, name)
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    due_date TEXT,
    category_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner_created ON tasks (owner_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks (category_id);
";

/// Connection pool configuration for the task store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Minimum number of pooled connections
    pub min_connections: u32,
    /// How long to wait for a connection before failing
    pub acquire_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// SQLite-backed task and category store
#[derive(Debug, Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    /// Open (or create) the store at `database_path` with default options
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    #[instrument]
    pub async fn new(database_path: &Path) -> Result<Self> {
        Self::new_with_options(database_path, StoreOptions::default()).await
    }

    /// Open (or create) the store at `database_path`
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    #[instrument]
    pub async fn new_with_options(database_path: &Path, options: StoreOptions) -> Result<Self> {
        info!("Opening task store at {}", database_path.display());

        let connect_options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = PoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| TaskdeckError::database(format!("failed to connect: {e}")))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory store
    ///
    /// A single connection keeps the whole database alive; in-memory SQLite
    /// databases are per-connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails.
    pub async fn in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| TaskdeckError::database(format!("invalid connection string: {e}")))?
            .foreign_keys(true);

        let pool = PoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .map_err(|e| TaskdeckError::database(format!("failed to connect: {e}")))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(pool)
            .await
            .map_err(|e| TaskdeckError::database(format!("migration failed: {e}")))?;
        debug!("Schema is up to date");
        Ok(())
    }

    /// Current time truncated to the stored timestamp precision
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }

    /// Fetch a task by id and enforce ownership
    ///
    /// A missing id is `TaskNotFound`; an id owned by someone else is
    /// `Forbidden` with no detail about the other owner.
    async fn owned_task(&self, owner: Uuid, id: Uuid) -> Result<Task> {
        let row = sqlx::query(&format!("{TASK_SELECT} WHERE t.id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| TaskdeckError::task_not_found(id))?;

        let task = map_task_row(&row)?;
        if task.owner_id != owner {
            return Err(TaskdeckError::forbidden("task belongs to another user"));
        }
        Ok(task)
    }

    /// Fetch a category by id and enforce ownership
    async fn owned_category(&self, owner: Uuid, id: Uuid) -> Result<Category> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, color, created_at, updated_at \
             FROM categories WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TaskdeckError::category_not_found(id))?;

        let category = map_category_row(&row)?;
        if category.owner_id != owner {
            return Err(TaskdeckError::forbidden(
                "category belongs to another user",
            ));
        }
        Ok(category)
    }

    async fn category_by_name(&self, owner: Uuid, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, color, created_at, updated_at \
             FROM categories WHERE owner_id = ? AND name = ?",
        )
        .bind(owner.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_category_row).transpose()
    }
}

#[async_trait]
impl TaskRepository for TaskStore {
    #[instrument(skip(self))]
    async fn find_tasks(&self, owner: Uuid, filters: &TaskFilters) -> Result<Vec<Task>> {
        let builder = TaskSelectBuilder::for_owner(owner).with_filters(filters);
        let sql = builder.sql();
        let binds = builder.into_binds();

        let rows = bind_values(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;

        let tasks = rows.iter().map(map_task_row).collect::<Result<Vec<_>>>()?;
        debug!("Fetched {} tasks", tasks.len());
        Ok(tasks)
    }

    fn stream_tasks(&self, owner: Uuid, filters: TaskFilters) -> BoxStream<'static, Result<Task>> {
        let pool = self.pool.clone();
        Box::pin(try_stream! {
            let builder = TaskSelectBuilder::for_owner(owner).with_filters(&filters);
            let sql = builder.sql();
            let binds = builder.into_binds();

            let mut rows = bind_values(sqlx::query(&sql), &binds).fetch(&pool);
            while let Some(row) = rows.try_next().await? {
                let task = map_task_row(&row)?;
                yield task;
            }
        })
    }

    #[instrument(skip(self))]
    async fn get_task(&self, owner: Uuid, id: Uuid) -> Result<Task> {
        self.owned_task(owner, id).await
    }

    #[instrument(skip(self, request))]
    async fn create_task(&self, owner: Uuid, request: CreateTaskRequest) -> Result<Task> {
        validate_name("title", &request.title)?;

        if let Some(category_id) = request.category_id {
            validate_category_owned(&self.pool, owner, category_id).await?;
        }

        let id = Uuid::new_v4();
        let now = Self::now().format(TIMESTAMP_FORMAT).to_string();

        sqlx::query(
            "INSERT INTO tasks \
             (id, owner_id, title, description, completed, due_date, category_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .bind(&request.title)
        .bind(&request.description)
        .bind(i64::from(request.completed.unwrap_or(false)))
        .bind(request.due_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(request.category_id.map(|c| c.to_string()))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!("Created task {id}");
        self.owned_task(owner, id).await
    }

    #[instrument(skip(self, request))]
    async fn update_task(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateTaskRequest,
    ) -> Result<Task> {
        let task = self.owned_task(owner, id).await?;
        if request.is_empty() {
            return Ok(task);
        }

        if let Some(title) = &request.title {
            validate_name("title", title)?;
        }
        if let Some(category_id) = request.category_id {
            validate_category_owned(&self.pool, owner, category_id).await?;
        }

        let (sql, mut binds) = TaskUpdateBuilder::from_request(&request).sql_and_binds(Self::now());
        binds.push(SqlValue::Text(id.to_string()));
        binds.push(SqlValue::Text(owner.to_string()));

        bind_values(sqlx::query(&sql), &binds)
            .execute(&self.pool)
            .await?;

        self.owned_task(owner, id).await
    }

    #[instrument(skip(self))]
    async fn toggle_task(&self, owner: Uuid, id: Uuid) -> Result<Task> {
        let task = self.owned_task(owner, id).await?;

        sqlx::query("UPDATE tasks SET completed = ?, updated_at = ? WHERE id = ?")
            .bind(i64::from(!task.completed))
            .bind(Self::now().format(TIMESTAMP_FORMAT).to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.owned_task(owner, id).await
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<()> {
        self.owned_task(owner, id).await?;

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        info!("Deleted task {id}");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_or_create_category(&self, owner: Uuid, name: &str) -> Result<Category> {
        validate_name("category name", name)?;

        // Insert-then-select keeps concurrent resolutions of the same name
        // idempotent: the unique (owner_id, name) constraint swallows the
        // losing insert and both callers read back the same row.
        let id = Uuid::new_v4();
        let now = Self::now().format(TIMESTAMP_FORMAT).to_string();

        let inserted = sqlx::query(
            "INSERT INTO categories (id, owner_id, name, color, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (owner_id, name) DO NOTHING",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .bind(name)
        .bind(DEFAULT_CATEGORY_COLOR)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            info!("Created category {id} ({name:?})");
        }

        self.category_by_name(owner, name)
            .await?
            .ok_or_else(|| TaskdeckError::database(format!("category {name:?} vanished")))
    }

    #[instrument(skip(self))]
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT c.id, c.owner_id, c.name, c.color, c.created_at, c.updated_at, \
             COUNT(t.id) AS task_count \
             FROM categories c LEFT JOIN tasks t ON t.category_id = c.id \
             WHERE c.owner_id = ? \
             GROUP BY c.id \
             ORDER BY c.name ASC",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_category_row).collect()
    }

    #[instrument(skip(self, request))]
    async fn create_category(
        &self,
        owner: Uuid,
        request: CreateCategoryRequest,
    ) -> Result<Category> {
        validate_name("category name", &request.name)?;
        let color = request
            .color
            .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
        validate_color(&color)?;

        let id = Uuid::new_v4();
        let now = Self::now().format(TIMESTAMP_FORMAT).to_string();

        let inserted = sqlx::query(
            "INSERT INTO categories (id, owner_id, name, color, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (owner_id, name) DO NOTHING",
        )
        .bind(id.to_string())
        .bind(owner.to_string())
        .bind(&request.name)
        .bind(&color)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(TaskdeckError::validation(format!(
                "category {:?} already exists",
                request.name
            )));
        }

        info!("Created category {id}");
        self.owned_category(owner, id).await
    }

    #[instrument(skip(self, request))]
    async fn update_category(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<Category> {
        self.owned_category(owner, id).await?;

        if let Some(name) = &request.name {
            validate_name("category name", name)?;
        }
        if let Some(color) = &request.color {
            validate_color(color)?;
        }

        sqlx::query(
            "UPDATE categories SET name = COALESCE(?, name), color = COALESCE(?, color), \
             updated_at = ? WHERE id = ?",
        )
        .bind(request.name.as_deref())
        .bind(request.color.as_deref())
        .bind(Self::now().format(TIMESTAMP_FORMAT).to_string())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                TaskdeckError::validation("a category with that name already exists")
            }
            _ => e.into(),
        })?;

        self.owned_category(owner, id).await
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<()> {
        self.owned_category(owner, id).await?;

        // Detach tasks and remove the category atomically; tasks survive
        // with their category reference nulled.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE tasks SET category_id = NULL WHERE category_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Deleted category {id}");
        Ok(())
    }
}
