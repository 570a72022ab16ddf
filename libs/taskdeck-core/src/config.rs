//! Configuration for taskdeck database access

use crate::error::{Result, TaskdeckError};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Environment variable overriding the database location
pub const DATABASE_PATH_ENV: &str = "TASKDECK_DATABASE_PATH";

/// Environment variable selecting the owner profile
pub const OWNER_ENV: &str = "TASKDECK_OWNER";

/// Configuration for the task store and the acting owner
#[derive(Debug, Clone)]
pub struct TaskdeckConfig {
    /// Path to the SQLite database (created on first use)
    pub database_path: PathBuf,
    /// Owner identity threaded through every repository call
    pub default_owner: Uuid,
}

impl TaskdeckConfig {
    /// Create a configuration with an explicit database path and owner
    #[must_use]
    pub fn new<P: AsRef<Path>>(database_path: P, default_owner: Uuid) -> Self {
        Self {
            database_path: database_path.as_ref().to_path_buf(),
            default_owner,
        }
    }

    /// Default database location under the user data directory
    ///
    /// `$XDG_DATA_HOME/taskdeck/tasks.db`, falling back to
    /// `$HOME/.local/share/taskdeck/tasks.db`, then the working directory.
    #[must_use]
    pub fn default_database_path() -> PathBuf {
        if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(data_home).join("taskdeck").join("tasks.db");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskdeck")
                .join("tasks.db");
        }
        PathBuf::from("tasks.db")
    }

    /// Create a configuration from the environment
    ///
    /// Reads `TASKDECK_DATABASE_PATH` and `TASKDECK_OWNER`. Single-user
    /// installs that set no owner use the nil UUID.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `TASKDECK_OWNER` is set but is not
    /// a valid UUID.
    pub fn from_env() -> Result<Self> {
        let database_path = std::env::var(DATABASE_PATH_ENV)
            .map_or_else(|_| Self::default_database_path(), PathBuf::from);

        let default_owner = match std::env::var(OWNER_ENV) {
            Ok(raw) => Uuid::parse_str(raw.trim()).map_err(|e| {
                TaskdeckError::configuration(format!("invalid {OWNER_ENV}: {e}"))
            })?,
            Err(_) => Uuid::nil(),
        };

        Ok(Self {
            database_path,
            default_owner,
        })
    }

    /// Ensure the database's parent directory exists
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
