//! Error types for the taskdeck core library

use thiserror::Error;

/// Result type alias for taskdeck operations
pub type Result<T> = std::result::Result<T, TaskdeckError>;

/// Main error type for taskdeck operations
#[derive(Error, Debug)]
pub enum TaskdeckError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid date: {date}")]
    InvalidDate { date: String },

    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    #[error("Category not found: {id}")]
    CategoryNotFound { id: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl TaskdeckError {
    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create an invalid-date error
    pub fn invalid_date(date: impl Into<String>) -> Self {
        Self::InvalidDate { date: date.into() }
    }

    /// Create a task-not-found error
    pub fn task_not_found(id: impl ToString) -> Self {
        Self::TaskNotFound { id: id.to_string() }
    }

    /// Create a category-not-found error
    pub fn category_not_found(id: impl ToString) -> Self {
        Self::CategoryNotFound { id: id.to_string() }
    }
}

impl From<sqlx::Error> for TaskdeckError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_serialization_error_from_serde() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: TaskdeckError = json_error.into();

        match err {
            TaskdeckError::Serialization(_) => (),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_io_error_from_std() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TaskdeckError = io_error.into();

        match err {
            TaskdeckError::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_forbidden_error_display() {
        let err = TaskdeckError::forbidden("task belongs to another user");

        assert!(err.to_string().contains("Forbidden"));
        assert!(err.to_string().contains("another user"));
    }

    #[test]
    fn test_invalid_date_error_display() {
        let err = TaskdeckError::invalid_date("not-a-date");

        assert!(err.to_string().contains("Invalid date"));
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_validation_error_helper() {
        let err = TaskdeckError::validation("title must not be empty");

        match &err {
            TaskdeckError::Validation { message } => {
                assert_eq!(message, "title must not be empty");
            }
            _ => panic!("Expected Validation error"),
        }
    }
}
