//! Storage error types

use crate::scheduler::{ConfigError, SchedulerError};

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Item or review state not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Grade outside the four recognized values
    #[error("Invalid grade: {0}")]
    InvalidGrade(String),
    /// Review log id already present
    #[error("Duplicate review log: {0}")]
    DuplicateLog(String),
    /// State was written but the matching log was not
    #[error("Partial commit: {0}")]
    PartialCommit(String),
    /// Rejected scheduler configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

impl From<SchedulerError> for StorageError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::InvalidGrade(value) => StorageError::InvalidGrade(value),
        }
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;
