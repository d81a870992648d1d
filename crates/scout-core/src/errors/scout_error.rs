use super::{ConfigError, QueryError, QuotaError, SchedulerError, SearchError, StorageError};

/// Top-level error for every Scout subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("query error: {0}")]
    QueryError(#[from] QueryError),

    #[error("quota error: {0}")]
    QuotaError(#[from] QuotaError),

    #[error("search error: {0}")]
    SearchError(#[from] SearchError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("scheduler error: {0}")]
    SchedulerError(#[from] SchedulerError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience alias used across the workspace.
pub type ScoutResult<T> = Result<T, ScoutError>;
