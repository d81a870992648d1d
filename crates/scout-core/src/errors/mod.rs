//! Error handling for Scout.
//! One error enum per subsystem, `thiserror` only, aggregated into `ScoutError`.

pub mod config_error;
pub mod error_code;
pub mod query_error;
pub mod quota_error;
pub mod scheduler_error;
pub mod scout_error;
pub mod search_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::ScoutErrorCode;
pub use query_error::QueryError;
pub use quota_error::QuotaError;
pub use scheduler_error::SchedulerError;
pub use scout_error::{ScoutError, ScoutResult};
pub use search_error::SearchError;
pub use storage_error::StorageError;
