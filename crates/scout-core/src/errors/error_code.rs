//! Stable machine-readable error codes.

use super::{
    ConfigError, QueryError, QuotaError, SchedulerError, ScoutError, SearchError, StorageError,
};

pub const FILTER_CONFLICT: &str = "FILTER_CONFLICT";
pub const INVALID_FILTER: &str = "INVALID_FILTER";
pub const KEYWORD_TOO_LONG: &str = "KEYWORD_TOO_LONG";
pub const INVALID_KEYWORD: &str = "INVALID_KEYWORD";
pub const QUOTA_EXCEEDED: &str = "QUOTA_EXCEEDED";
pub const RATE_LIMITED: &str = "RATE_LIMITED";
pub const UNKNOWN_RESERVATION: &str = "UNKNOWN_RESERVATION";
pub const SEARCH_API_ERROR: &str = "SEARCH_API_ERROR";
pub const SEARCH_TIMEOUT: &str = "SEARCH_TIMEOUT";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const CACHE_CORRUPTION: &str = "CACHE_CORRUPTION";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CYCLE_IN_PROGRESS: &str = "CYCLE_IN_PROGRESS";
pub const CANCELLED: &str = "CANCELLED";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";

/// Every Scout error maps onto one of the codes above.
pub trait ScoutErrorCode {
    fn error_code(&self) -> &'static str;
}

impl ScoutErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FilterConflict { .. } => FILTER_CONFLICT,
            Self::InvalidFilter { .. } => INVALID_FILTER,
            Self::KeywordTooLong { .. } => KEYWORD_TOO_LONG,
            Self::EmptyKeyword | Self::NoKeywords => INVALID_KEYWORD,
        }
    }
}

impl ScoutErrorCode for QuotaError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => QUOTA_EXCEEDED,
            Self::RateLimited { .. } => RATE_LIMITED,
            Self::UnknownReservation { .. } => UNKNOWN_RESERVATION,
        }
    }
}

impl ScoutErrorCode for SearchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => RATE_LIMITED,
            Self::Timeout { .. } => SEARCH_TIMEOUT,
            _ => SEARCH_API_ERROR,
        }
    }
}

impl ScoutErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CorruptionDetected { .. } => CACHE_CORRUPTION,
            _ => STORAGE_ERROR,
        }
    }
}

impl ScoutErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        CONFIG_ERROR
    }
}

impl ScoutErrorCode for SchedulerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CycleInProgress => CYCLE_IN_PROGRESS,
            Self::Cancelled => CANCELLED,
        }
    }
}

impl ScoutErrorCode for ScoutError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::QueryError(e) => e.error_code(),
            Self::QuotaError(e) => e.error_code(),
            Self::SearchError(e) => e.error_code(),
            Self::StorageError(e) => e.error_code(),
            Self::ConfigError(e) => e.error_code(),
            Self::SchedulerError(e) => e.error_code(),
            Self::SerializationError(_) => SERIALIZATION_ERROR,
        }
    }
}
