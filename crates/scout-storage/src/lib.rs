//! # scout-storage
//!
//! SQLite persistence. One serialized write connection plus a small read
//! pool, WAL journaling, numbered migrations. Bulk loaders skip rows that
//! fail to decode and report how many they skipped.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use scout_core::errors::{ScoutError, StorageError};

/// Wrap a SQLite failure message as a storage error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> ScoutError {
    StorageError::SqliteError {
        message: message.into(),
    }
    .into()
}

/// A row that exists but cannot be decoded.
pub(crate) fn corruption(table: &str, key: &str, details: impl Into<String>) -> StorageError {
    StorageError::CorruptionDetected {
        table: table.to_string(),
        key: key.to_string(),
        details: details.into(),
    }
}
