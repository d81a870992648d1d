//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use scout_core::errors::ScoutResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file. The writer is
    /// opened first so the file exists before read-only connections attach.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> ScoutResult<Self> {
        let writer = WriteConnection::open(path, busy_timeout_ms)?;
        let readers = ReadPool::open(path, read_pool_size, busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// In-memory databases are private to their connection, so there is no
    /// read pool; every read goes through the writer.
    pub fn open_in_memory(busy_timeout_ms: u32) -> ScoutResult<Self> {
        let writer = WriteConnection::open_in_memory(busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: None,
            db_path: None,
        })
    }
}
