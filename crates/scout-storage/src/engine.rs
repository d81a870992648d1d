//! StorageEngine: owns the ConnectionPool and implements every store trait.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use scout_core::config::StorageConfig;
use scout_core::errors::ScoutResult;
use scout_core::models::{CachedItem, FeedbackEvent, KeywordRecord, QuotaLedger};
use scout_core::traits::{IFeedbackLog, IItemStore, IKeywordStore, ILedgerStore, LoadOutcome};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{feedback_ops, item_ops, keyword_ops, ledger_ops};

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a file-backed engine with default pool settings.
    pub fn open(path: &Path) -> ScoutResult<Self> {
        Self::open_with_config(path, &StorageConfig::default())
    }

    /// Open a file-backed engine with an explicit read pool size and busy timeout.
    pub fn open_with_config(path: &Path, config: &StorageConfig) -> ScoutResult<Self> {
        let pool = ConnectionPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory engine. All reads are routed through the writer.
    pub fn open_in_memory() -> ScoutResult<Self> {
        let config = StorageConfig::default();
        let pool = ConnectionPool::open_in_memory(config.busy_timeout_ms)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open according to `config`: an empty `db_path` means in-memory.
    pub fn from_config(config: &StorageConfig) -> ScoutResult<Self> {
        if config.db_path.is_empty() {
            Self::open_in_memory()
        } else {
            Self::open_with_config(Path::new(&config.db_path), config)
        }
    }

    fn initialize(&self) -> ScoutResult<()> {
        let version = self.pool.writer.with_conn(migrations::run_migrations)?;
        info!(
            schema_version = version,
            path = ?self.pool.db_path,
            "storage ready"
        );
        Ok(())
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn schema_version(&self) -> ScoutResult<u32> {
        self.with_reader(migrations::current_version)
    }

    /// Number of consumed feedback events on record.
    pub fn feedback_count(&self) -> ScoutResult<usize> {
        self.with_reader(feedback_ops::count)
    }

    /// Run a closure on the writer. Test and maintenance hook.
    pub fn with_writer<F, T>(&self, f: F) -> ScoutResult<T>
    where
        F: FnOnce(&Connection) -> ScoutResult<T>,
    {
        self.pool.writer.with_conn(f)
    }

    /// File-backed: read pool. In-memory: writer.
    fn with_reader<F, T>(&self, f: F) -> ScoutResult<T>
    where
        F: FnOnce(&Connection) -> ScoutResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }
}

impl IKeywordStore for StorageEngine {
    fn upsert_keyword(&self, record: &KeywordRecord) -> ScoutResult<()> {
        self.pool
            .writer
            .with_conn(|conn| keyword_ops::upsert_keyword(conn, record))
    }

    fn upsert_keywords(&self, records: &[KeywordRecord]) -> ScoutResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.pool
            .writer
            .with_conn(|conn| keyword_ops::upsert_keywords(conn, records))
    }

    fn load_keywords(&self) -> ScoutResult<LoadOutcome<KeywordRecord>> {
        self.with_reader(keyword_ops::load_keywords)
    }
}

impl IItemStore for StorageEngine {
    fn upsert_item(&self, item: &CachedItem) -> ScoutResult<()> {
        self.pool.writer.with_conn(|conn| item_ops::upsert_item(conn, item))
    }

    fn load_items(&self) -> ScoutResult<LoadOutcome<CachedItem>> {
        self.with_reader(item_ops::load_items)
    }

    fn delete_items(&self, ids: &[String]) -> ScoutResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| item_ops::delete_items(conn, ids))
    }

    fn record_search(&self, keyword: &str, at: DateTime<Utc>) -> ScoutResult<()> {
        self.pool
            .writer
            .with_conn(|conn| item_ops::record_search(conn, keyword, at))
    }

    fn load_search_log(&self) -> ScoutResult<Vec<(String, DateTime<Utc>)>> {
        self.with_reader(item_ops::load_search_log)
    }

    fn prune_search_log(&self, before: DateTime<Utc>) -> ScoutResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| item_ops::prune_search_log(conn, before))
    }
}

impl ILedgerStore for StorageEngine {
    fn save_ledger(&self, ledger: &QuotaLedger) -> ScoutResult<()> {
        self.pool
            .writer
            .with_conn(|conn| ledger_ops::save_ledger(conn, ledger))
    }

    fn load_ledger(&self, at: DateTime<Utc>) -> ScoutResult<Option<QuotaLedger>> {
        self.with_reader(|conn| ledger_ops::load_ledger(conn, at))
    }

    fn add_daily_usage(&self, day: NaiveDate, credits: u64) -> ScoutResult<()> {
        self.pool
            .writer
            .with_conn(|conn| ledger_ops::add_daily_usage(conn, day, credits))
    }

    fn load_daily_usage(&self, since: NaiveDate) -> ScoutResult<Vec<(NaiveDate, u64)>> {
        self.with_reader(|conn| ledger_ops::load_daily_usage(conn, since))
    }
}

impl IFeedbackLog for StorageEngine {
    fn record_feedback(&self, event: &FeedbackEvent, applied_at: DateTime<Utc>) -> ScoutResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| feedback_ops::record_feedback(conn, event, applied_at))
    }

    /// Checked on the writer so a record made a moment ago is always visible.
    fn is_recorded(&self, id: &Uuid) -> ScoutResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| feedback_ops::is_recorded(conn, id))
    }
}
