use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::ScoutResult;
use crate::models::{CachedItem, FeedbackEvent, KeywordRecord, QuotaLedger};

/// Records decoded by a bulk load plus the number of corrupt rows skipped.
#[derive(Debug, Clone)]
pub struct LoadOutcome<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for LoadOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

/// Durable keyword weights.
pub trait IKeywordStore: Send + Sync {
    fn upsert_keyword(&self, record: &KeywordRecord) -> ScoutResult<()>;
    fn upsert_keywords(&self, records: &[KeywordRecord]) -> ScoutResult<usize>;
    fn load_keywords(&self) -> ScoutResult<LoadOutcome<KeywordRecord>>;
}

/// Durable cache entries and the per-keyword search log.
pub trait IItemStore: Send + Sync {
    fn upsert_item(&self, item: &CachedItem) -> ScoutResult<()>;
    fn load_items(&self) -> ScoutResult<LoadOutcome<CachedItem>>;
    fn delete_items(&self, ids: &[String]) -> ScoutResult<usize>;
    fn record_search(&self, keyword: &str, at: DateTime<Utc>) -> ScoutResult<()>;
    fn load_search_log(&self) -> ScoutResult<Vec<(String, DateTime<Utc>)>>;
    /// Drop search log entries older than `before`. Returns the rows removed.
    fn prune_search_log(&self, before: DateTime<Utc>) -> ScoutResult<usize>;
}

/// Durable quota ledger and daily consumption history.
pub trait ILedgerStore: Send + Sync {
    fn save_ledger(&self, ledger: &QuotaLedger) -> ScoutResult<()>;
    /// The ledger whose period contains `at`, if one was saved.
    fn load_ledger(&self, at: DateTime<Utc>) -> ScoutResult<Option<QuotaLedger>>;
    fn add_daily_usage(&self, day: NaiveDate, credits: u64) -> ScoutResult<()>;
    fn load_daily_usage(&self, since: NaiveDate) -> ScoutResult<Vec<(NaiveDate, u64)>>;
}

/// Durable record of consumed feedback events.
pub trait IFeedbackLog: Send + Sync {
    /// Record an applied event. Returns false if it was already recorded.
    fn record_feedback(&self, event: &FeedbackEvent, applied_at: DateTime<Utc>)
        -> ScoutResult<bool>;
    fn is_recorded(&self, id: &Uuid) -> ScoutResult<bool>;
}
