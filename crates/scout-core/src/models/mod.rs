pub mod cycle_report;
pub mod feedback;
pub mod filters;
pub mod item;
pub mod keyword;
pub mod query;
pub mod quota;

pub use cycle_report::{CycleError, CycleReport, CycleStatus, SkipReason, SkippedKeyword};
pub use feedback::{FeedbackEvent, Outcome};
pub use filters::SearchFilters;
pub use item::{CachedItem, SearchItem, SearchResponse};
pub use keyword::{normalize_keyword, KeywordRecord, KeywordTier, Weight};
pub use query::SearchQuery;
pub use quota::{QuotaLedger, QuotaUsage};
