//! # scout-core
//!
//! Foundation crate for the Scout keyword search optimizer.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ScoutConfig;
pub use errors::{ScoutError, ScoutResult};
pub use models::{
    CachedItem, CycleReport, FeedbackEvent, KeywordRecord, KeywordTier, Outcome, QuotaLedger,
    QuotaUsage, SearchFilters, SearchItem, SearchQuery, SearchResponse, SkipReason, Weight,
};
