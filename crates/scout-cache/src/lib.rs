//! # scout-cache
//!
//! Every item a credit ever bought, irrelevant ones included, so nothing is
//! purchased twice. Items are keyed by external id and indexed by the
//! keywords that surfaced them. A per-keyword search log answers "was this
//! keyword searched recently", which lets the scheduler skip repeat searches.

pub mod coverage;
pub mod engine;
pub mod sweep;

pub use engine::{CacheStats, HydrateStats, PutOutcome, TweetCache};
pub use sweep::SweepStats;
