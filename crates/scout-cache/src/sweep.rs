//! Retention sweep selection.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scout_core::models::CachedItem;

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    pub purged: usize,
    pub remaining: usize,
    pub search_log_pruned: usize,
}

/// Ids past the retention boundary at `now`.
///
/// Items merely past the reuse TTL are kept: they stay available for
/// analysis and only make their keywords eligible for re-search.
pub fn purgeable_ids<I, T>(items: I, now: DateTime<Utc>) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Deref<Target = CachedItem>,
{
    items
        .into_iter()
        .filter(|item| item.is_purgeable(now))
        .map(|item| item.id.clone())
        .collect()
}
