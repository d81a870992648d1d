//! TweetCache: item store, keyword index and search log.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use scout_core::config::CacheConfig;
use scout_core::errors::ScoutResult;
use scout_core::models::{normalize_keyword, CachedItem, SearchItem};
use scout_core::traits::IItemStore;

use crate::coverage;
use crate::sweep::{self, SweepStats};

/// Whether `put` stored a new item or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Merged,
}

impl PutOutcome {
    pub fn is_new(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_items: usize,
    /// Items still inside their reuse window.
    pub reusable_items: usize,
    /// Distinct keywords with at least one cached item.
    pub keywords_indexed: usize,
    /// Distinct keywords with a recorded search.
    pub keywords_searched: usize,
}

/// Counts from loading persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrateStats {
    pub items: usize,
    pub searches: usize,
    pub corrupt_skipped: usize,
}

/// Cache of every fetched item.
///
/// Items are stored once per external id. Re-ingesting an id merges keyword
/// associations. With a store attached every mutation is written through.
pub struct TweetCache {
    items: DashMap<String, CachedItem>,
    /// keyword -> ids of items it surfaced.
    keyword_index: DashMap<String, HashSet<String>>,
    /// keyword -> last time it was searched.
    search_log: DashMap<String, DateTime<Utc>>,
    reuse_ttl: Duration,
    retention: Duration,
    store: Option<Arc<dyn IItemStore>>,
}

impl TweetCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            items: DashMap::new(),
            keyword_index: DashMap::new(),
            search_log: DashMap::new(),
            reuse_ttl: config.reuse_ttl(),
            retention: config.retention(),
            store: None,
        }
    }

    /// Create a cache that writes every change through to `store`.
    pub fn with_store(config: &CacheConfig, store: Arc<dyn IItemStore>) -> Self {
        let mut cache = Self::new(config);
        cache.store = Some(store);
        cache
    }

    pub fn reuse_ttl(&self) -> Duration {
        self.reuse_ttl
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Load items and the search log from the attached store.
    /// Corrupt rows were already skipped by the store; their count is reported.
    pub fn hydrate(&self) -> ScoutResult<HydrateStats> {
        let Some(store) = &self.store else {
            return Ok(HydrateStats::default());
        };

        let loaded = store.load_items()?;
        let mut stats = HydrateStats {
            corrupt_skipped: loaded.skipped,
            ..Default::default()
        };
        for item in loaded.records {
            self.index_item(&item);
            self.items.insert(item.id.clone(), item);
            stats.items += 1;
        }
        for (keyword, at) in store.load_search_log()? {
            self.search_log.insert(keyword, at);
            stats.searches += 1;
        }

        info!(
            items = stats.items,
            searches = stats.searches,
            corrupt_skipped = stats.corrupt_skipped,
            "cache hydrated"
        );
        Ok(stats)
    }

    /// Wrap a freshly fetched item with this cache's TTLs and store it.
    pub fn ingest(
        &self,
        item: SearchItem,
        keywords: &[String],
        fetched_at: DateTime<Utc>,
    ) -> ScoutResult<PutOutcome> {
        let cached = CachedItem::from_search_item(
            item,
            keywords.iter().map(|k| normalize_keyword(k)),
            fetched_at,
            self.reuse_ttl,
            self.retention,
        );
        self.put(cached)
    }

    /// Store an item. Idempotent per id: a known id gains the new keywords
    /// and the later of the two lifetimes; its payload is not replaced.
    pub fn put(&self, item: CachedItem) -> ScoutResult<PutOutcome> {
        let (outcome, stored) = match self.items.entry(item.id.clone()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.keywords.extend(item.keywords.iter().cloned());
                existing.expires_at = existing.expires_at.max(item.expires_at);
                existing.purge_after = existing.purge_after.max(item.purge_after);
                (PutOutcome::Merged, existing.clone())
            }
            Entry::Vacant(entry) => {
                let stored = entry.insert(item).clone();
                (PutOutcome::Inserted, stored)
            }
        };

        self.index_item(&stored);
        if let Some(store) = &self.store {
            store.upsert_item(&stored)?;
        }
        debug!(id = %stored.id, outcome = ?outcome, keywords = stored.keywords.len(), "item cached");
        Ok(outcome)
    }

    pub fn get(&self, id: &str) -> Option<CachedItem> {
        self.items.get(id).map(|item| item.clone())
    }

    /// Items surfaced by `keyword` that are still inside their reuse window,
    /// newest first.
    pub fn lookup_by_keyword(&self, keyword: &str, now: DateTime<Utc>) -> Vec<CachedItem> {
        let key = normalize_keyword(keyword);
        let Some(ids) = self.keyword_index.get(&key) else {
            return Vec::new();
        };

        let mut found: Vec<CachedItem> = ids
            .iter()
            .filter_map(|id| self.items.get(id).map(|item| item.clone()))
            .filter(|item| item.is_reusable(now))
            .collect();
        found.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at).then_with(|| a.id.cmp(&b.id)));
        found
    }

    /// Note that `keyword` was searched at `at`.
    pub fn record_search(&self, keyword: &str, at: DateTime<Utc>) -> ScoutResult<()> {
        let key = normalize_keyword(keyword);
        self.search_log
            .entry(key.clone())
            .and_modify(|last| *last = (*last).max(at))
            .or_insert(at);
        if let Some(store) = &self.store {
            store.record_search(&key, at)?;
        }
        Ok(())
    }

    pub fn last_searched(&self, keyword: &str) -> Option<DateTime<Utc>> {
        self.search_log
            .get(&normalize_keyword(keyword))
            .map(|at| *at)
    }

    /// Whether `keyword` was searched less than `within` before `now`.
    pub fn is_keyword_covered_recently(
        &self,
        keyword: &str,
        within: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        coverage::is_covered(self.last_searched(keyword), within, now)
    }

    /// Coverage check against the configured reuse TTL.
    pub fn is_covered(&self, keyword: &str, now: DateTime<Utc>) -> bool {
        self.is_keyword_covered_recently(keyword, self.reuse_ttl, now)
    }

    /// Purge items past the retention boundary and search log entries older
    /// than the retention window. Items only past the reuse TTL stay.
    pub fn sweep(&self, now: DateTime<Utc>) -> ScoutResult<SweepStats> {
        let purge = sweep::purgeable_ids(self.items.iter(), now);

        let mut purged = 0usize;
        for id in &purge {
            if let Some((_, item)) = self.items.remove(id) {
                self.unindex_item(&item);
                purged += 1;
            }
        }

        let horizon = now - self.retention;
        let stale_searches: Vec<String> = self
            .search_log
            .iter()
            .filter(|e| *e.value() < horizon)
            .map(|e| e.key().clone())
            .collect();
        for keyword in &stale_searches {
            self.search_log.remove(keyword);
        }

        if let Some(store) = &self.store {
            if !purge.is_empty() {
                let deleted = store.delete_items(&purge)?;
                if deleted != purge.len() {
                    warn!(expected = purge.len(), deleted, "sweep deleted fewer rows than purged");
                }
            }
            let pruned = store.prune_search_log(horizon)?;
            if pruned != stale_searches.len() {
                debug!(in_memory = stale_searches.len(), pruned, "search log prune counts differ");
            }
        }

        Ok(SweepStats {
            purged,
            remaining: self.items.len(),
            search_log_pruned: stale_searches.len(),
        })
    }

    pub fn stats(&self, now: DateTime<Utc>) -> CacheStats {
        CacheStats {
            total_items: self.items.len(),
            reusable_items: self.items.iter().filter(|e| e.is_reusable(now)).count(),
            keywords_indexed: self.keyword_index.len(),
            keywords_searched: self.search_log.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn index_item(&self, item: &CachedItem) {
        for keyword in &item.keywords {
            self.keyword_index
                .entry(keyword.clone())
                .or_default()
                .insert(item.id.clone());
        }
    }

    fn unindex_item(&self, item: &CachedItem) {
        for keyword in &item.keywords {
            let now_empty = match self.keyword_index.get_mut(keyword) {
                Some(mut ids) => {
                    ids.remove(&item.id);
                    ids.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.keyword_index.remove_if(keyword, |_, ids| ids.is_empty());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, text: &str) -> SearchItem {
        SearchItem {
            id: id.to_string(),
            text: text.to_string(),
            author_id: None,
            created_at: None,
            payload: json!({ "id": id, "text": text }),
        }
    }

    #[test]
    fn put_then_merge_unions_keywords() {
        let cache = TweetCache::new(&CacheConfig::default());
        let t0 = Utc::now();
        let first = cache.ingest(item("1", "a"), &["alpha".into()], t0).unwrap();
        let second = cache.ingest(item("1", "a"), &["beta".into()], t0).unwrap();
        assert_eq!(first, PutOutcome::Inserted);
        assert_eq!(second, PutOutcome::Merged);
        assert_eq!(cache.len(), 1);
        let stored = cache.get("1").unwrap();
        assert!(stored.keywords.contains("alpha"));
        assert!(stored.keywords.contains("beta"));
    }

    #[test]
    fn unindex_drops_empty_keyword_entries() {
        let cache = TweetCache::new(&CacheConfig::default());
        let t0 = Utc::now();
        cache.ingest(item("1", "a"), &["alpha".into()], t0).unwrap();
        let stats = cache.sweep(t0 + Duration::days(91)).unwrap();
        assert_eq!(stats.purged, 1);
        assert_eq!(cache.stats(t0).keywords_indexed, 0);
    }
}
