use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One raw result item as returned by the search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Stable external id.
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Full vendor payload, stored verbatim.
    pub payload: serde_json::Value,
}

/// Result of one search API call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    /// Credits the call actually consumed.
    pub credits_used: u64,
}

/// A fetched item as held by the cache.
///
/// Stored exactly once per external id; keyword associations accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedItem {
    pub id: String,
    pub text: String,
    pub payload: serde_json::Value,
    /// blake3 hash of the serialized payload.
    pub payload_hash: String,
    /// Every keyword whose search surfaced this item.
    pub keywords: BTreeSet<String>,
    pub fetched_at: DateTime<Utc>,
    /// End of the short reuse window.
    pub expires_at: DateTime<Utc>,
    /// Retention boundary; a sweep after this instant purges the item.
    pub purge_after: DateTime<Utc>,
}

impl CachedItem {
    pub fn from_search_item(
        item: SearchItem,
        keywords: impl IntoIterator<Item = String>,
        fetched_at: DateTime<Utc>,
        reuse_ttl: Duration,
        retention: Duration,
    ) -> Self {
        let payload_hash = hash_payload(&item.payload);
        Self {
            id: item.id,
            text: item.text,
            payload: item.payload,
            payload_hash,
            keywords: keywords.into_iter().collect(),
            fetched_at,
            expires_at: fetched_at + reuse_ttl,
            purge_after: fetched_at + retention,
        }
    }

    /// Inside the reuse window.
    pub fn is_reusable(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    /// Past the retention boundary.
    pub fn is_purgeable(&self, now: DateTime<Utc>) -> bool {
        now > self.purge_after
    }
}

/// Content hash of a payload, hex-encoded.
pub fn hash_payload(payload: &serde_json::Value) -> String {
    blake3::hash(payload.to_string().as_bytes())
        .to_hex()
        .to_string()
}
