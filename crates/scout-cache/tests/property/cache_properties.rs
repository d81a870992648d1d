//! Property tests for cache idempotence.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

use scout_cache::TweetCache;
use scout_core::config::CacheConfig;
use scout_core::models::SearchItem;

fn item(id: &str) -> SearchItem {
    SearchItem {
        id: id.to_string(),
        text: String::new(),
        author_id: None,
        created_at: None,
        payload: json!({ "id": id }),
    }
}

proptest! {
    #[test]
    fn double_ingest_stores_once_with_union_of_keywords(
        id in "[0-9]{1,12}",
        first in prop::collection::vec("[a-z]{1,8}", 0..6),
        second in prop::collection::vec("[a-z]{1,8}", 0..6),
    ) {
        let cache = TweetCache::new(&CacheConfig::default());
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

        cache.ingest(item(&id), &first, t0).unwrap();
        cache.ingest(item(&id), &second, t0).unwrap();

        prop_assert_eq!(cache.len(), 1);
        let expected: BTreeSet<String> = first.iter().chain(second.iter()).cloned().collect();
        prop_assert_eq!(cache.get(&id).unwrap().keywords, expected);
    }

    #[test]
    fn ingest_order_does_not_change_keyword_set(
        a in prop::collection::vec("[a-z]{1,8}", 1..5),
        b in prop::collection::vec("[a-z]{1,8}", 1..5),
    ) {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let left = TweetCache::new(&CacheConfig::default());
        left.ingest(item("x"), &a, t0).unwrap();
        left.ingest(item("x"), &b, t0).unwrap();

        let right = TweetCache::new(&CacheConfig::default());
        right.ingest(item("x"), &b, t0).unwrap();
        right.ingest(item("x"), &a, t0).unwrap();

        prop_assert_eq!(left.get("x").unwrap().keywords, right.get("x").unwrap().keywords);
    }
}
