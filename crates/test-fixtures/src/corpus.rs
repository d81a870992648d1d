//! Keyword corpora.

use chrono::{DateTime, Utc};

use scout_core::models::{KeywordRecord, Weight};

/// `n` distinct keywords: `topic000`, `topic001`, ...
pub fn keyword_corpus(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("topic{i:03}")).collect()
}

/// Records for `keywords`, all at `weight`.
pub fn records_at(keywords: &[String], weight: f64, now: DateTime<Utc>) -> Vec<KeywordRecord> {
    keywords
        .iter()
        .map(|k| KeywordRecord::with_weight(k.clone(), Weight::new(weight), now))
        .collect()
}

/// A small, realistic political keyword set.
pub const POLITICAL_KEYWORDS: &[&str] = &[
    "federalism",
    "filibuster",
    "gerrymandering",
    "ranked choice voting",
    "campaign finance",
    "supreme court",
    "tariffs",
    "immigration reform",
    "electoral college",
    "term limits",
];
