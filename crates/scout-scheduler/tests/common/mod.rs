//! Harness: a Scheduler over in-memory engines and the fake search client.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use scout_cache::TweetCache;
use scout_core::config::ScoutConfig;
use scout_core::models::Outcome;
use scout_learning::WeightLearner;
use scout_quota::QuotaManager;
use scout_scheduler::Scheduler;
use test_fixtures::FakeSearchClient;

pub struct Harness {
    pub scheduler: Arc<Scheduler>,
    pub learner: Arc<WeightLearner>,
    pub cache: Arc<TweetCache>,
    pub quota: Arc<QuotaManager>,
    pub client: Arc<FakeSearchClient>,
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
}

pub fn kws(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// One query per keyword, one credit per query.
pub fn one_per_query() -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.query.max_or_terms = 1;
    config
}

pub fn harness(config: ScoutConfig, client: FakeSearchClient) -> Harness {
    let learner = Arc::new(WeightLearner::new(config.learning.clone()));
    let cache = Arc::new(TweetCache::new(&config.cache));
    let quota = Arc::new(QuotaManager::new(config.quota.clone(), t0()));
    let client = Arc::new(client);
    let scheduler = Arc::new(Scheduler::new(
        &config,
        Arc::clone(&learner),
        Arc::clone(&cache),
        Arc::clone(&quota),
        client.clone(),
    ));
    Harness {
        scheduler,
        learner,
        cache,
        quota,
        client,
    }
}

impl Harness {
    /// Apply `n` judgements of `outcome` to `keyword`.
    pub fn judge(&self, keyword: &str, outcome: Outcome, n: usize) {
        for _ in 0..n {
            self.learner
                .on_feedback(&[keyword.to_string()], outcome, t0())
                .unwrap();
        }
    }

    /// Push `keyword` into the high tier (0.6 -> 0.8628).
    pub fn make_high(&self, keyword: &str) {
        self.judge(keyword, Outcome::Approved, 3);
    }

    /// Push `keyword` into the low tier (0.6 -> 0.42).
    pub fn make_low(&self, keyword: &str) {
        self.judge(keyword, Outcome::Rejected, 1);
    }
}
