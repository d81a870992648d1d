//! Cycle behaviour: selection, budget, failures, cancellation, exclusion.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as TimeDelta, NaiveDate, Utc};

use scout_cache::TweetCache;
use scout_core::constants::MAX_KEYWORDS_PER_CYCLE;
use scout_core::errors::error_code::STORAGE_ERROR;
use scout_core::errors::{
    ScoutError, ScoutErrorCode, ScoutResult, SchedulerError, SearchError, StorageError,
};
use scout_core::models::{CycleStatus, KeywordTier, Outcome, QuotaLedger, SkipReason};
use scout_core::traits::{CancellationToken, ILedgerStore};
use scout_core::ScoutConfig;
use scout_learning::WeightLearner;
use scout_quota::QuotaManager;
use scout_scheduler::Scheduler;
use test_fixtures::{keyword_corpus, FakeSearchClient};

use common::{harness, kws, one_per_query, t0};

// ── Recency ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn covered_keyword_is_skipped_until_ttl_elapses() {
    let h = harness(ScoutConfig::default(), FakeSearchClient::new());
    h.judge("federalism", Outcome::Approved, 6);
    assert!(h.learner.weight_of("federalism").value() > 0.95);
    let keywords = kws(&["federalism"]);
    let token = CancellationToken::new();

    let first = h.scheduler.run_cycle_at(&keywords, t0(), &token).await.unwrap();
    assert!(first.was_searched("federalism"));
    assert_eq!(first.status, CycleStatus::Complete);

    let next = h
        .scheduler
        .run_cycle_at(&keywords, t0() + TimeDelta::minutes(15), &token)
        .await
        .unwrap();
    assert_eq!(next.why_skipped("federalism"), Some(SkipReason::CoveredRecently));
    assert_eq!(next.queries_issued, 0);
    assert_eq!(h.client.call_count(), 1);

    let later = h
        .scheduler
        .run_cycle_at(&keywords, t0() + TimeDelta::hours(96) + TimeDelta::seconds(1), &token)
        .await
        .unwrap();
    assert!(later.was_searched("federalism"));
    assert_eq!(h.client.call_count(), 2);
}

// ── Budget ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_credits_cover_two_of_five_high_tier_keywords() {
    let mut config = one_per_query();
    config.quota.period_credits = 2;
    let h = harness(config, FakeSearchClient::new());
    let keywords = kws(&["a1", "b2", "c3", "d4", "e5"]);
    for k in &keywords {
        h.make_high(k);
    }

    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.searched, kws(&["a1", "b2"]));
    assert_eq!(
        report.skipped_for(SkipReason::BudgetExhausted),
        vec!["c3", "d4", "e5"]
    );
    assert!(report.errors.is_empty());
    assert_eq!(report.status, CycleStatus::Partial);
    assert_eq!(report.credits_spent, 2);
    assert_eq!(report.budget_remaining(), 0);
    assert_eq!(h.quota.open_reservations(), 0);
}

#[tokio::test]
async fn cycle_budget_caps_spend_below_period_budget() {
    let mut config = one_per_query();
    config.scheduler.cycle_credit_budget = 3;
    let h = harness(config, FakeSearchClient::new());
    let keywords = kws(&["a1", "b2", "c3", "d4", "e5"]);
    for k in &keywords {
        h.make_high(k);
    }

    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.searched.len(), 3);
    assert_eq!(report.credits_spent, 3);
    assert_eq!(report.skipped_for(SkipReason::BudgetExhausted).len(), 2);
}

#[tokio::test]
async fn medium_tier_respects_high_tier_reserve() {
    let mut config = one_per_query();
    config.scheduler.cycle_credit_budget = 4;
    let h = harness(config, FakeSearchClient::new());
    let keywords = kws(&["m1", "m2", "m3", "m4"]);

    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.searched, kws(&["m1", "m2"]));
    assert_eq!(
        report.skipped_for(SkipReason::BudgetExhausted),
        vec!["m3", "m4"]
    );
    assert_eq!(report.status, CycleStatus::Complete);
}

#[tokio::test]
async fn low_tier_exploration_is_capped() {
    let h = harness(one_per_query(), FakeSearchClient::new());
    let keywords = kws(&["l1", "l2", "l3", "l4", "l5"]);
    for k in &keywords {
        h.make_low(k);
    }

    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.searched, kws(&["l1", "l2", "l3"]));
    assert_eq!(report.skipped_for(SkipReason::LowTierCap), vec!["l4", "l5"]);
    let skipped = report.skipped.iter().find(|s| s.keyword == "l4").unwrap();
    assert_eq!(skipped.tier, KeywordTier::Low);
}

#[tokio::test]
async fn keywords_are_batched_into_or_queries() {
    let h = harness(ScoutConfig::default(), FakeSearchClient::new());
    let keywords = kws(&["alpha", "beta", "gamma"]);
    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.queries_issued, 1);
    assert_eq!(report.credits_spent, 1);
    assert_eq!(h.client.calls()[0].text, "(alpha OR beta OR gamma)");
}

// ── Ingest ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn results_are_attributed_and_cached() {
    let client = FakeSearchClient::new().with_shared_item("shared", "nothing in common");
    let h = harness(ScoutConfig::default(), client);
    let keywords = kws(&["alpha", "beta"]);

    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.items_found, 5);
    assert_eq!(report.new_items, 5);

    let alpha = h.cache.lookup_by_keyword("alpha", t0());
    assert_eq!(alpha.len(), 3);
    let own = h.cache.get("alpha#0").unwrap();
    assert_eq!(own.keywords.len(), 1);
    let shared = h.cache.get("shared").unwrap();
    assert_eq!(shared.keywords.len(), 2);

    assert_eq!(h.cache.last_searched("beta"), Some(t0()));
    assert_eq!(
        h.learner.record("alpha").and_then(|r| r.last_used_at),
        Some(t0())
    );
}

#[tokio::test]
async fn repeated_items_are_not_counted_as_new() {
    let client = FakeSearchClient::new().with_shared_item("shared", "x");
    let h = harness(one_per_query(), client);
    let report = h
        .scheduler
        .run_cycle_at(&kws(&["a1", "b2"]), t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.items_found, 6);
    assert_eq!(report.new_items, 5);
    assert_eq!(h.cache.len(), 5);
}

// ── Failures ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn filter_conflict_fails_before_any_spend() {
    let mut config = ScoutConfig::default();
    config.query.filters.exclude_replies = true;
    config.query.filters.only_replies = true;
    let h = harness(config, FakeSearchClient::new());

    let err = h
        .scheduler
        .run_cycle_at(&kws(&["alpha"]), t0(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "FILTER_CONFLICT");
    assert_eq!(h.client.call_count(), 0);
    assert_eq!(h.quota.current_usage(t0()).used, 0);
    assert_eq!(h.quota.open_reservations(), 0);
}

#[tokio::test]
async fn search_failure_is_reported_and_charged() {
    let client = FakeSearchClient::new();
    client.fail_on_keyword(
        "b2",
        SearchError::Network {
            reason: "connection reset".into(),
            credits_charged: 1,
        },
    );
    let h = harness(one_per_query(), client);

    let report = h
        .scheduler
        .run_cycle_at(&kws(&["a1", "b2", "c3"]), t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.searched, kws(&["a1", "c3"]));
    assert_eq!(report.why_skipped("b2"), Some(SkipReason::SearchFailed));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "SEARCH_API_ERROR");
    assert_eq!(report.errors[0].credits_charged, 1);
    assert_eq!(report.credits_spent, 3);
    assert_eq!(report.queries_issued, 3);
    assert_eq!(report.status, CycleStatus::Partial);
    assert!(h.cache.last_searched("b2").is_none());
}

#[tokio::test]
async fn rate_limit_halts_the_cycle_and_blocks_the_next() {
    let mut config = one_per_query();
    config.scheduler.max_concurrent_queries = 1;
    let client = FakeSearchClient::new();
    client.fail_next(SearchError::RateLimited {
        retry_after: Some(Duration::from_secs(60)),
        observed_used: Some(50),
        credits_charged: 0,
    });
    let h = harness(config, client);
    let keywords = kws(&["a1", "b2", "c3"]);

    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(report.searched.is_empty());
    assert_eq!(report.errors[0].code, "RATE_LIMITED");
    assert_eq!(report.why_skipped("a1"), Some(SkipReason::SearchFailed));
    assert_eq!(
        report.skipped_for(SkipReason::BudgetExhausted),
        vec!["b2", "c3"]
    );
    assert_eq!(h.client.call_count(), 1);
    assert_eq!(
        h.quota.rate_limited_until(t0()),
        Some(t0() + TimeDelta::seconds(60))
    );
    assert_eq!(h.quota.current_usage(t0()).used, 50);
    assert_eq!(h.quota.open_reservations(), 0);

    let blocked = h
        .scheduler
        .run_cycle_at(&keywords, t0() + TimeDelta::seconds(30), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(blocked.queries_issued, 0);
    assert_eq!(blocked.skipped_for(SkipReason::BudgetExhausted).len(), 3);
    assert_eq!(h.client.call_count(), 1);
}

#[tokio::test]
async fn timeouts_are_reported() {
    let mut config = one_per_query();
    config.scheduler.query_timeout_secs = 1;
    let h = harness(config, FakeSearchClient::new().with_latency(Duration::from_secs(3)));

    let report = h
        .scheduler
        .run_cycle_at(&kws(&["slow"]), t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.errors[0].code, "SEARCH_TIMEOUT");
    assert_eq!(report.why_skipped("slow"), Some(SkipReason::SearchFailed));
    assert_eq!(h.quota.open_reservations(), 0);
}

// ── Exclusion and cancellation ───────────────────────────────────────────

#[tokio::test]
async fn second_cycle_is_rejected_while_one_runs() {
    let h = harness(
        ScoutConfig::default(),
        FakeSearchClient::new().with_latency(Duration::from_millis(200)),
    );
    let keywords = kws(&["alpha"]);
    let token = CancellationToken::new();

    let (first, second) = tokio::join!(
        h.scheduler.run_cycle_at(&keywords, t0(), &token),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            h.scheduler.run_cycle_at(&keywords, t0(), &token).await
        }
    );
    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(ScoutError::SchedulerError(SchedulerError::CycleInProgress))
    ));
    assert!(!h.scheduler.is_cycle_running());
}

#[tokio::test]
async fn cancelled_token_refuses_to_start() {
    let h = harness(ScoutConfig::default(), FakeSearchClient::new());
    let token = CancellationToken::new();
    token.cancel();
    let err = h
        .scheduler
        .run_cycle_at(&kws(&["alpha"]), t0(), &token)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CANCELLED");
    assert_eq!(h.client.call_count(), 0);
}

#[tokio::test]
async fn cancellation_mid_cycle_keeps_fetched_items_and_releases_the_rest() {
    let mut config = one_per_query();
    config.scheduler.max_concurrent_queries = 1;
    let h = harness(
        config,
        FakeSearchClient::new().with_latency(Duration::from_millis(100)),
    );
    let keywords = kws(&["a1", "b2", "c3"]);
    let token = CancellationToken::new();

    let (report, _) = tokio::join!(
        h.scheduler.run_cycle_at(&keywords, t0(), &token),
        async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            token.cancel();
        }
    );
    let report = report.unwrap();

    // a1 finished, b2 was cut off in flight, c3 never left the queue.
    assert_eq!(report.status, CycleStatus::Cancelled);
    assert_eq!(report.searched, kws(&["a1"]));
    assert_eq!(report.skipped_for(SkipReason::Cancelled), vec!["b2", "c3"]);
    assert_eq!(report.queries_issued, 2);
    assert_eq!(h.cache.len(), 2);
    assert_eq!(h.quota.open_reservations(), 0);
    assert_eq!(h.quota.current_usage(t0()).used, 2);
}

#[tokio::test]
async fn cancellation_does_not_wait_for_slow_calls() {
    let h = harness(
        one_per_query(),
        FakeSearchClient::new().with_latency(Duration::from_secs(10)),
    );
    let keywords = kws(&["a1", "b2"]);
    let token = CancellationToken::new();
    let started = std::time::Instant::now();

    let (report, _) = tokio::join!(
        h.scheduler.run_cycle_at(&keywords, t0(), &token),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        }
    );
    let report = report.unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.status, CycleStatus::Cancelled);
    assert!(report.searched.is_empty());
    assert_eq!(h.quota.open_reservations(), 0);
}

#[tokio::test]
async fn dropped_cycle_returns_its_reservations() {
    let h = harness(
        one_per_query(),
        FakeSearchClient::new().with_latency(Duration::from_millis(200)),
    );
    let before = h.quota.available(t0());
    let keywords = kws(&["a1", "b2", "c3"]);

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        h.scheduler
            .run_cycle_at(&keywords, t0(), &CancellationToken::new()),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(h.quota.open_reservations(), 0);
    assert_eq!(h.quota.available(t0()), before);
    assert!(!h.scheduler.is_cycle_running());
}

// ── Inputs ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn keywords_are_normalized_and_deduplicated() {
    let h = harness(ScoutConfig::default(), FakeSearchClient::new());
    let report = h
        .scheduler
        .run_cycle_at(
            &kws(&["Federalism", " federalism ", "   "]),
            t0(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(report.searched, kws(&["federalism"]));
    assert_eq!(report.why_skipped("   "), Some(SkipReason::Rejected));
}

#[tokio::test]
async fn empty_keyword_list_produces_an_empty_report() {
    let h = harness(ScoutConfig::default(), FakeSearchClient::new());
    let report = h
        .scheduler
        .run_cycle_at(&[], t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.status, CycleStatus::Complete);
    assert!(report.searched.is_empty());
    assert_eq!(report.queries_issued, 0);
}

#[tokio::test]
async fn report_carries_usage_after_the_cycle() {
    let h = harness(ScoutConfig::default(), FakeSearchClient::new());
    let report = h
        .scheduler
        .run_cycle_at(&kws(&["alpha"]), t0(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.usage.used, 1);
    assert_eq!(report.budget_remaining(), 9_999);
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn keywords_past_the_cycle_limit_are_reported() {
    let h = harness(ScoutConfig::default(), FakeSearchClient::new());
    let mut keywords = keyword_corpus(MAX_KEYWORDS_PER_CYCLE + 1);
    let last = keywords[MAX_KEYWORDS_PER_CYCLE].clone();
    keywords.push(last.to_uppercase());

    let report = h
        .scheduler
        .run_cycle_at(&keywords, t0(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.why_skipped(&last), Some(SkipReason::OverCycleLimit));
    assert_eq!(report.skipped_for(SkipReason::OverCycleLimit), vec![last.as_str()]);
    assert_ne!(report.why_skipped(&keywords[0]), Some(SkipReason::OverCycleLimit));
}

/// Accepts nothing: every ledger write fails.
struct ReadOnlyLedger;

impl ILedgerStore for ReadOnlyLedger {
    fn save_ledger(&self, _ledger: &QuotaLedger) -> ScoutResult<()> {
        Err(StorageError::SqliteError {
            message: "attempt to write a readonly database".to_string(),
        }
        .into())
    }

    fn load_ledger(&self, _at: DateTime<Utc>) -> ScoutResult<Option<QuotaLedger>> {
        Ok(None)
    }

    fn add_daily_usage(&self, _day: NaiveDate, _credits: u64) -> ScoutResult<()> {
        Ok(())
    }

    fn load_daily_usage(&self, _since: NaiveDate) -> ScoutResult<Vec<(NaiveDate, u64)>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn unpersisted_ledger_still_counts_credits() {
    let config = one_per_query();
    let quota = Arc::new(
        QuotaManager::with_store(config.quota.clone(), Arc::new(ReadOnlyLedger), t0()).unwrap(),
    );
    let scheduler = Scheduler::new(
        &config,
        Arc::new(WeightLearner::new(config.learning.clone())),
        Arc::new(TweetCache::new(&config.cache)),
        Arc::clone(&quota),
        Arc::new(FakeSearchClient::new()),
    );

    let report = scheduler
        .run_cycle_at(&kws(&["federalism"]), t0(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.searched, kws(&["federalism"]));
    assert_eq!(report.credits_spent, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, STORAGE_ERROR);
    assert_eq!(report.errors[0].keywords, kws(&["federalism"]));
    assert_eq!(quota.current_usage(t0()).used, 1);
}
