//! Scheduler: one search cycle from keyword list to `CycleReport`.
//!
//! A cycle moves through selecting, querying, ingesting and reporting and
//! always terminates. Only one cycle runs at a time; a second caller gets
//! `SchedulerError::CycleInProgress` instead of waiting.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use scout_cache::TweetCache;
use scout_core::config::{SchedulerConfig, ScoutConfig};
use scout_core::constants::{MAX_KEYWORDS_PER_CYCLE, SOURCE_SEARCH};
use scout_core::errors::error_code::STORAGE_ERROR;
use scout_core::errors::{SchedulerError, ScoutError, ScoutErrorCode, ScoutResult, SearchError};
use scout_core::models::{
    normalize_keyword, CycleError, CycleReport, CycleStatus, SearchFilters, SearchItem,
    SearchQuery, SkipReason, SkippedKeyword, Weight,
};
use scout_core::traits::{CancellationToken, ISearchClient};
use scout_learning::WeightLearner;
use scout_observability::events;
use scout_query::QueryBuilder;
use scout_quota::{QuotaManager, ReservationToken};

use crate::attribution;
use crate::execution::{self, ExecutionSettings, QueryOutcome};
use crate::selection::{self, Candidate, Selection, SelectionLimits};

pub struct Scheduler {
    config: SchedulerConfig,
    filters: SearchFilters,
    builder: QueryBuilder,
    learner: Arc<WeightLearner>,
    cache: Arc<TweetCache>,
    quota: Arc<QuotaManager>,
    client: Arc<dyn ISearchClient>,
    cycle_lock: Mutex<()>,
}

impl Scheduler {
    pub fn new(
        config: &ScoutConfig,
        learner: Arc<WeightLearner>,
        cache: Arc<TweetCache>,
        quota: Arc<QuotaManager>,
        client: Arc<dyn ISearchClient>,
    ) -> Self {
        Self {
            config: config.scheduler.clone(),
            filters: config.query.filters.clone(),
            builder: QueryBuilder::from_config(&config.query),
            learner,
            cache,
            quota,
            client,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn is_cycle_running(&self) -> bool {
        self.cycle_lock.try_lock().is_err()
    }

    /// Run one cycle now.
    pub async fn run_cycle(&self, keywords: &[String]) -> ScoutResult<CycleReport> {
        self.run_cycle_at(keywords, Utc::now(), &CancellationToken::new())
            .await
    }

    /// Run one cycle at the logical time `now`.
    ///
    /// Filter errors fail before any credit is reserved. Budget and API
    /// failures do not fail the cycle; they show up in the report.
    pub async fn run_cycle_at(
        &self,
        keywords: &[String],
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ScoutResult<CycleReport> {
        let _guard = self
            .cycle_lock
            .try_lock()
            .map_err(|_| SchedulerError::CycleInProgress)?;
        if cancel.is_cancelled() {
            return Err(SchedulerError::Cancelled.into());
        }

        let cycle_id = Uuid::new_v4();
        let span = scout_observability::cycle_span!(cycle_id, keywords.len());
        self.cycle(cycle_id, keywords, now, cancel)
            .instrument(span)
            .await
    }

    async fn cycle(
        &self,
        cycle_id: Uuid,
        keywords: &[String],
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ScoutResult<CycleReport> {
        let clock = Instant::now();
        let start_percent = self.quota.current_usage(now).percent;

        if self.config.decay_each_cycle {
            self.learner.decay_all(now)?;
        }

        // Selecting.
        let (candidates, rejected_early) = self.candidates(keywords, now);
        let budget = self
            .config
            .cycle_credit_budget
            .min(self.quota.available(now));
        let limits = SelectionLimits {
            budget,
            credits_per_query: self.config.credits_per_query,
            max_or_terms: self.builder.max_or_terms(),
            high_tier_reserve: self.config.high_tier_reserve,
            low_tier_cap: self.config.low_tier_cap,
        };
        let selection = selection::select(candidates, &limits);
        debug!(
            budget,
            selected = selection.selected.len(),
            skipped = selection.skipped.len(),
            "keywords selected"
        );

        let mut report = CycleReport {
            cycle_id,
            started_at: now,
            finished_at: now,
            status: CycleStatus::Complete,
            searched: Vec::new(),
            skipped: rejected_early,
            items_found: 0,
            new_items: 0,
            queries_issued: 0,
            credits_spent: 0,
            errors: Vec::new(),
            usage: self.quota.current_usage(now),
        };
        report.skipped.extend(selection.skipped.iter().cloned());

        if selection.selected.is_empty() {
            return Ok(self.finish(report, &selection, start_percent, clock, now));
        }

        // Querying.
        let plan = self
            .builder
            .plan(&selection.keywords(), &self.filters, now)?;
        let index: HashMap<&str, &Candidate> = selection
            .selected
            .iter()
            .map(|c| (c.keyword.as_str(), c))
            .collect();
        for (keyword, error) in &plan.rejected {
            debug!(keyword = %keyword, error = %error, "keyword rejected by query builder");
            report
                .skipped
                .push(self.skip_entry(&index, keyword, SkipReason::Rejected, now));
        }

        let estimate = self.config.credits_per_query;
        let mut queries = plan.queries;
        let mut tokens: Vec<ReservationToken> = Vec::with_capacity(queries.len());
        let mut reserved = 0u64;
        for _ in &queries {
            if cancel.is_cancelled()
                || reserved + estimate > budget
                || !self.quota.can_spend(estimate, now)
            {
                break;
            }
            match self.quota.reserve(estimate, SOURCE_SEARCH, now) {
                Ok(token) => {
                    reserved += estimate;
                    tokens.push(token);
                }
                Err(e) => {
                    debug!(error = %e, "reservation refused; no further queries this cycle");
                    break;
                }
            }
        }
        let unreserved = queries.split_off(tokens.len());
        let reason = unissued_reason(cancel);
        for query in &unreserved {
            for keyword in &query.keywords {
                report
                    .skipped
                    .push(self.skip_entry(&index, keyword, reason, now));
            }
        }

        let settings = ExecutionSettings {
            max_concurrent: self.config.max_concurrent_queries,
            timeout: self.config.query_timeout(),
            max_results: self.config.max_results_per_query,
        };
        let outcomes = execution::execute(
            Arc::clone(&self.client),
            queries.clone(),
            settings,
            cancel.clone(),
        )
        .await;

        // Ingesting.
        for ((query, token), outcome) in queries.iter().zip(tokens).zip(outcomes) {
            match outcome {
                QueryOutcome::Completed(response) => {
                    report.queries_issued += 1;
                    self.settle(token, response.credits_used, query, now, &mut report);
                    self.ingest(query, response.items, now, &mut report);
                }
                QueryOutcome::Failed(error) => {
                    report.queries_issued += 1;
                    self.settle(token, error.credits_charged(), query, now, &mut report);
                    self.record_failure(&error, query, now, &mut report);
                    for keyword in &query.keywords {
                        report.skipped.push(self.skip_entry(
                            &index,
                            keyword,
                            SkipReason::SearchFailed,
                            now,
                        ));
                    }
                }
                QueryOutcome::Abandoned => {
                    // The request went out, so whatever it reserved is spent.
                    report.queries_issued += 1;
                    let charged = token.credits();
                    self.settle(token, charged, query, now, &mut report);
                    for keyword in &query.keywords {
                        report.skipped.push(self.skip_entry(
                            &index,
                            keyword,
                            SkipReason::Cancelled,
                            now,
                        ));
                    }
                }
                QueryOutcome::NotIssued => {
                    if let Err(e) = self.quota.release(token) {
                        warn!(error = %e, "could not release reservation");
                    }
                    let reason = unissued_reason(cancel);
                    for keyword in &query.keywords {
                        report
                            .skipped
                            .push(self.skip_entry(&index, keyword, reason, now));
                    }
                }
            }
        }

        // Reporting.
        Ok(self.finish(report, &selection, start_percent, clock, now))
    }

    /// Normalized, deduplicated candidates plus keywords that normalize to
    /// nothing or arrive after the per-cycle limit is reached.
    fn candidates(
        &self,
        keywords: &[String],
        now: DateTime<Utc>,
    ) -> (Vec<Candidate>, Vec<SkippedKeyword>) {
        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(keywords.len().min(MAX_KEYWORDS_PER_CYCLE));
        let mut rejected = Vec::new();
        for raw in keywords {
            let keyword = normalize_keyword(raw);
            if keyword.is_empty() {
                let weight = Weight::new(self.learner.config().exploration_weight);
                rejected.push(SkippedKeyword {
                    keyword: raw.clone(),
                    tier: weight.tier(),
                    weight: weight.value(),
                    reason: SkipReason::Rejected,
                });
                continue;
            }
            if !seen.insert(keyword.clone()) {
                continue;
            }
            let record = self.learner.record_or_default(&keyword, now);
            if candidates.len() == MAX_KEYWORDS_PER_CYCLE {
                rejected.push(SkippedKeyword {
                    tier: record.weight.tier(),
                    weight: record.weight.value(),
                    keyword,
                    reason: SkipReason::OverCycleLimit,
                });
                continue;
            }
            candidates.push(Candidate {
                covered: self.cache.is_covered(&keyword, now),
                keyword,
                weight: record.weight,
                last_used_at: record.last_used_at,
            });
        }

        let over = rejected
            .iter()
            .filter(|s| s.reason == SkipReason::OverCycleLimit)
            .count();
        if over > 0 {
            warn!(
                over,
                limit = MAX_KEYWORDS_PER_CYCLE,
                "keywords past the cycle limit skipped"
            );
        }
        (candidates, rejected)
    }

    fn skip_entry(
        &self,
        index: &HashMap<&str, &Candidate>,
        keyword: &str,
        reason: SkipReason,
        now: DateTime<Utc>,
    ) -> SkippedKeyword {
        match index.get(keyword) {
            Some(candidate) => candidate.skipped(reason),
            None => {
                let weight = self.learner.record_or_default(keyword, now).weight;
                SkippedKeyword {
                    keyword: keyword.to_string(),
                    tier: weight.tier(),
                    weight: weight.value(),
                    reason,
                }
            }
        }
    }

    /// Commit the credits a call consumed.
    fn settle(
        &self,
        token: ReservationToken,
        actual: u64,
        query: &SearchQuery,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        match self.quota.commit(token, actual, now) {
            Ok(receipt) => {
                report.credits_spent += receipt.applied;
                if receipt.overage > 0 {
                    events::quota_overage(receipt.reserved, actual, receipt.applied);
                }
                if !receipt.persisted {
                    report.errors.push(CycleError {
                        code: STORAGE_ERROR.to_string(),
                        message: "quota ledger could not be persisted".to_string(),
                        keywords: query.keywords.clone(),
                        credits_charged: 0,
                    });
                }
            }
            Err(e) => {
                warn!(error = %e, "quota commit failed");
                report.errors.push(cycle_error(&e, &query.keywords, 0));
            }
        }
    }

    /// Deposit a query's items in the cache and stamp its keywords as
    /// searched. Storage failures are reported, not raised.
    fn ingest(
        &self,
        query: &SearchQuery,
        items: Vec<SearchItem>,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        let mut failure: Option<ScoutError> = None;
        report.items_found += items.len();

        for item in items {
            let keywords = attribution::attribute(&item.text, &query.keywords);
            match self.cache.ingest(item, &keywords, now) {
                Ok(outcome) if outcome.is_new() => report.new_items += 1,
                Ok(_) => {}
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        for keyword in &query.keywords {
            if let Err(e) = self.cache.record_search(keyword, now) {
                failure.get_or_insert(e);
            }
        }
        if let Err(e) = self.learner.mark_used(&query.keywords, now) {
            failure.get_or_insert(e);
        }

        report.searched.extend(query.keywords.iter().cloned());
        if let Some(e) = failure {
            warn!(error = %e, "persisting search results failed");
            report.errors.push(cycle_error(&e, &query.keywords, 0));
        }
    }

    fn record_failure(
        &self,
        error: &SearchError,
        query: &SearchQuery,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        if let SearchError::RateLimited {
            retry_after,
            observed_used,
            ..
        } = error
        {
            if let Err(e) = self.quota.record_rate_limited(now, *retry_after, *observed_used) {
                report.errors.push(cycle_error(&e, &query.keywords, 0));
            }
        }
        events::search_failed(
            error.error_code(),
            &error.to_string(),
            &query.keywords,
            error.credits_charged(),
        );
        report.errors.push(CycleError {
            code: error.error_code().to_string(),
            message: error.to_string(),
            keywords: query.keywords.clone(),
            credits_charged: error.credits_charged(),
        });
    }

    fn finish(
        &self,
        mut report: CycleReport,
        selection: &Selection,
        start_percent: f64,
        clock: Instant,
        now: DateTime<Utc>,
    ) -> CycleReport {
        let searched: HashSet<&str> = report.searched.iter().map(String::as_str).collect();
        let cancelled = report
            .skipped
            .iter()
            .any(|s| s.reason == SkipReason::Cancelled);
        let incomplete = !report.errors.is_empty()
            || selection
                .selected
                .iter()
                .any(|c| !searched.contains(c.keyword.as_str()));
        report.status = if cancelled {
            CycleStatus::Cancelled
        } else if incomplete {
            CycleStatus::Partial
        } else {
            CycleStatus::Complete
        };

        report.usage = self.quota.current_usage(now);
        report.finished_at =
            now + chrono::Duration::from_std(clock.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());

        for skipped in &report.skipped {
            events::keyword_skipped(&skipped.keyword, skipped.reason, skipped.weight);
        }
        let threshold = self.quota.config().warning_percent;
        if start_percent < threshold && report.usage.percent >= threshold {
            events::quota_warning(&report.usage, threshold);
        }
        events::cycle_completed(&report);
        info!(
            status = ?report.status,
            searched = report.searched.len(),
            credits = report.credits_spent,
            "cycle finished"
        );
        report
    }
}

fn unissued_reason(cancel: &CancellationToken) -> SkipReason {
    if cancel.is_cancelled() {
        SkipReason::Cancelled
    } else {
        SkipReason::BudgetExhausted
    }
}

fn cycle_error(error: &ScoutError, keywords: &[String], credits_charged: u64) -> CycleError {
    CycleError {
        code: error.error_code().to_string(),
        message: error.to_string(),
        keywords: keywords.to_vec(),
        credits_charged,
    }
}
