//! ScoutRuntime: storage plus every engine, wired and hydrated.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use scout_cache::{SweepStats, TweetCache};
use scout_core::config::ScoutConfig;
use scout_core::errors::{SchedulerError, ScoutError, ScoutResult};
use scout_core::models::{CycleReport, FeedbackEvent, QuotaUsage, SkipReason};
use scout_core::traits::{CancellationToken, ISearchClient};
use scout_learning::{FeedbackOutcome, WeightLearner};
use scout_observability::{events, CycleLog, CycleSummary};
use scout_quota::QuotaManager;
use scout_storage::StorageEngine;

use crate::engine::Scheduler;

pub struct ScoutRuntime {
    config: ScoutConfig,
    storage: Arc<StorageEngine>,
    learner: Arc<WeightLearner>,
    cache: Arc<TweetCache>,
    quota: Arc<QuotaManager>,
    scheduler: Scheduler,
    cycle_log: Mutex<CycleLog>,
}

impl ScoutRuntime {
    /// Open storage and hydrate every engine from it.
    pub fn open(config: ScoutConfig, client: Arc<dyn ISearchClient>) -> ScoutResult<Self> {
        Self::open_at(config, client, Utc::now())
    }

    pub fn open_at(
        config: ScoutConfig,
        client: Arc<dyn ISearchClient>,
        now: DateTime<Utc>,
    ) -> ScoutResult<Self> {
        config.validate()?;
        let storage = Arc::new(StorageEngine::from_config(&config.storage)?);

        let learner = Arc::new(WeightLearner::with_storage(
            config.learning.clone(),
            storage.clone(),
            storage.clone(),
        ));
        learner.load()?;

        let cache = Arc::new(TweetCache::with_store(&config.cache, storage.clone()));
        let hydrated = cache.hydrate()?;
        if hydrated.corrupt_skipped > 0 {
            events::corrupt_record_skipped("cached_items", hydrated.corrupt_skipped);
        }

        let quota = Arc::new(QuotaManager::with_store(
            config.quota.clone(),
            storage.clone(),
            now,
        )?);

        let scheduler = Scheduler::new(
            &config,
            Arc::clone(&learner),
            Arc::clone(&cache),
            Arc::clone(&quota),
            client,
        );

        info!(
            keywords = learner.len(),
            items = hydrated.items,
            used = quota.ledger(now).used,
            "scout runtime ready"
        );

        Ok(Self {
            config,
            storage,
            learner,
            cache,
            quota,
            scheduler,
            cycle_log: Mutex::new(CycleLog::new()),
        })
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    pub fn learner(&self) -> &Arc<WeightLearner> {
        &self.learner
    }

    pub fn cache(&self) -> &Arc<TweetCache> {
        &self.cache
    }

    pub fn quota(&self) -> &Arc<QuotaManager> {
        &self.quota
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Manual trigger.
    pub async fn run_cycle(&self, keywords: &[String]) -> ScoutResult<CycleReport> {
        self.run_cycle_at(keywords, Utc::now(), &CancellationToken::new())
            .await
    }

    pub async fn run_cycle_at(
        &self,
        keywords: &[String],
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ScoutResult<CycleReport> {
        let report = self.scheduler.run_cycle_at(keywords, now, cancel).await?;
        self.log().record(&report);
        Ok(report)
    }

    /// Inbound hook for moderation verdicts. Replays are no-ops.
    pub fn on_feedback(&self, event: &FeedbackEvent) -> ScoutResult<FeedbackOutcome> {
        self.on_feedback_at(event, Utc::now())
    }

    pub fn on_feedback_at(
        &self,
        event: &FeedbackEvent,
        now: DateTime<Utc>,
    ) -> ScoutResult<FeedbackOutcome> {
        let span = scout_observability::learning_span!(event.id, event.outcome);
        let _entered = span.enter();
        let outcome = self.learner.apply_event(event, now)?;
        if let FeedbackOutcome::Applied(changes) = &outcome {
            let tier_changes = changes.iter().filter(|c| c.crossed_tier()).count();
            events::feedback_applied(
                &event.id.to_string(),
                event.outcome,
                changes.len(),
                tier_changes,
            );
        }
        Ok(outcome)
    }

    /// Purge cached items past retention.
    pub fn sweep(&self, now: DateTime<Utc>) -> ScoutResult<SweepStats> {
        let span = scout_observability::sweep_span!(self.cache.len());
        let _entered = span.enter();
        let stats = self.cache.sweep(now)?;
        events::cache_swept(stats.purged, stats.remaining, stats.search_log_pruned);
        Ok(stats)
    }

    pub fn usage(&self, now: DateTime<Utc>) -> QuotaUsage {
        self.quota.current_usage(now)
    }

    /// Summaries of recent cycles, newest first.
    pub fn recent_cycles(&self, n: usize) -> Vec<CycleSummary> {
        self.log().recent(n).into_iter().cloned().collect()
    }

    /// The latest cycle that considered `keyword` and why it was skipped
    /// there (`None` when it was searched).
    pub fn last_decision(&self, keyword: &str) -> Option<(Uuid, Option<SkipReason>)> {
        self.log().last_decision(keyword)
    }

    /// Timer trigger: run a cycle and a sweep every `interval` until
    /// `shutdown` is cancelled. The first tick fires immediately. Failed
    /// cycles are logged and retried on the next tick. Returns the number
    /// of cycles that produced a report.
    pub async fn run_periodic(
        &self,
        keywords: &[String],
        interval: Duration,
        shutdown: &CancellationToken,
    ) -> usize {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut completed = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let now = Utc::now();
            match self.run_cycle_at(keywords, now, shutdown).await {
                Ok(_) => completed += 1,
                Err(ScoutError::SchedulerError(SchedulerError::Cancelled)) => break,
                Err(e) => warn!(error = %e, "scheduled cycle failed"),
            }
            if let Err(e) = self.sweep(now) {
                warn!(error = %e, "scheduled sweep failed");
            }
        }

        info!(cycles = completed, "periodic trigger stopped");
        completed
    }

    fn log(&self) -> MutexGuard<'_, CycleLog> {
        self.cycle_log.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ScoutRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoutRuntime")
            .field("keywords", &self.learner.len())
            .field("items", &self.cache.len())
            .finish()
    }
}
