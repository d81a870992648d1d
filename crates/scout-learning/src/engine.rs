//! WeightLearner: keyed weight table owned by the learner, shared by handle.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use scout_core::config::LearningConfig;
use scout_core::errors::ScoutResult;
use scout_core::models::{
    normalize_keyword, FeedbackEvent, KeywordRecord, KeywordTier, Outcome, Weight,
};
use scout_core::traits::{IFeedbackLog, IKeywordStore};

use crate::{decay, update};

/// One weight movement caused by feedback or decay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightChange {
    pub keyword: String,
    pub before: Weight,
    pub after: Weight,
}

impl WeightChange {
    pub fn crossed_tier(&self) -> bool {
        self.before.tier() != self.after.tier()
    }
}

/// Result of consuming a feedback event.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    Applied(Vec<WeightChange>),
    /// The event id was already consumed; nothing changed.
    Duplicate,
}

impl FeedbackOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }

    pub fn changes(&self) -> &[WeightChange] {
        match self {
            Self::Applied(changes) => changes,
            Self::Duplicate => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecayStats {
    pub examined: usize,
    pub decayed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Per-keyword effectiveness weights.
///
/// Each keyword's read-modify-write happens under its own map entry lock, so
/// concurrent feedback for different keywords never contends and feedback for
/// the same keyword is serialized. No ordering across keywords is provided.
pub struct WeightLearner {
    config: LearningConfig,
    weights: DashMap<String, KeywordRecord>,
    /// Feedback event ids already consumed by this process.
    processed: DashSet<Uuid>,
    keyword_store: Option<Arc<dyn IKeywordStore>>,
    feedback_log: Option<Arc<dyn IFeedbackLog>>,
}

impl WeightLearner {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            weights: DashMap::new(),
            processed: DashSet::new(),
            keyword_store: None,
            feedback_log: None,
        }
    }

    /// Create a learner that persists weights and consumed feedback ids.
    pub fn with_storage(
        config: LearningConfig,
        keyword_store: Arc<dyn IKeywordStore>,
        feedback_log: Arc<dyn IFeedbackLog>,
    ) -> Self {
        let mut learner = Self::new(config);
        learner.keyword_store = Some(keyword_store);
        learner.feedback_log = Some(feedback_log);
        learner
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Load persisted weights. Returns the number of keywords loaded.
    pub fn load(&self) -> ScoutResult<usize> {
        let Some(store) = &self.keyword_store else {
            return Ok(0);
        };
        let loaded = store.load_keywords()?;
        let count = loaded.records.len();
        for record in loaded.records {
            self.weights.insert(normalize_keyword(&record.keyword), record);
        }
        info!(keywords = count, corrupt_skipped = loaded.skipped, "keyword weights loaded");
        Ok(count)
    }

    /// Current weight; the exploration weight for keywords never seen.
    pub fn weight_of(&self, keyword: &str) -> Weight {
        self.weights
            .get(&normalize_keyword(keyword))
            .map(|r| r.weight)
            .unwrap_or_else(|| self.exploration_weight())
    }

    pub fn tier_of(&self, keyword: &str) -> KeywordTier {
        self.weight_of(keyword).tier()
    }

    pub fn record(&self, keyword: &str) -> Option<KeywordRecord> {
        self.weights.get(&normalize_keyword(keyword)).map(|r| r.clone())
    }

    /// The stored record, or a fresh exploration record if the keyword is new.
    /// Does not insert.
    pub fn record_or_default(&self, keyword: &str, now: DateTime<Utc>) -> KeywordRecord {
        let key = normalize_keyword(keyword);
        self.weights
            .get(&key)
            .map(|r| r.clone())
            .unwrap_or_else(|| KeywordRecord::with_weight(key, self.exploration_weight(), now))
    }

    /// Apply one judgement to every keyword in `keywords`.
    pub fn on_feedback(
        &self,
        keywords: &[String],
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> ScoutResult<Vec<WeightChange>> {
        let mut changes = Vec::with_capacity(keywords.len());
        let mut touched = Vec::with_capacity(keywords.len());
        let mut previous = Vec::with_capacity(keywords.len());

        let mut seen = HashSet::new();
        for keyword in keywords {
            let key = normalize_keyword(keyword);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            let (prior, updated) = match self.weights.entry(key.clone()) {
                Entry::Occupied(mut slot) => {
                    let prior = slot.get().clone();
                    let record = slot.get_mut();
                    self.step(record, outcome, now);
                    (Some(prior), record.clone())
                }
                Entry::Vacant(slot) => {
                    let mut record =
                        KeywordRecord::with_weight(key.clone(), self.exploration_weight(), now);
                    self.step(&mut record, outcome, now);
                    slot.insert(record.clone());
                    (None, record)
                }
            };
            changes.push(WeightChange {
                keyword: key.clone(),
                before: prior
                    .as_ref()
                    .map(|r| r.weight)
                    .unwrap_or_else(|| self.exploration_weight()),
                after: updated.weight,
            });
            previous.push((key, prior));
            touched.push(updated);
        }

        if let Some(store) = &self.keyword_store {
            if let Err(e) = store.upsert_keywords(&touched) {
                self.roll_back(&touched, previous);
                warn!(error = %e, "feedback not persisted; weights restored");
                return Err(e);
            }
        }
        for change in &changes {
            debug!(
                keyword = %change.keyword,
                outcome = %outcome,
                before = change.before.value(),
                after = change.after.value(),
                "weight updated"
            );
        }
        Ok(changes)
    }

    fn step(&self, record: &mut KeywordRecord, outcome: Outcome, now: DateTime<Utc>) {
        record.weight = update::apply(record.weight, outcome, self.config.learning_rate);
        record.last_weight_update_at = now;
        record.feedback_count += 1;
    }

    /// Undo in-memory updates whose write failed. An entry that moved on since
    /// is left alone.
    fn roll_back(&self, updated: &[KeywordRecord], previous: Vec<(String, Option<KeywordRecord>)>) {
        for (updated, (key, prior)) in updated.iter().zip(previous) {
            match prior {
                Some(prior) => {
                    if let Some(mut current) = self.weights.get_mut(&key) {
                        if *current == *updated {
                            *current = prior;
                        }
                    }
                }
                None => {
                    self.weights.remove_if(&key, |_, current| current == updated);
                }
            }
        }
    }

    /// Consume a feedback event exactly once, across restarts when a
    /// feedback log is attached.
    pub fn apply_event(&self, event: &FeedbackEvent, now: DateTime<Utc>) -> ScoutResult<FeedbackOutcome> {
        if !self.processed.insert(event.id) {
            return Ok(FeedbackOutcome::Duplicate);
        }
        if let Some(log) = &self.feedback_log {
            if log.is_recorded(&event.id)? {
                return Ok(FeedbackOutcome::Duplicate);
            }
        }

        let changes = match self.on_feedback(&event.keywords, event.outcome, now) {
            Ok(changes) => changes,
            Err(e) => {
                // Let a retry of the same event through.
                self.processed.remove(&event.id);
                return Err(e);
            }
        };
        if let Some(log) = &self.feedback_log {
            log.record_feedback(event, now)?;
        }
        Ok(FeedbackOutcome::Applied(changes))
    }

    /// Pull every stale keyword one step toward the baseline.
    ///
    /// A decay step counts as a weight update, so a keyword decays at most
    /// once per decay window however often this runs.
    pub fn decay_all(&self, now: DateTime<Utc>) -> ScoutResult<DecayStats> {
        let window = self.config.decay_window();
        let mut stats = DecayStats::default();
        let mut touched = Vec::new();

        for mut entry in self.weights.iter_mut() {
            stats.examined += 1;
            if !decay::is_stale(entry.last_weight_update_at, window, now) {
                continue;
            }
            let before = entry.weight;
            let after = decay::step_toward(before, self.config.decay_baseline, self.config.decay_step);
            entry.last_weight_update_at = now;
            if after != before {
                entry.weight = after;
                stats.decayed += 1;
            }
            touched.push(entry.clone());
        }

        if let Some(store) = &self.keyword_store {
            if !touched.is_empty() {
                store.upsert_keywords(&touched)?;
            }
        }
        if stats.decayed > 0 {
            info!(examined = stats.examined, decayed = stats.decayed, "stale keyword weights decayed");
        }
        Ok(stats)
    }

    /// Stamp `last_used_at` for searched keywords, creating records for
    /// keywords seen for the first time.
    pub fn mark_used(&self, keywords: &[String], now: DateTime<Utc>) -> ScoutResult<()> {
        let mut touched = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let key = normalize_keyword(keyword);
            if key.is_empty() {
                continue;
            }
            let mut entry = self
                .weights
                .entry(key.clone())
                .or_insert_with(|| KeywordRecord::with_weight(key, self.exploration_weight(), now));
            entry.last_used_at = Some(now);
            touched.push(entry.clone());
        }
        if let Some(store) = &self.keyword_store {
            store.upsert_keywords(&touched)?;
        }
        Ok(())
    }

    /// All known keywords, highest weight first.
    pub fn snapshot(&self) -> Vec<KeywordRecord> {
        let mut records: Vec<KeywordRecord> = self.weights.iter().map(|r| r.clone()).collect();
        records.sort_by(|a, b| {
            b.weight
                .value()
                .total_cmp(&a.weight.value())
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        records
    }

    pub fn tier_counts(&self) -> TierCounts {
        let mut counts = TierCounts::default();
        for record in self.weights.iter() {
            match record.tier() {
                KeywordTier::High => counts.high += 1,
                KeywordTier::Medium => counts.medium += 1,
                KeywordTier::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn exploration_weight(&self) -> Weight {
        Weight::new(self.config.exploration_weight)
    }
}
