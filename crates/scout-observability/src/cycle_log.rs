//! Bounded log of recent cycle summaries, for answering "why was this
//! keyword not searched lately" without replaying raw logs.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scout_core::models::{CycleReport, CycleStatus, SkipReason, SkippedKeyword};

/// Compact form of a `CycleReport`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub status: CycleStatus,
    pub searched: Vec<String>,
    pub skipped: Vec<SkippedKeyword>,
    pub credits_spent: u64,
    pub budget_remaining: u64,
    pub error_count: usize,
}

impl From<&CycleReport> for CycleSummary {
    fn from(report: &CycleReport) -> Self {
        Self {
            cycle_id: report.cycle_id,
            finished_at: report.finished_at,
            status: report.status,
            searched: report.searched.clone(),
            skipped: report.skipped.clone(),
            credits_spent: report.credits_spent,
            budget_remaining: report.budget_remaining(),
            error_count: report.errors.len(),
        }
    }
}

/// Ring buffer of cycle summaries, oldest evicted first.
#[derive(Debug, Clone)]
pub struct CycleLog {
    entries: VecDeque<CycleSummary>,
    max_entries: usize,
}

impl Default for CycleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleLog {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create with a custom capacity (at least one entry).
    pub fn with_capacity(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    pub fn record(&mut self, report: &CycleReport) {
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(CycleSummary::from(report));
    }

    /// Up to `n` summaries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&CycleSummary> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn latest(&self) -> Option<&CycleSummary> {
        self.entries.back()
    }

    /// The most recent cycle that considered `keyword`, with the reason it
    /// was skipped there, or `None` as the reason if it was searched.
    pub fn last_decision(&self, keyword: &str) -> Option<(Uuid, Option<SkipReason>)> {
        self.entries.iter().rev().find_map(|entry| {
            if entry.searched.iter().any(|k| k == keyword) {
                return Some((entry.cycle_id, None));
            }
            entry
                .skipped
                .iter()
                .find(|s| s.keyword == keyword)
                .map(|s| (entry.cycle_id, Some(s.reason)))
        })
    }

    /// Credits spent across every retained cycle.
    pub fn credits_spent(&self) -> u64 {
        self.entries.iter().map(|e| e.credits_spent).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
