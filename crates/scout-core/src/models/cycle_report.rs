use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{KeywordTier, QuotaUsage};

/// Why a keyword was not searched in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Searched within the reuse TTL.
    CoveredRecently,
    /// Cycle or period budget ran out before its query could be issued.
    BudgetExhausted,
    /// Low-tier exploration slots were already taken.
    LowTierCap,
    /// Keyword cannot fit in any query.
    Rejected,
    /// The query carrying it failed at the search API.
    SearchFailed,
    /// The cycle was cancelled before its query returned.
    Cancelled,
    /// Past the per-cycle keyword limit.
    OverCycleLimit,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoveredRecently => "covered-recently",
            Self::BudgetExhausted => "budget-exhausted",
            Self::LowTierCap => "low-tier-cap",
            Self::Rejected => "rejected",
            Self::SearchFailed => "search-failed",
            Self::Cancelled => "cancelled",
            Self::OverCycleLimit => "over-cycle-limit",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedKeyword {
    pub keyword: String,
    pub tier: KeywordTier,
    pub weight: f64,
    pub reason: SkipReason,
}

/// A failed search call recorded in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleError {
    pub code: String,
    pub message: String,
    pub keywords: Vec<String>,
    pub credits_charged: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Every selected keyword was searched.
    Complete,
    /// Budget or API failures left some selected keywords unsearched.
    Partial,
    /// Aborted through the cancellation token.
    Cancelled,
}

/// Structured record of one scheduler cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: CycleStatus,
    pub searched: Vec<String>,
    pub skipped: Vec<SkippedKeyword>,
    /// Items returned by the API this cycle, duplicates included.
    pub items_found: usize,
    /// Items the cache had never seen before.
    pub new_items: usize,
    pub queries_issued: usize,
    pub credits_spent: u64,
    pub errors: Vec<CycleError>,
    /// Quota snapshot after the cycle.
    pub usage: QuotaUsage,
}

impl CycleReport {
    /// Why `keyword` was not searched, if it was skipped.
    pub fn why_skipped(&self, keyword: &str) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.keyword == keyword)
            .map(|s| s.reason)
    }

    pub fn was_searched(&self, keyword: &str) -> bool {
        self.searched.iter().any(|k| k == keyword)
    }

    /// Keywords skipped for a given reason.
    pub fn skipped_for(&self, reason: SkipReason) -> Vec<&str> {
        self.skipped
            .iter()
            .filter(|s| s.reason == reason)
            .map(|s| s.keyword.as_str())
            .collect()
    }

    /// Credits left in the current period after this cycle.
    pub fn budget_remaining(&self) -> u64 {
        self.usage.remaining
    }
}
