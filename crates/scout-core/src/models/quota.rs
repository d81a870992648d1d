use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Credit accounting for one billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaLedger {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_allowed: u64,
    pub used: u64,
    /// Credits used per source label.
    pub source_breakdown: BTreeMap<String, u64>,
}

impl QuotaLedger {
    pub fn new(period_start: DateTime<Utc>, period_end: DateTime<Utc>, total_allowed: u64) -> Self {
        Self {
            period_start,
            period_end,
            total_allowed,
            used: 0,
            source_breakdown: BTreeMap::new(),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.total_allowed.saturating_sub(self.used)
    }

    /// Whether `at` falls inside [period_start, period_end).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.period_start && at < self.period_end
    }

    pub fn percent_used(&self) -> f64 {
        if self.total_allowed == 0 {
            return 100.0;
        }
        (self.used as f64 / self.total_allowed as f64) * 100.0
    }
}

/// Snapshot of quota consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    pub used: u64,
    /// Credits held by open reservations.
    pub reserved: u64,
    pub total: u64,
    pub remaining: u64,
    pub percent: f64,
    pub period_end: DateTime<Utc>,
    /// Advisory: when the budget runs out at the trailing daily average.
    pub projected_exhaustion_date: Option<NaiveDate>,
}
