use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Scheduler / prioritizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Credits one cycle may spend at most.
    pub cycle_credit_budget: u64,
    /// Estimated credit cost of one issued query.
    pub credits_per_query: u64,
    /// Fraction of the cycle budget medium-tier keywords may not touch.
    pub high_tier_reserve: f64,
    /// Low-tier keywords explored per cycle at most.
    pub low_tier_cap: usize,
    /// `max_results` passed to the search client.
    pub max_results_per_query: u32,
    /// Queries in flight at once.
    pub max_concurrent_queries: usize,
    /// Per-query timeout in seconds.
    pub query_timeout_secs: u64,
    /// Interval of the timer trigger in seconds.
    pub cycle_interval_secs: u64,
    /// Run the learner's decay pass at the start of every cycle.
    pub decay_each_cycle: bool,
}

impl SchedulerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cycle_credit_budget: defaults::DEFAULT_CYCLE_CREDIT_BUDGET,
            credits_per_query: defaults::DEFAULT_CREDITS_PER_QUERY,
            high_tier_reserve: defaults::DEFAULT_HIGH_TIER_RESERVE,
            low_tier_cap: defaults::DEFAULT_LOW_TIER_CAP,
            max_results_per_query: defaults::DEFAULT_MAX_RESULTS_PER_QUERY,
            max_concurrent_queries: defaults::DEFAULT_MAX_CONCURRENT_QUERIES,
            query_timeout_secs: defaults::DEFAULT_QUERY_TIMEOUT_SECS,
            cycle_interval_secs: defaults::DEFAULT_CYCLE_INTERVAL_SECS,
            decay_each_cycle: defaults::DEFAULT_DECAY_EACH_CYCLE,
        }
    }
}
