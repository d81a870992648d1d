use serde::{Deserialize, Serialize};

use super::defaults;

/// Quota manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Credits allowed per accounting period.
    pub period_credits: u64,
    /// Day of month (1-28) on which a new period starts.
    pub reset_day: u32,
    /// Length of the rolling rate-limit window in seconds.
    pub rate_window_secs: u64,
    /// Calls allowed inside one rolling window.
    pub rate_window_max_calls: u32,
    /// Trailing days averaged for the exhaustion projection.
    pub projection_window_days: u32,
    /// Usage percentage at which warnings are emitted.
    pub warning_percent: f64,
}

impl QuotaConfig {
    pub fn rate_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.rate_window_secs as i64)
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            period_credits: defaults::DEFAULT_PERIOD_CREDITS,
            reset_day: defaults::DEFAULT_RESET_DAY,
            rate_window_secs: defaults::DEFAULT_RATE_WINDOW_SECS,
            rate_window_max_calls: defaults::DEFAULT_RATE_WINDOW_MAX_CALLS,
            projection_window_days: defaults::DEFAULT_PROJECTION_WINDOW_DAYS,
            warning_percent: defaults::DEFAULT_WARNING_PERCENT,
        }
    }
}
