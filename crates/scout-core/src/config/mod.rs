//! Configuration for every Scout subsystem.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`SCOUT_*`)
//! 2. TOML file (`scout.toml` or an explicit path)
//! 3. Compiled defaults (`defaults.rs`)

pub mod cache_config;
pub mod defaults;
pub mod learning_config;
pub mod observability_config;
pub mod query_config;
pub mod quota_config;
pub mod scheduler_config;
pub mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::CacheConfig;
pub use learning_config::LearningConfig;
pub use observability_config::ObservabilityConfig;
pub use query_config::QueryConfig;
pub use quota_config::QuotaConfig;
pub use scheduler_config::SchedulerConfig;
pub use storage_config::StorageConfig;

use crate::errors::ConfigError;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "scout.toml";

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub query: QueryConfig,
    pub cache: CacheConfig,
    pub quota: QuotaConfig,
    pub learning: LearningConfig,
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl ScoutConfig {
    /// Load configuration: defaults, then the TOML file (if any), then `SCOUT_*`
    /// environment variables. The result is validated.
    ///
    /// An explicit `path` must exist. Without one, `scout.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(CONFIG_FILENAME);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing and embedding).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `SCOUT_*` overrides. `lookup` resolves a variable name to its value;
    /// unparsable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SCOUT_QUOTA_PERIOD_CREDITS").and_then(|v| v.parse().ok()) {
            self.quota.period_credits = v;
        }
        if let Some(v) = lookup("SCOUT_QUOTA_RATE_WINDOW_MAX_CALLS").and_then(|v| v.parse().ok()) {
            self.quota.rate_window_max_calls = v;
        }
        if let Some(v) = lookup("SCOUT_SCHEDULER_CYCLE_CREDIT_BUDGET").and_then(|v| v.parse().ok())
        {
            self.scheduler.cycle_credit_budget = v;
        }
        if let Some(v) = lookup("SCOUT_SCHEDULER_LOW_TIER_CAP").and_then(|v| v.parse().ok()) {
            self.scheduler.low_tier_cap = v;
        }
        if let Some(v) = lookup("SCOUT_LEARNING_RATE").and_then(|v| v.parse().ok()) {
            self.learning.learning_rate = v;
        }
        if let Some(v) = lookup("SCOUT_CACHE_REUSE_TTL_HOURS").and_then(|v| v.parse().ok()) {
            self.cache.reuse_ttl_hours = v;
        }
        if let Some(v) = lookup("SCOUT_STORAGE_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = lookup("SCOUT_LOG_LEVEL") {
            self.observability.log_level = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn fail(field: &str, message: &str) -> Result<(), ConfigError> {
            Err(ConfigError::ValidationFailed {
                field: field.to_string(),
                message: message.to_string(),
            })
        }

        if self.query.max_query_length == 0 {
            return fail("query.max_query_length", "must be greater than 0");
        }
        if self.query.max_or_terms == 0 {
            return fail("query.max_or_terms", "must be greater than 0");
        }
        if self.cache.retention_days * 24 < self.cache.reuse_ttl_hours {
            return fail("cache.retention_days", "must cover at least the reuse TTL");
        }
        if self.quota.period_credits == 0 {
            return fail("quota.period_credits", "must be greater than 0");
        }
        if !(1..=28).contains(&self.quota.reset_day) {
            return fail("quota.reset_day", "must be between 1 and 28");
        }
        if self.quota.rate_window_secs == 0 || self.quota.rate_window_max_calls == 0 {
            return fail("quota.rate_window", "window length and call ceiling must be positive");
        }
        if self.quota.projection_window_days == 0 {
            return fail("quota.projection_window_days", "must be greater than 0");
        }
        if !(0.0..=100.0).contains(&self.quota.warning_percent) {
            return fail("quota.warning_percent", "must be between 0 and 100");
        }
        if !(self.learning.learning_rate > 0.0 && self.learning.learning_rate <= 1.0) {
            return fail("learning.learning_rate", "must be in (0.0, 1.0]");
        }
        if !(0.05..=1.0).contains(&self.learning.exploration_weight) {
            return fail("learning.exploration_weight", "must be between 0.05 and 1.0");
        }
        if !(0.05..=1.0).contains(&self.learning.decay_baseline) {
            return fail("learning.decay_baseline", "must be between 0.05 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.learning.decay_step) {
            return fail("learning.decay_step", "must be between 0.0 and 1.0");
        }
        if self.scheduler.credits_per_query == 0 {
            return fail("scheduler.credits_per_query", "must be greater than 0");
        }
        if !(0.0..=1.0).contains(&self.scheduler.high_tier_reserve) {
            return fail("scheduler.high_tier_reserve", "must be between 0.0 and 1.0");
        }
        if self.scheduler.max_concurrent_queries == 0 {
            return fail("scheduler.max_concurrent_queries", "must be greater than 0");
        }
        if self.scheduler.query_timeout_secs == 0 {
            return fail("scheduler.query_timeout_secs", "must be greater than 0");
        }
        Ok(())
    }
}
