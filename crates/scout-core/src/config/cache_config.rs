use serde::{Deserialize, Serialize};

use super::defaults;

/// Tweet cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a keyword search (and the items it fetched) counts as fresh.
    pub reuse_ttl_hours: u64,
    /// How long items are retained before a sweep purges them.
    pub retention_days: u64,
}

impl CacheConfig {
    pub fn reuse_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.reuse_ttl_hours as i64)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days as i64)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reuse_ttl_hours: defaults::DEFAULT_REUSE_TTL_HOURS,
            retention_days: defaults::DEFAULT_RETENTION_DAYS,
        }
    }
}
