// Single source of truth for all default values.

// --- Query ---
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 512;
pub const DEFAULT_MAX_OR_TERMS: usize = 25;

// --- Cache ---
pub const DEFAULT_REUSE_TTL_HOURS: u64 = 96; // 4 days
pub const DEFAULT_RETENTION_DAYS: u64 = 90;

// --- Quota ---
pub const DEFAULT_PERIOD_CREDITS: u64 = 10_000;
pub const DEFAULT_RESET_DAY: u32 = 1;
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 900; // 15 minutes
pub const DEFAULT_RATE_WINDOW_MAX_CALLS: u32 = 60;
pub const DEFAULT_PROJECTION_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_WARNING_PERCENT: f64 = 80.0;

// --- Learning ---
pub const DEFAULT_LEARNING_RATE: f64 = 0.3;
pub const DEFAULT_EXPLORATION_WEIGHT: f64 = 0.6;
pub const DEFAULT_DECAY_WINDOW_DAYS: u64 = 30;
pub const DEFAULT_DECAY_STEP: f64 = 0.05;
pub const DEFAULT_DECAY_BASELINE: f64 = 0.5;

// --- Scheduler ---
pub const DEFAULT_CYCLE_CREDIT_BUDGET: u64 = 30;
pub const DEFAULT_CREDITS_PER_QUERY: u64 = 1;
pub const DEFAULT_HIGH_TIER_RESERVE: f64 = 0.5;
pub const DEFAULT_LOW_TIER_CAP: usize = 3;
pub const DEFAULT_MAX_RESULTS_PER_QUERY: u32 = 100;
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 4;
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 900; // 15 minutes
pub const DEFAULT_DECAY_EACH_CYCLE: bool = true;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "scout.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
