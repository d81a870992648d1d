/// Scout system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quota source label for keyword search calls.
pub const SOURCE_SEARCH: &str = "search";

/// Maximum number of keywords accepted by a single cycle.
pub const MAX_KEYWORDS_PER_CYCLE: usize = 10_000;

/// Maximum batch size for bulk persistence operations.
pub const MAX_BULK_BATCH_SIZE: usize = 500;

/// Quota source label for usage reported by the search API beyond the ledger.
pub const SOURCE_RECONCILED: &str = "reconciled";
