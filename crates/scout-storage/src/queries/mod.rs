//! SQL for each table group. Timestamps are stored as fixed-width RFC 3339
//! UTC strings so they compare correctly as text.

pub mod feedback_ops;
pub mod item_ops;
pub mod keyword_ops;
pub mod ledger_ops;

use chrono::{DateTime, SecondsFormat, Utc};

pub(crate) fn fmt_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{raw}': {e}"))
}

pub(crate) fn to_u64(raw: i64, column: &str) -> Result<u64, String> {
    u64::try_from(raw).map_err(|_| format!("negative {column}: {raw}"))
}
