//! Keyword recency decision, kept pure for testing.

use chrono::{DateTime, Duration, Utc};

/// A keyword searched at `last_searched` is still covered at `now` when the
/// search happened no longer than `within` ago.
pub fn is_covered(last_searched: Option<DateTime<Utc>>, within: Duration, now: DateTime<Utc>) -> bool {
    match last_searched {
        Some(at) => at <= now && now - at < within,
        None => false,
    }
}
