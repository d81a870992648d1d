use chrono::{DateTime, Utc};

/// Quota manager errors. `QuotaExceeded` and `RateLimited` are expected
/// steady-state conditions, not faults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuotaError {
    #[error("quota exceeded: requested {requested}, available {available} of {total}")]
    QuotaExceeded {
        requested: u64,
        available: u64,
        total: u64,
    },

    #[error("rate limited: {calls} calls in window (limit {limit}), retry after {retry_at}")]
    RateLimited {
        calls: u32,
        limit: u32,
        retry_at: DateTime<Utc>,
    },

    #[error("unknown reservation {id}")]
    UnknownReservation { id: u64 },
}
