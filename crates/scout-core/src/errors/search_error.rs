use std::time::Duration;

/// Failures reported by the external search API client.
/// Every variant carries the credits the API charged anyway (often 0).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("network error: {reason}")]
    Network { reason: String, credits_charged: u64 },

    #[error("authentication failed: {reason}")]
    Auth { reason: String, credits_charged: u64 },

    #[error("rate limited by search API (observed usage {observed_used:?})")]
    RateLimited {
        retry_after: Option<Duration>,
        observed_used: Option<u64>,
        credits_charged: u64,
    },

    #[error("search timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String, credits_charged: u64 },
}

impl SearchError {
    /// Credits the failed call still consumed.
    pub fn credits_charged(&self) -> u64 {
        match self {
            Self::Network { credits_charged, .. }
            | Self::Auth { credits_charged, .. }
            | Self::RateLimited { credits_charged, .. }
            | Self::InvalidResponse { credits_charged, .. } => *credits_charged,
            Self::Timeout { .. } => 0,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
