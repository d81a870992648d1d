use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keyword effectiveness weight clamped to [0.05, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    /// Lowest weight a keyword can reach. Keywords are never deleted at the floor.
    pub const FLOOR: f64 = 0.05;
    /// Highest weight a keyword can reach.
    pub const CEILING: f64 = 1.0;
    /// Default for keywords without feedback, above neutral so they get tried.
    pub const EXPLORATION: f64 = 0.6;
    /// Neutral baseline stale keywords decay toward.
    pub const NEUTRAL: f64 = 0.5;
    /// High tier threshold (inclusive).
    pub const HIGH: f64 = 0.8;
    /// Medium tier threshold (inclusive).
    pub const MEDIUM: f64 = 0.5;

    /// Create a new Weight, clamping to [FLOOR, CEILING]. NaN maps to the floor.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::FLOOR);
        }
        Self(value.clamp(Self::FLOOR, Self::CEILING))
    }

    pub fn exploration() -> Self {
        Self(Self::EXPLORATION)
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn tier(self) -> KeywordTier {
        KeywordTier::from_weight(self.0)
    }

    pub fn is_floor(self) -> bool {
        self.0 <= Self::FLOOR
    }

    pub fn is_ceiling(self) -> bool {
        self.0 >= Self::CEILING
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::exploration()
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(w: Weight) -> Self {
        w.0
    }
}

/// Search priority derived from the current weight. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordTier {
    High,
    Medium,
    Low,
}

impl KeywordTier {
    /// high ≥ 0.8, medium [0.5, 0.8), low < 0.5.
    pub fn from_weight(weight: f64) -> Self {
        if weight >= Weight::HIGH {
            Self::High
        } else if weight >= Weight::MEDIUM {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for KeywordTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent state of one search keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    /// Normalized search term, unique key.
    pub keyword: String,
    pub weight: Weight,
    /// Last time a query carrying this keyword was issued.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Last time feedback or decay changed the weight.
    pub last_weight_update_at: DateTime<Utc>,
    /// Number of feedback events applied.
    pub feedback_count: u64,
}

impl KeywordRecord {
    /// New keyword at the exploration weight.
    pub fn new(keyword: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_weight(keyword, Weight::exploration(), now)
    }

    pub fn with_weight(keyword: impl Into<String>, weight: Weight, now: DateTime<Utc>) -> Self {
        Self {
            keyword: keyword.into(),
            weight,
            last_used_at: None,
            last_weight_update_at: now,
            feedback_count: 0,
        }
    }

    pub fn tier(&self) -> KeywordTier {
        self.weight.tier()
    }
}

/// Canonical form of a keyword: trimmed, lowercase, inner whitespace collapsed.
/// The search API matches case-insensitively, so case variants are one keyword.
pub fn normalize_keyword(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
