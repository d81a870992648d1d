use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Moderation verdict on a reply generated from a found post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Approved,
    Rejected,
    Irrelevant,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Irrelevant => "irrelevant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "irrelevant" => Some(Self::Irrelevant),
            _ => None,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback from the moderation collaborator, consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub id: Uuid,
    /// Keywords that surfaced the judged item.
    pub keywords: Vec<String>,
    pub outcome: Outcome,
    pub occurred_at: DateTime<Utc>,
}

impl FeedbackEvent {
    pub fn new(keywords: Vec<String>, outcome: Outcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            keywords,
            outcome,
            occurred_at: Utc::now(),
        }
    }
}
