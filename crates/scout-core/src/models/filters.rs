use serde::{Deserialize, Serialize};

/// Filter clauses appended to every keyword query.
///
/// Absent (`None`, `false`, or zero) filters produce no clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub min_likes: Option<u32>,
    pub min_retweets: Option<u32>,
    pub min_replies: Option<u32>,
    pub exclude_replies: bool,
    pub exclude_retweets: bool,
    pub only_replies: bool,
    pub only_retweets: bool,
    /// Two- or three-letter language code, e.g. `en`.
    pub language: Option<String>,
    /// Only posts newer than this many days, resolved at build time.
    pub days_back: Option<u32>,
}

impl SearchFilters {
    /// True when no filter would emit a clause.
    pub fn is_empty(&self) -> bool {
        self.min_likes.unwrap_or(0) == 0
            && self.min_retweets.unwrap_or(0) == 0
            && self.min_replies.unwrap_or(0) == 0
            && !self.exclude_replies
            && !self.exclude_retweets
            && !self.only_replies
            && !self.only_retweets
            && self.language.as_deref().map_or(true, |l| l.trim().is_empty())
            && self.days_back.unwrap_or(0) == 0
    }
}
