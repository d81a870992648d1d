use serde::{Deserialize, Serialize};

/// One complete, independently issuable search query.
///
/// Ephemeral: rebuilt every cycle, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Serialized query string sent to the search API.
    pub text: String,
    /// Keywords OR-combined in this query, in clause order.
    pub keywords: Vec<String>,
}

impl SearchQuery {
    /// Serialized length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of OR-combined keyword terms.
    pub fn or_terms(&self) -> usize {
        self.keywords.len()
    }
}
