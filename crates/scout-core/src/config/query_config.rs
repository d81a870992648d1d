use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::SearchFilters;

/// Query builder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Character ceiling for one serialized query.
    pub max_query_length: usize,
    /// Maximum number of OR-combined keyword terms per query.
    pub max_or_terms: usize,
    /// Filter clauses appended to every query.
    pub filters: SearchFilters,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_query_length: defaults::DEFAULT_MAX_QUERY_LENGTH,
            max_or_terms: defaults::DEFAULT_MAX_OR_TERMS,
            filters: SearchFilters::default(),
        }
    }
}
