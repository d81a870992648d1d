//! QueryBuilder: keywords + filters -> independently issuable queries.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use scout_core::config::QueryConfig;
use scout_core::errors::QueryError;
use scout_core::models::{SearchFilters, SearchQuery};

use crate::batching::{self, RenderedTerm};
use crate::{filters, terms};

/// Queries built from a keyword set plus the keywords that could not be placed.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    pub queries: Vec<SearchQuery>,
    /// `KeywordTooLong` / `EmptyKeyword` for each keyword left out.
    pub rejected: Vec<(String, QueryError)>,
}

/// Builds syntactically valid, length-bounded search queries.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    max_length: usize,
    max_or_terms: usize,
}

impl QueryBuilder {
    pub fn new(max_length: usize, max_or_terms: usize) -> Self {
        Self {
            max_length,
            max_or_terms: max_or_terms.max(1),
        }
    }

    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(config.max_query_length, config.max_or_terms)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn max_or_terms(&self) -> usize {
        self.max_or_terms
    }

    /// Build queries for `keywords`, failing fast on the first keyword that
    /// cannot fit any query.
    pub fn build(
        &self,
        keywords: &[String],
        filters: &SearchFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchQuery>, QueryError> {
        let plan = self.plan(keywords, filters, now)?;
        if let Some((_, err)) = plan.rejected.into_iter().next() {
            return Err(err);
        }
        Ok(plan.queries)
    }

    /// Build queries for every keyword that fits, reporting the rest.
    ///
    /// Filter problems fail the whole plan since they affect every query.
    /// Duplicate keywords are issued once. Input order is kept, so callers
    /// pass keywords highest priority first.
    pub fn plan(
        &self,
        keywords: &[String],
        search_filters: &SearchFilters,
        now: DateTime<Utc>,
    ) -> Result<QueryPlan, QueryError> {
        if keywords.is_empty() {
            return Err(QueryError::NoKeywords);
        }
        filters::validate(search_filters)?;

        let suffix = filters::render_clauses(search_filters, now).join(" ");
        let suffix_len = if suffix.is_empty() {
            0
        } else {
            suffix.chars().count() + 1
        };
        let group_budget = self.max_length.saturating_sub(suffix_len);

        let mut seen = HashSet::new();
        let mut rendered = Vec::with_capacity(keywords.len());
        let mut rejected = Vec::new();

        for keyword in keywords {
            if !seen.insert(keyword.as_str()) {
                continue;
            }
            match terms::render_term(keyword) {
                Ok(term) => {
                    let length = term.chars().count() + suffix_len;
                    if length > self.max_length {
                        rejected.push((
                            keyword.clone(),
                            QueryError::KeywordTooLong {
                                keyword: keyword.clone(),
                                length,
                                ceiling: self.max_length,
                            },
                        ));
                    } else {
                        rendered.push(RenderedTerm {
                            keyword: keyword.clone(),
                            term,
                        });
                    }
                }
                Err(e) => rejected.push((keyword.clone(), e)),
            }
        }

        let queries: Vec<SearchQuery> = batching::pack(rendered, group_budget, self.max_or_terms)
            .into_iter()
            .map(|group| {
                let term_strs: Vec<String> = group.iter().map(|t| t.term.clone()).collect();
                let mut text = terms::render_group(&term_strs);
                if !suffix.is_empty() {
                    text.push(' ');
                    text.push_str(&suffix);
                }
                SearchQuery {
                    text,
                    keywords: group.into_iter().map(|t| t.keyword).collect(),
                }
            })
            .collect();

        debug!(
            keywords = keywords.len(),
            queries = queries.len(),
            rejected = rejected.len(),
            "query plan built"
        );

        Ok(QueryPlan { queries, rejected })
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}
