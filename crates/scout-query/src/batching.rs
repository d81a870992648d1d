//! Greedy OR-batching of rendered terms.

use crate::terms;

/// One keyword and its rendered query term.
#[derive(Debug, Clone)]
pub struct RenderedTerm {
    pub keyword: String,
    pub term: String,
}

impl RenderedTerm {
    pub fn len(&self) -> usize {
        self.term.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }
}

/// Pack terms into groups in input order.
///
/// Each group's rendered length stays within `group_budget` characters and
/// holds at most `max_terms` terms. Every term must fit `group_budget` alone;
/// the builder rejects the ones that do not before calling this.
pub fn pack(items: Vec<RenderedTerm>, group_budget: usize, max_terms: usize) -> Vec<Vec<RenderedTerm>> {
    let max_terms = max_terms.max(1);
    let mut groups = Vec::new();
    let mut current: Vec<RenderedTerm> = Vec::new();
    let mut current_len = 0usize;

    for item in items {
        let item_len = item.len();
        let grown = terms::group_len(current_len + item_len, current.len() + 1);
        if !current.is_empty() && (current.len() >= max_terms || grown > group_budget) {
            groups.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += item_len;
        current.push(item);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
