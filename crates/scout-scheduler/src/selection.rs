//! Keyword selection for one cycle. Pure: every input is passed in.
//!
//! High tier is always selected. Medium tier is added by weight while its
//! estimated cost stays inside the share of the budget not reserved for
//! high tier. Low tier gets at most `low_tier_cap` exploration slots,
//! least recently used first, from whatever budget is left. Keywords
//! searched within the reuse TTL are skipped in every tier.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scout_core::models::{KeywordTier, SkipReason, SkippedKeyword, Weight};

/// One keyword as the selector sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub keyword: String,
    pub weight: Weight,
    pub last_used_at: Option<DateTime<Utc>>,
    /// Searched within the reuse TTL.
    pub covered: bool,
}

impl Candidate {
    pub fn tier(&self) -> KeywordTier {
        self.weight.tier()
    }

    pub fn skipped(&self, reason: SkipReason) -> SkippedKeyword {
        SkippedKeyword {
            keyword: self.keyword.clone(),
            tier: self.tier(),
            weight: self.weight.value(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionLimits {
    /// Credits this cycle may spend.
    pub budget: u64,
    pub credits_per_query: u64,
    pub max_or_terms: usize,
    /// Fraction of `budget` medium tier may not use.
    pub high_tier_reserve: f64,
    pub low_tier_cap: usize,
}

impl SelectionLimits {
    /// Estimated cost of searching `keywords` keywords: one query per
    /// `max_or_terms` keywords.
    pub fn estimate(&self, keywords: usize) -> u64 {
        if keywords == 0 {
            return 0;
        }
        let per_query = self.max_or_terms.max(1);
        keywords.div_ceil(per_query) as u64 * self.credits_per_query
    }

    /// Credits medium tier may use at most.
    pub fn medium_allowance(&self) -> u64 {
        let share = (1.0 - self.high_tier_reserve.clamp(0.0, 1.0)) * self.budget as f64;
        share.floor() as u64
    }
}

/// Keywords chosen for a cycle, in issue order, and the ones left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub selected: Vec<Candidate>,
    pub skipped: Vec<SkippedKeyword>,
}

impl Selection {
    pub fn keywords(&self) -> Vec<String> {
        self.selected.iter().map(|c| c.keyword.clone()).collect()
    }

    pub fn candidate(&self, keyword: &str) -> Option<&Candidate> {
        self.selected.iter().find(|c| c.keyword == keyword)
    }
}

pub fn select(candidates: Vec<Candidate>, limits: &SelectionLimits) -> Selection {
    let mut selection = Selection::default();
    let (mut high, mut medium, mut low) = (Vec::new(), Vec::new(), Vec::new());

    for candidate in candidates {
        if candidate.covered {
            selection
                .skipped
                .push(candidate.skipped(SkipReason::CoveredRecently));
            continue;
        }
        match candidate.tier() {
            KeywordTier::High => high.push(candidate),
            KeywordTier::Medium => medium.push(candidate),
            KeywordTier::Low => low.push(candidate),
        }
    }

    high.sort_by(by_weight);
    medium.sort_by(by_weight);
    low.sort_by(least_recently_used);

    let high_cost = limits.estimate(high.len());
    selection.selected.extend(high);

    let medium_room = limits
        .medium_allowance()
        .min(limits.budget.saturating_sub(high_cost));
    let mut medium_taken = 0usize;
    for candidate in medium {
        if limits.estimate(medium_taken + 1) <= medium_room {
            medium_taken += 1;
            selection.selected.push(candidate);
        } else {
            selection
                .skipped
                .push(candidate.skipped(SkipReason::BudgetExhausted));
        }
    }

    let low_room = limits
        .budget
        .saturating_sub(high_cost)
        .saturating_sub(limits.estimate(medium_taken));
    let mut low_taken = 0usize;
    for (slot, candidate) in low.into_iter().enumerate() {
        if slot >= limits.low_tier_cap {
            selection
                .skipped
                .push(candidate.skipped(SkipReason::LowTierCap));
        } else if limits.estimate(low_taken + 1) <= low_room {
            low_taken += 1;
            selection.selected.push(candidate);
        } else {
            selection
                .skipped
                .push(candidate.skipped(SkipReason::BudgetExhausted));
        }
    }

    selection
}

fn by_weight(a: &Candidate, b: &Candidate) -> Ordering {
    b.weight
        .value()
        .total_cmp(&a.weight.value())
        .then_with(|| a.keyword.cmp(&b.keyword))
}

/// Never-used keywords first, then oldest use.
fn least_recently_used(a: &Candidate, b: &Candidate) -> Ordering {
    a.last_used_at
        .cmp(&b.last_used_at)
        .then_with(|| a.keyword.cmp(&b.keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn limits(budget: u64) -> SelectionLimits {
        SelectionLimits {
            budget,
            credits_per_query: 1,
            max_or_terms: 1,
            high_tier_reserve: 0.5,
            low_tier_cap: 3,
        }
    }

    fn candidate(keyword: &str, weight: f64) -> Candidate {
        Candidate {
            keyword: keyword.to_string(),
            weight: Weight::new(weight),
            last_used_at: None,
            covered: false,
        }
    }

    #[test]
    fn estimate_rounds_up_per_query() {
        let mut l = limits(10);
        l.max_or_terms = 25;
        assert_eq!(l.estimate(0), 0);
        assert_eq!(l.estimate(1), 1);
        assert_eq!(l.estimate(25), 1);
        assert_eq!(l.estimate(26), 2);
    }

    #[test]
    fn high_tier_is_always_selected() {
        let selection = select(
            vec![candidate("a", 0.9), candidate("b", 0.95), candidate("c", 0.85)],
            &limits(0),
        );
        assert_eq!(selection.keywords(), vec!["b", "a", "c"]);
        assert!(selection.skipped.is_empty());
    }

    #[test]
    fn covered_keywords_are_skipped_even_when_high() {
        let mut hot = candidate("hot", 0.95);
        hot.covered = true;
        let selection = select(vec![hot], &limits(10));
        assert!(selection.selected.is_empty());
        assert_eq!(selection.skipped[0].reason, SkipReason::CoveredRecently);
    }

    #[test]
    fn medium_stops_at_its_allowance() {
        let candidates = (0..8).map(|i| candidate(&format!("m{i}"), 0.6)).collect();
        let selection = select(candidates, &limits(10));
        assert_eq!(selection.selected.len(), 5);
        assert_eq!(selection.skipped.len(), 3);
        assert!(selection
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::BudgetExhausted));
    }

    #[test]
    fn medium_yields_to_high_cost() {
        let mut candidates: Vec<Candidate> =
            (0..9).map(|i| candidate(&format!("h{i}"), 0.9)).collect();
        candidates.push(candidate("m", 0.7));
        let selection = select(candidates, &limits(10));
        assert_eq!(selection.selected.len(), 10);

        let mut candidates: Vec<Candidate> =
            (0..10).map(|i| candidate(&format!("h{i}"), 0.9)).collect();
        candidates.push(candidate("m", 0.7));
        let selection = select(candidates, &limits(10));
        assert_eq!(selection.selected.len(), 10);
        assert_eq!(selection.skipped[0].keyword, "m");
    }

    #[test]
    fn low_tier_is_capped_oldest_first() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let candidates = (0..5)
            .map(|i| {
                let mut c = candidate(&format!("l{i}"), 0.2);
                c.last_used_at = Some(t0 + Duration::days(5 - i));
                c
            })
            .collect();
        let selection = select(candidates, &limits(10));
        assert_eq!(selection.keywords(), vec!["l4", "l3", "l2"]);
        assert_eq!(selection.skipped.len(), 2);
        assert!(selection
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::LowTierCap));
    }

    #[test]
    fn low_tier_needs_leftover_budget() {
        let candidates = vec![candidate("h", 0.9), candidate("l", 0.1)];
        let selection = select(candidates, &limits(1));
        assert_eq!(selection.keywords(), vec!["h"]);
        assert_eq!(selection.skipped[0].reason, SkipReason::BudgetExhausted);
    }

    #[test]
    fn order_is_high_then_medium_then_low() {
        let candidates = vec![
            candidate("low", 0.1),
            candidate("med", 0.6),
            candidate("high", 0.9),
        ];
        let selection = select(candidates, &limits(10));
        assert_eq!(selection.keywords(), vec!["high", "med", "low"]);
    }
}
