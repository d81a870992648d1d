//! Property tests for keyword selection.

use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use scout_core::models::{KeywordTier, SkipReason, Weight};
use scout_scheduler::{selection::select, Candidate, SelectionLimits};

fn candidates() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec((0.0f64..=1.0, proptest::option::of(0i64..100), any::<bool>()), 0..60)
        .prop_map(|rows| {
            let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
            rows.into_iter()
                .enumerate()
                .map(|(i, (weight, used, covered))| Candidate {
                    keyword: format!("kw{i:03}"),
                    weight: Weight::new(weight),
                    last_used_at: used.map(|h| base + Duration::hours(h)),
                    covered,
                })
                .collect()
        })
}

fn limits() -> impl Strategy<Value = SelectionLimits> {
    (0u64..40, 1u64..4, 1usize..10, 0.0f64..=1.0, 0usize..6).prop_map(
        |(budget, credits_per_query, max_or_terms, high_tier_reserve, low_tier_cap)| {
            SelectionLimits {
                budget,
                credits_per_query,
                max_or_terms,
                high_tier_reserve,
                low_tier_cap,
            }
        },
    )
}

proptest! {
    #[test]
    fn every_candidate_is_accounted_for_once(input in candidates(), limits in limits()) {
        let total = input.len();
        let selection = select(input, &limits);
        let mut seen = HashSet::new();
        for keyword in selection.selected.iter().map(|c| &c.keyword)
            .chain(selection.skipped.iter().map(|s| &s.keyword))
        {
            prop_assert!(seen.insert(keyword.clone()), "{} appears twice", keyword);
        }
        prop_assert_eq!(seen.len(), total);
    }

    #[test]
    fn covered_keywords_are_never_selected(input in candidates(), limits in limits()) {
        let covered: HashSet<String> =
            input.iter().filter(|c| c.covered).map(|c| c.keyword.clone()).collect();
        let selection = select(input, &limits);
        for candidate in &selection.selected {
            prop_assert!(!covered.contains(&candidate.keyword));
        }
        for keyword in &covered {
            let reason = selection
                .skipped
                .iter()
                .find(|s| &s.keyword == keyword)
                .map(|s| s.reason);
            prop_assert_eq!(reason, Some(SkipReason::CoveredRecently));
        }
    }

    #[test]
    fn uncovered_high_tier_is_always_selected(input in candidates(), limits in limits()) {
        let high: Vec<String> = input
            .iter()
            .filter(|c| !c.covered && c.tier() == KeywordTier::High)
            .map(|c| c.keyword.clone())
            .collect();
        let selection = select(input, &limits);
        for keyword in &high {
            prop_assert!(selection.candidate(keyword).is_some());
        }
    }

    #[test]
    fn medium_tier_stays_inside_its_allowance(input in candidates(), limits in limits()) {
        let selection = select(input, &limits);
        let medium = selection
            .selected
            .iter()
            .filter(|c| c.tier() == KeywordTier::Medium)
            .count();
        prop_assert!(limits.estimate(medium) <= limits.medium_allowance());
    }

    #[test]
    fn low_tier_never_exceeds_its_cap(input in candidates(), limits in limits()) {
        let selection = select(input, &limits);
        let low = selection
            .selected
            .iter()
            .filter(|c| c.tier() == KeywordTier::Low)
            .count();
        prop_assert!(low <= limits.low_tier_cap);
    }

    #[test]
    fn non_high_selection_fits_the_budget(input in candidates(), limits in limits()) {
        let selection = select(input, &limits);
        let (high, rest): (Vec<&Candidate>, Vec<&Candidate>) = selection
            .selected
            .iter()
            .partition(|c| c.tier() == KeywordTier::High);
        let medium = rest.iter().filter(|c| c.tier() == KeywordTier::Medium).count();
        let low = rest.len() - medium;
        let spent = limits.estimate(high.len()) + limits.estimate(medium) + limits.estimate(low);
        prop_assert!(rest.is_empty() || spent <= limits.budget);
    }
}
