//! Property tests for the update rule and decay.

use proptest::prelude::*;

use scout_core::models::{Outcome, Weight};
use scout_learning::{decay, update};

proptest! {
    #[test]
    fn approval_never_decreases(w in 0.05f64..0.999, rate in 0.01f64..=1.0) {
        let before = Weight::new(w);
        let after = update::apply(before, Outcome::Approved, rate);
        prop_assert!(after.value() > before.value() || after.is_ceiling());
    }

    #[test]
    fn rejection_never_increases(w in 0.05f64..=1.0, rate in 0.01f64..=1.0) {
        let before = Weight::new(w);
        let after = update::apply(before, Outcome::Rejected, rate);
        prop_assert!(after.value() < before.value() || after.is_floor());
    }

    #[test]
    fn updates_stay_in_bounds(
        w in -1.0f64..2.0,
        rate in 0.0f64..=1.0,
        outcomes in prop::collection::vec(prop_oneof![
            Just(Outcome::Approved),
            Just(Outcome::Rejected),
            Just(Outcome::Irrelevant),
        ], 0..50),
    ) {
        let mut weight = Weight::new(w);
        for outcome in outcomes {
            weight = update::apply(weight, outcome, rate);
            prop_assert!(weight.value() >= Weight::FLOOR && weight.value() <= Weight::CEILING);
        }
    }

    #[test]
    fn decay_moves_closer_without_crossing(
        w in 0.05f64..=1.0,
        baseline in 0.05f64..=1.0,
        step in 0.0f64..=1.0,
    ) {
        let before = Weight::new(w);
        let after = decay::step_toward(before, baseline, step);
        let dist_before = (before.value() - baseline).abs();
        let dist_after = (after.value() - baseline).abs();
        prop_assert!(dist_after <= dist_before + 1e-12);
        prop_assert!((before.value() - baseline) * (after.value() - baseline) >= 0.0);
    }
}
