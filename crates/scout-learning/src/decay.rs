//! Staleness decay toward a neutral baseline.

use chrono::{DateTime, Duration, Utc};

use scout_core::models::Weight;

/// A weight last updated at `last_update` is stale once more than `window`
/// has passed.
pub fn is_stale(last_update: DateTime<Utc>, window: Duration, now: DateTime<Utc>) -> bool {
    now - last_update > window
}

/// Move `weight` one `step` toward `baseline` without overshooting it.
pub fn step_toward(weight: Weight, baseline: f64, step: f64) -> Weight {
    let w = weight.value();
    let next = if w > baseline {
        (w - step).max(baseline)
    } else {
        (w + step).min(baseline)
    };
    Weight::new(next)
}
