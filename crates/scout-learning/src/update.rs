use scout_core::models::{Outcome, Weight};

/// Feedback update rule.
///
/// ```text
/// approved:             w' = w + rate * (1 - w)
/// rejected, irrelevant: w' = w - rate * w
/// ```
///
/// The result is clamped to [0.05, 1.0].
pub fn apply(weight: Weight, outcome: Outcome, learning_rate: f64) -> Weight {
    let w = weight.value();
    let next = match outcome {
        Outcome::Approved => w + learning_rate * (1.0 - w),
        Outcome::Rejected | Outcome::Irrelevant => w - learning_rate * w,
    };
    Weight::new(next)
}
