//! # scout-learning
//!
//! Keyword weight learner. Feedback moves a keyword's weight toward 1.0
//! (approved) or toward 0.0 (rejected, irrelevant), clamped to [0.05, 1.0].
//! Keywords untouched for longer than the decay window drift back toward a
//! neutral baseline so they get re-tested.

pub mod decay;
pub mod engine;
pub mod update;

pub use engine::{DecayStats, FeedbackOutcome, TierCounts, WeightChange, WeightLearner};
