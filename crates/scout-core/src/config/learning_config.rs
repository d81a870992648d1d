use serde::{Deserialize, Serialize};

use super::defaults;

/// Keyword weight learner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Step size of the feedback update rule.
    pub learning_rate: f64,
    /// Weight given to a keyword that has never received feedback.
    pub exploration_weight: f64,
    /// Days without a weight update before decay applies.
    pub decay_window_days: u64,
    /// Fixed step a stale weight moves toward the baseline per decay pass.
    pub decay_step: f64,
    /// Neutral weight stale keywords are pulled toward.
    pub decay_baseline: f64,
}

impl LearningConfig {
    pub fn decay_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.decay_window_days as i64)
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            exploration_weight: defaults::DEFAULT_EXPLORATION_WEIGHT,
            decay_window_days: defaults::DEFAULT_DECAY_WINDOW_DAYS,
            decay_step: defaults::DEFAULT_DECAY_STEP,
            decay_baseline: defaults::DEFAULT_DECAY_BASELINE,
        }
    }
}
