//! Deterministic moderation feedback.

use std::collections::HashSet;

use scout_core::models::{CycleReport, FeedbackEvent, Outcome};

/// Judges searched keywords against a fixed set of "good" keywords:
/// approved if good, rejected otherwise. With `noise_every(n)`, every n-th
/// judgement on a good keyword comes back irrelevant instead.
#[derive(Debug, Clone)]
pub struct FeedbackSimulator {
    good: HashSet<String>,
    noise_every: Option<usize>,
    judged: usize,
}

impl FeedbackSimulator {
    pub fn new<I, S>(good: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            good: good.into_iter().map(Into::into).collect(),
            noise_every: None,
            judged: 0,
        }
    }

    pub fn noise_every(mut self, n: usize) -> Self {
        self.noise_every = Some(n.max(1));
        self
    }

    pub fn is_good(&self, keyword: &str) -> bool {
        self.good.contains(keyword)
    }

    pub fn judge(&mut self, keyword: &str) -> Outcome {
        if !self.good.contains(keyword) {
            return Outcome::Rejected;
        }
        self.judged += 1;
        match self.noise_every {
            Some(n) if self.judged % n == 0 => Outcome::Irrelevant,
            _ => Outcome::Approved,
        }
    }

    /// One event per keyword searched in `report`.
    pub fn events_for(&mut self, report: &CycleReport) -> Vec<FeedbackEvent> {
        report
            .searched
            .iter()
            .map(|k| FeedbackEvent::new(vec![k.clone()], self.judge(k)))
            .collect()
    }
}
