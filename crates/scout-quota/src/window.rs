//! Rolling call-count window.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// Timestamps of calls issued inside the trailing window.
#[derive(Debug, Clone)]
pub struct RateWindow {
    length: Duration,
    max_calls: u32,
    calls: VecDeque<DateTime<Utc>>,
}

impl RateWindow {
    pub fn new(length: Duration, max_calls: u32) -> Self {
        Self {
            length,
            max_calls,
            calls: VecDeque::new(),
        }
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    pub fn max_calls(&self) -> u32 {
        self.max_calls
    }

    /// Calls inside `(now - length, now]`.
    pub fn count(&mut self, now: DateTime<Utc>) -> u32 {
        self.prune(now);
        self.calls.len() as u32
    }

    pub fn has_capacity(&mut self, now: DateTime<Utc>) -> bool {
        self.count(now) < self.max_calls
    }

    pub fn record(&mut self, at: DateTime<Utc>) {
        let pos = self.calls.partition_point(|t| *t <= at);
        self.calls.insert(pos, at);
    }

    /// Forget one call recorded at `at` (a reservation that never went out).
    pub fn forget(&mut self, at: DateTime<Utc>) {
        if let Some(pos) = self.calls.iter().position(|t| *t == at) {
            self.calls.remove(pos);
        }
    }

    /// When the oldest call leaves the window.
    pub fn next_slot(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.prune(now);
        self.calls.front().map(|t| *t + self.length).unwrap_or(now)
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        while let Some(oldest) = self.calls.front() {
            if now - *oldest >= self.length {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }
}
