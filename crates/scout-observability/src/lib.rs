//! # scout-observability
//!
//! Tracing subscriber setup, span definitions for cycles, queries, learning
//! and sweeps, structured log events, and a bounded log of recent cycle
//! summaries.

pub mod cycle_log;
pub mod tracing_setup;

pub use cycle_log::{CycleLog, CycleSummary};
pub use tracing_setup::{events, init_from_config, init_tracing, init_tracing_with_filter};
