//! # scout-scheduler
//!
//! The search cycle: select keywords by tier, recency and budget, build
//! queries, execute them with bounded concurrency under quota reservations,
//! deposit results in the cache and report every decision.
//!
//! `ScoutRuntime` wires storage and every engine together and provides the
//! manual and timer triggers.

pub mod attribution;
pub mod engine;
pub mod execution;
pub mod runtime;
pub mod selection;

pub use engine::Scheduler;
pub use runtime::ScoutRuntime;
pub use selection::{Candidate, Selection, SelectionLimits};
