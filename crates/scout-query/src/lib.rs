//! # scout-query
//!
//! Turns keywords plus filter options into complete search-API query strings.
//! Pure construction: no network access, no quota accounting.
//! Keywords are OR-batched under a character ceiling and a term ceiling.

pub mod batching;
pub mod builder;
pub mod filters;
pub mod terms;

pub use builder::{QueryBuilder, QueryPlan};
