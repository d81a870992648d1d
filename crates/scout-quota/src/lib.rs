//! # scout-quota
//!
//! Gates every search call behind two independent checks: the period credit
//! budget and a short rolling-window call limit. Spending is two-phase:
//! `reserve` before the call, `commit` with the actual cost after it (or
//! `release` if the call never went out). The manager performs no network I/O.

pub mod manager;
pub mod period;
pub mod projection;
pub mod window;

pub use manager::{CommitReceipt, QuotaManager, ReservationToken};
