//! QuotaManager: period ledger, rate window and reservations behind one lock.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use scout_core::config::QuotaConfig;
use scout_core::constants::SOURCE_RECONCILED;
use scout_core::errors::{QuotaError, ScoutResult};
use scout_core::models::{QuotaLedger, QuotaUsage};
use scout_core::traits::ILedgerStore;

use crate::period::period_bounds;
use crate::projection::projected_exhaustion;
use crate::window::RateWindow;

/// Proof of a reservation. Consumed by `commit` or `release`.
///
/// A token dropped without either releases its reservation, so a cycle
/// future dropped mid-flight cannot strand credits.
pub struct ReservationToken {
    id: u64,
    credits: u64,
    state: Option<Weak<Mutex<QuotaState>>>,
}

impl ReservationToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    /// Settled explicitly; `Drop` has nothing left to do.
    fn disarm(&mut self) {
        self.state = None;
    }
}

impl fmt::Debug for ReservationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationToken")
            .field("id", &self.id)
            .field("credits", &self.credits)
            .field("armed", &self.state.is_some())
            .finish()
    }
}

impl Drop for ReservationToken {
    fn drop(&mut self) {
        let Some(state) = self.state.take().and_then(|weak| weak.upgrade()) else {
            return;
        };
        let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(reservation) = state.reservations.remove(&self.id) {
            state.window.forget(reservation.issued_at);
            debug!(id = self.id, credits = reservation.credits, "abandoned reservation released");
        }
    }
}

/// What a commit actually applied to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub reserved: u64,
    /// Credits added to `used`.
    pub applied: u64,
    /// Credits reported by the API beyond what the period had left.
    pub overage: u64,
    /// False when the ledger could not be written to the store. The credits
    /// are applied in memory either way.
    pub persisted: bool,
}

#[derive(Debug)]
struct Reservation {
    credits: u64,
    source: String,
    issued_at: DateTime<Utc>,
}

#[derive(Debug)]
struct QuotaState {
    ledger: QuotaLedger,
    reservations: HashMap<u64, Reservation>,
    window: RateWindow,
    daily: BTreeMap<NaiveDate, u64>,
    rate_limited_until: Option<DateTime<Utc>>,
    next_id: u64,
    warned: bool,
}

impl QuotaState {
    fn reserved(&self) -> u64 {
        self.reservations.values().map(|r| r.credits).sum()
    }

    fn available(&self) -> u64 {
        self.ledger.remaining().saturating_sub(self.reserved())
    }
}

/// Gatekeeper for search credits.
///
/// `used <= total_allowed` holds after every operation: reservations are
/// checked against `used + reserved`, and a commit that reports more than the
/// period has left is capped and surfaced as overage.
pub struct QuotaManager {
    config: QuotaConfig,
    state: Arc<Mutex<QuotaState>>,
    store: Option<Arc<dyn ILedgerStore>>,
}

impl QuotaManager {
    pub fn new(config: QuotaConfig, now: DateTime<Utc>) -> Self {
        let (start, end) = period_bounds(now, config.reset_day);
        let ledger = QuotaLedger::new(start, end, config.period_credits);
        let window = RateWindow::new(config.rate_window(), config.rate_window_max_calls);
        Self {
            config,
            state: Arc::new(Mutex::new(QuotaState {
                ledger,
                reservations: HashMap::new(),
                window,
                daily: BTreeMap::new(),
                rate_limited_until: None,
                next_id: 1,
                warned: false,
            })),
            store: None,
        }
    }

    /// Create a manager backed by `store`, resuming the ledger of the period
    /// containing `now` and the recent daily history.
    pub fn with_store(
        config: QuotaConfig,
        store: Arc<dyn ILedgerStore>,
        now: DateTime<Utc>,
    ) -> ScoutResult<Self> {
        let mut manager = Self::new(config, now);
        let since = projection_start(now.date_naive(), manager.config.projection_window_days);
        {
            let mut state = manager.lock();
            if let Some(mut ledger) = store.load_ledger(now)? {
                // The configured budget wins over what the period was opened with.
                ledger.total_allowed = manager.config.period_credits;
                ledger.used = ledger.used.min(ledger.total_allowed);
                state.ledger = ledger;
            }
            state.daily = store.load_daily_usage(since)?.into_iter().collect();
            info!(
                used = state.ledger.used,
                total = state.ledger.total_allowed,
                period_end = %state.ledger.period_end,
                "quota ledger resumed"
            );
        }
        manager.store = Some(store);
        Ok(manager)
    }

    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Advisory check: would `estimated` credits pass both gates right now.
    pub fn can_spend(&self, estimated: u64, now: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        self.roll_period(&mut state, now);
        if Self::blocked_until(&state, now).is_some() {
            return false;
        }
        estimated <= state.available() && state.window.has_capacity(now)
    }

    /// Hold `credits` for one call from `source`. Counts the call against
    /// the rate window immediately.
    pub fn reserve(
        &self,
        credits: u64,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<ReservationToken, QuotaError> {
        let mut state = self.lock();
        self.roll_period(&mut state, now);

        if let Some(retry_at) = Self::blocked_until(&state, now) {
            return Err(QuotaError::RateLimited {
                calls: state.window.count(now),
                limit: state.window.max_calls(),
                retry_at,
            });
        }
        if !state.window.has_capacity(now) {
            return Err(QuotaError::RateLimited {
                calls: state.window.count(now),
                limit: state.window.max_calls(),
                retry_at: state.window.next_slot(now),
            });
        }
        let available = state.available();
        if credits > available {
            return Err(QuotaError::QuotaExceeded {
                requested: credits,
                available,
                total: state.ledger.total_allowed,
            });
        }

        let id = state.next_id;
        state.next_id += 1;
        state.reservations.insert(
            id,
            Reservation {
                credits,
                source: source.to_string(),
                issued_at: now,
            },
        );
        state.window.record(now);
        debug!(id, credits, source, "credits reserved");
        Ok(ReservationToken {
            id,
            credits,
            state: Some(Arc::downgrade(&self.state)),
        })
    }

    /// Settle a reservation with the credits the call actually consumed.
    ///
    /// Only an unknown token is an error. A failed ledger write is logged and
    /// reported through `CommitReceipt::persisted`, since the credits were
    /// spent regardless.
    pub fn commit(
        &self,
        mut token: ReservationToken,
        actual: u64,
        now: DateTime<Utc>,
    ) -> ScoutResult<CommitReceipt> {
        token.disarm();
        let mut state = self.lock();
        self.roll_period(&mut state, now);

        let reservation = state
            .reservations
            .remove(&token.id)
            .ok_or(QuotaError::UnknownReservation { id: token.id })?;

        let applied = actual.min(state.ledger.remaining());
        let overage = actual - applied;
        state.ledger.used += applied;
        *state
            .ledger
            .source_breakdown
            .entry(reservation.source.clone())
            .or_insert(0) += applied;
        let today = now.date_naive();
        *state.daily.entry(today).or_insert(0) += applied;
        self.trim_daily(&mut state, today);

        if overage > 0 {
            warn!(
                reserved = reservation.credits,
                actual,
                applied,
                overage,
                "commit exceeds period budget; capped"
            );
        }
        if !state.warned && state.ledger.percent_used() >= self.config.warning_percent {
            state.warned = true;
            warn!(
                used = state.ledger.used,
                total = state.ledger.total_allowed,
                percent = state.ledger.percent_used(),
                "quota warning threshold crossed"
            );
        }

        let mut persisted = true;
        if let Some(store) = &self.store {
            let written = store.save_ledger(&state.ledger).and_then(|()| {
                if applied > 0 {
                    store.add_daily_usage(today, applied)
                } else {
                    Ok(())
                }
            });
            if let Err(e) = written {
                warn!(error = %e, used = state.ledger.used, "quota ledger not persisted");
                persisted = false;
            }
        }

        Ok(CommitReceipt {
            reserved: reservation.credits,
            applied,
            overage,
            persisted,
        })
    }

    /// Return an uncommitted reservation. The call it stood for never went
    /// out, so it no longer counts against the rate window either.
    pub fn release(&self, mut token: ReservationToken) -> Result<(), QuotaError> {
        token.disarm();
        let mut state = self.lock();
        let reservation = state
            .reservations
            .remove(&token.id)
            .ok_or(QuotaError::UnknownReservation { id: token.id })?;
        state.window.forget(reservation.issued_at);
        debug!(id = token.id, credits = reservation.credits, "reservation released");
        Ok(())
    }

    /// Record a hard rate-limit rejection from the search API.
    ///
    /// Blocks spending until `now + retry_after` (or one window length when
    /// the API gave no hint) and raises `used` to `observed_used` when the
    /// API reports more consumption than the ledger knows about.
    pub fn record_rate_limited(
        &self,
        now: DateTime<Utc>,
        retry_after: Option<std::time::Duration>,
        observed_used: Option<u64>,
    ) -> ScoutResult<()> {
        let mut state = self.lock();
        self.roll_period(&mut state, now);

        let backoff = retry_after
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .unwrap_or_else(|| state.window.length());
        let until = now + backoff;
        state.rate_limited_until = Some(state.rate_limited_until.map_or(until, |u| u.max(until)));

        let mut reconciled = false;
        if let Some(observed) = observed_used {
            let observed = observed.min(state.ledger.total_allowed);
            if observed > state.ledger.used {
                let delta = observed - state.ledger.used;
                state.ledger.used = observed;
                *state.ledger.source_breakdown.entry(SOURCE_RECONCILED.to_string()).or_insert(0) += delta;
                *state.daily.entry(now.date_naive()).or_insert(0) += delta;
                reconciled = true;
            }
        }

        warn!(
            retry_at = %until,
            used = state.ledger.used,
            reconciled,
            "search API rate limit recorded"
        );

        if reconciled {
            if let Some(store) = &self.store {
                store.save_ledger(&state.ledger)?;
            }
        }
        Ok(())
    }

    /// Usage snapshot including the advisory exhaustion projection.
    pub fn current_usage(&self, now: DateTime<Utc>) -> QuotaUsage {
        let mut state = self.lock();
        self.roll_period(&mut state, now);

        let remaining = state.ledger.remaining();
        let daily: Vec<(NaiveDate, u64)> = state.daily.iter().map(|(d, c)| (*d, *c)).collect();
        QuotaUsage {
            used: state.ledger.used,
            reserved: state.reserved(),
            total: state.ledger.total_allowed,
            remaining,
            percent: state.ledger.percent_used(),
            period_end: state.ledger.period_end,
            projected_exhaustion_date: projected_exhaustion(
                remaining,
                &daily,
                now.date_naive(),
                self.config.projection_window_days,
            ),
        }
    }

    /// Credits that can still be reserved at `now`.
    pub fn available(&self, now: DateTime<Utc>) -> u64 {
        let mut state = self.lock();
        self.roll_period(&mut state, now);
        state.available()
    }

    /// Copy of the current period's ledger.
    pub fn ledger(&self, now: DateTime<Utc>) -> QuotaLedger {
        let mut state = self.lock();
        self.roll_period(&mut state, now);
        state.ledger.clone()
    }

    /// Until when a recorded API rate limit blocks spending.
    pub fn rate_limited_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Self::blocked_until(&self.lock(), now)
    }

    pub fn open_reservations(&self) -> usize {
        self.lock().reservations.len()
    }

    fn lock(&self) -> MutexGuard<'_, QuotaState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn blocked_until(state: &QuotaState, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        state.rate_limited_until.filter(|until| *until > now)
    }

    /// Open a fresh ledger once `now` passes the current period end.
    fn roll_period(&self, state: &mut QuotaState, now: DateTime<Utc>) {
        if now < state.ledger.period_end {
            return;
        }
        let (start, end) = period_bounds(now, self.config.reset_day);
        info!(
            previous_used = state.ledger.used,
            previous_total = state.ledger.total_allowed,
            period_start = %start,
            period_end = %end,
            "quota period rolled over"
        );
        state.ledger = QuotaLedger::new(start, end, self.config.period_credits);
        state.warned = false;
    }

    fn trim_daily(&self, state: &mut QuotaState, today: NaiveDate) {
        let since = projection_start(today, self.config.projection_window_days);
        state.daily.retain(|day, _| *day >= since);
    }
}

fn projection_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(window_days.max(1)) - 1))
        .unwrap_or(today)
}
