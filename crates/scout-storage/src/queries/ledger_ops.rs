//! Quota ledger per period and daily consumption.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use scout_core::errors::{ScoutResult, StorageError};
use scout_core::models::QuotaLedger;

use super::{fmt_ts, parse_ts, to_u64};
use crate::{corruption, to_storage_err};

const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn save_ledger(conn: &Connection, ledger: &QuotaLedger) -> ScoutResult<()> {
    let breakdown = serde_json::to_string(&ledger.source_breakdown)?;
    conn.execute(
        "INSERT INTO quota_periods (period_start, period_end, total_allowed, used, source_breakdown)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(period_start) DO UPDATE SET
            period_end = excluded.period_end,
            total_allowed = excluded.total_allowed,
            used = excluded.used,
            source_breakdown = excluded.source_breakdown",
        params![
            fmt_ts(ledger.period_start),
            fmt_ts(ledger.period_end),
            clamp_i64(ledger.total_allowed),
            clamp_i64(ledger.used),
            breakdown,
        ],
    )
    .map_err(|e| to_storage_err(format!("save ledger: {e}")))?;
    Ok(())
}

/// The ledger whose period contains `at`. A corrupt row is logged and
/// treated as absent.
pub fn load_ledger(conn: &Connection, at: DateTime<Utc>) -> ScoutResult<Option<QuotaLedger>> {
    let key = fmt_ts(at);
    let decoded = conn
        .query_row(
            "SELECT period_start, period_end, total_allowed, used, source_breakdown
             FROM quota_periods
             WHERE period_start <= ?1 AND period_end > ?1
             ORDER BY period_start DESC LIMIT 1",
            params![key],
            |row| Ok(decode(row)),
        )
        .optional()
        .map_err(|e| to_storage_err(format!("load ledger: {e}")))?;

    match decoded {
        Some(Ok(ledger)) => Ok(Some(ledger)),
        Some(Err(e)) => {
            warn!(error = %e, "skipping corrupt quota ledger");
            Ok(None)
        }
        None => Ok(None),
    }
}

pub fn add_daily_usage(conn: &Connection, day: NaiveDate, credits: u64) -> ScoutResult<()> {
    conn.execute(
        "INSERT INTO quota_daily_usage (day, credits) VALUES (?1, ?2)
         ON CONFLICT(day) DO UPDATE SET credits = credits + excluded.credits",
        params![day.format(DAY_FORMAT).to_string(), clamp_i64(credits)],
    )
    .map_err(|e| to_storage_err(format!("add daily usage: {e}")))?;
    Ok(())
}

pub fn load_daily_usage(conn: &Connection, since: NaiveDate) -> ScoutResult<Vec<(NaiveDate, u64)>> {
    let mut stmt = conn
        .prepare("SELECT day, credits FROM quota_daily_usage WHERE day >= ?1 ORDER BY day")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![since.format(DAY_FORMAT).to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut usage = Vec::new();
    for row in rows {
        let (raw_day, credits) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let parsed = NaiveDate::parse_from_str(&raw_day, DAY_FORMAT)
            .map_err(|e| e.to_string())
            .and_then(|day| to_u64(credits, "credits").map(|c| (day, c)));
        match parsed {
            Ok(entry) => usage.push(entry),
            Err(details) => {
                let e = corruption("quota_daily_usage", &raw_day, details);
                warn!(error = %e, "skipping corrupt daily usage row");
            }
        }
    }
    Ok(usage)
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn decode(row: &Row<'_>) -> Result<QuotaLedger, StorageError> {
    let start: String = row
        .get(0)
        .map_err(|e| corruption("quota_periods", "?", e.to_string()))?;
    let bad = |details: String| corruption("quota_periods", &start, details);

    let end: String = row.get(1).map_err(|e| bad(e.to_string()))?;
    let total: i64 = row.get(2).map_err(|e| bad(e.to_string()))?;
    let used: i64 = row.get(3).map_err(|e| bad(e.to_string()))?;
    let raw_breakdown: String = row.get(4).map_err(|e| bad(e.to_string()))?;
    let source_breakdown: BTreeMap<String, u64> =
        serde_json::from_str(&raw_breakdown).map_err(|e| bad(format!("source_breakdown: {e}")))?;

    Ok(QuotaLedger {
        period_start: parse_ts(&start).map_err(bad)?,
        period_end: parse_ts(&end).map_err(bad)?,
        total_allowed: to_u64(total, "total_allowed").map_err(bad)?,
        used: to_u64(used, "used").map_err(bad)?,
        source_breakdown,
    })
}
