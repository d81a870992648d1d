//! Consumed feedback events.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use scout_core::errors::ScoutResult;
use scout_core::models::FeedbackEvent;

use super::fmt_ts;
use crate::to_storage_err;

/// Record an event. Returns false when the id was already present.
pub fn record_feedback(
    conn: &Connection,
    event: &FeedbackEvent,
    applied_at: DateTime<Utc>,
) -> ScoutResult<bool> {
    let keywords = serde_json::to_string(&event.keywords)?;
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO feedback_log (event_id, outcome, keywords, occurred_at, applied_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id.to_string(),
                event.outcome.as_str(),
                keywords,
                fmt_ts(event.occurred_at),
                fmt_ts(applied_at),
            ],
        )
        .map_err(|e| to_storage_err(format!("record feedback {}: {e}", event.id)))?;
    Ok(inserted == 1)
}

pub fn is_recorded(conn: &Connection, id: &Uuid) -> ScoutResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM feedback_log WHERE event_id = ?1)",
        params![id.to_string()],
        |row| row.get::<_, bool>(0),
    )
    .map_err(|e| to_storage_err(format!("lookup feedback {id}: {e}")))
}

pub fn count(conn: &Connection) -> ScoutResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM feedback_log", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(usize::try_from(n).unwrap_or(0))
}
