//! Keyword weight rows.

use rusqlite::{params, CachedStatement, Connection, Row};
use tracing::warn;

use scout_core::constants::MAX_BULK_BATCH_SIZE;
use scout_core::errors::{ScoutResult, StorageError};
use scout_core::models::{KeywordRecord, Weight};
use scout_core::traits::LoadOutcome;

use super::{fmt_ts, parse_ts, to_u64};
use crate::{corruption, to_storage_err};

const UPSERT: &str = "
    INSERT INTO keywords (keyword, weight, last_used_at, last_weight_update_at, feedback_count)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(keyword) DO UPDATE SET
        weight = excluded.weight,
        last_used_at = excluded.last_used_at,
        last_weight_update_at = excluded.last_weight_update_at,
        feedback_count = excluded.feedback_count";

pub fn upsert_keyword(conn: &Connection, record: &KeywordRecord) -> ScoutResult<()> {
    let mut stmt = conn
        .prepare_cached(UPSERT)
        .map_err(|e| to_storage_err(e.to_string()))?;
    write(&mut stmt, record)
}

/// Upsert in transactions of at most `MAX_BULK_BATCH_SIZE` rows.
pub fn upsert_keywords(conn: &Connection, records: &[KeywordRecord]) -> ScoutResult<usize> {
    let mut written = 0;
    for chunk in records.chunks(MAX_BULK_BATCH_SIZE) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(format!("upsert_keywords begin: {e}")))?;
        {
            let mut stmt = tx
                .prepare_cached(UPSERT)
                .map_err(|e| to_storage_err(e.to_string()))?;
            for record in chunk {
                write(&mut stmt, record)?;
                written += 1;
            }
        }
        tx.commit()
            .map_err(|e| to_storage_err(format!("upsert_keywords commit: {e}")))?;
    }
    Ok(written)
}

/// Load every keyword, skipping rows that fail to decode.
pub fn load_keywords(conn: &Connection) -> ScoutResult<LoadOutcome<KeywordRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT keyword, weight, last_used_at, last_weight_update_at, feedback_count
             FROM keywords ORDER BY keyword",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok(decode(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut outcome = LoadOutcome::default();
    for row in rows {
        match row.map_err(|e| to_storage_err(e.to_string()))? {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                warn!(error = %e, "skipping corrupt keyword row");
                outcome.skipped += 1;
            }
        }
    }
    Ok(outcome)
}

fn write(stmt: &mut CachedStatement<'_>, record: &KeywordRecord) -> ScoutResult<()> {
    stmt.execute(params![
        record.keyword,
        record.weight.value(),
        record.last_used_at.map(fmt_ts),
        fmt_ts(record.last_weight_update_at),
        i64::try_from(record.feedback_count).unwrap_or(i64::MAX),
    ])
    .map_err(|e| to_storage_err(format!("upsert keyword '{}': {e}", record.keyword)))?;
    Ok(())
}

fn decode(row: &Row<'_>) -> Result<KeywordRecord, StorageError> {
    let keyword: String = row
        .get(0)
        .map_err(|e| corruption("keywords", "?", e.to_string()))?;
    let bad = |details: String| corruption("keywords", &keyword, details);

    let weight: f64 = row.get(1).map_err(|e| bad(e.to_string()))?;
    if !weight.is_finite() {
        return Err(bad(format!("non-finite weight {weight}")));
    }
    let last_used_at: Option<String> = row.get(2).map_err(|e| bad(e.to_string()))?;
    let last_update: String = row.get(3).map_err(|e| bad(e.to_string()))?;
    let feedback_count: i64 = row.get(4).map_err(|e| bad(e.to_string()))?;

    Ok(KeywordRecord {
        weight: Weight::new(weight),
        last_used_at: last_used_at.as_deref().map(parse_ts).transpose().map_err(bad)?,
        last_weight_update_at: parse_ts(&last_update).map_err(bad)?,
        feedback_count: to_u64(feedback_count, "feedback_count").map_err(bad)?,
        keyword: keyword.clone(),
    })
}
