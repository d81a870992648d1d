//! Cached items, keyword associations and the search log.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::warn;

use scout_core::constants::MAX_BULK_BATCH_SIZE;
use scout_core::errors::{ScoutResult, StorageError};
use scout_core::models::item::hash_payload;
use scout_core::models::CachedItem;
use scout_core::traits::LoadOutcome;

use super::{fmt_ts, parse_ts};
use crate::{corruption, to_storage_err};

/// Insert or merge an item. The payload of an existing row is kept; its
/// lifetimes are replaced and keyword associations are added.
pub fn upsert_item(conn: &Connection, item: &CachedItem) -> ScoutResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("upsert_item begin: {e}")))?;

    tx.execute(
        "INSERT INTO cached_items
            (item_id, text, payload, payload_hash, fetched_at, expires_at, purge_after)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(item_id) DO UPDATE SET
            expires_at = excluded.expires_at,
            purge_after = excluded.purge_after",
        params![
            item.id,
            item.text,
            item.payload.to_string(),
            item.payload_hash,
            fmt_ts(item.fetched_at),
            fmt_ts(item.expires_at),
            fmt_ts(item.purge_after),
        ],
    )
    .map_err(|e| to_storage_err(format!("upsert item '{}': {e}", item.id)))?;

    {
        let mut stmt = tx
            .prepare_cached("INSERT OR IGNORE INTO item_keywords (item_id, keyword) VALUES (?1, ?2)")
            .map_err(|e| to_storage_err(e.to_string()))?;
        for keyword in &item.keywords {
            stmt.execute(params![item.id, keyword])
                .map_err(|e| to_storage_err(format!("link item '{}': {e}", item.id)))?;
        }
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("upsert_item commit: {e}")))?;
    Ok(())
}

/// Load every item with its keywords, skipping rows that fail to decode
/// or whose payload no longer matches its hash.
pub fn load_items(conn: &Connection) -> ScoutResult<LoadOutcome<CachedItem>> {
    let mut keywords: HashMap<String, BTreeSet<String>> = HashMap::new();
    {
        let mut stmt = conn
            .prepare("SELECT item_id, keyword FROM item_keywords")
            .map_err(|e| to_storage_err(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| to_storage_err(e.to_string()))?;
        for row in rows {
            let (id, keyword) = row.map_err(|e| to_storage_err(e.to_string()))?;
            keywords.entry(id).or_default().insert(keyword);
        }
    }

    let mut stmt = conn
        .prepare(
            "SELECT item_id, text, payload, payload_hash, fetched_at, expires_at, purge_after
             FROM cached_items ORDER BY fetched_at",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok(decode(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut outcome = LoadOutcome::default();
    for row in rows {
        match row.map_err(|e| to_storage_err(e.to_string()))? {
            Ok(mut item) => {
                item.keywords = keywords.remove(&item.id).unwrap_or_default();
                outcome.records.push(item);
            }
            Err(e) => {
                warn!(error = %e, "skipping corrupt cached item");
                outcome.skipped += 1;
            }
        }
    }
    Ok(outcome)
}

/// Delete items and their keyword links. Returns the number of items removed.
pub fn delete_items(conn: &Connection, ids: &[String]) -> ScoutResult<usize> {
    let mut deleted = 0;
    for chunk in ids.chunks(MAX_BULK_BATCH_SIZE) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(format!("delete_items begin: {e}")))?;
        {
            let mut unlink = tx
                .prepare_cached("DELETE FROM item_keywords WHERE item_id = ?1")
                .map_err(|e| to_storage_err(e.to_string()))?;
            let mut remove = tx
                .prepare_cached("DELETE FROM cached_items WHERE item_id = ?1")
                .map_err(|e| to_storage_err(e.to_string()))?;
            for id in chunk {
                unlink
                    .execute(params![id])
                    .map_err(|e| to_storage_err(e.to_string()))?;
                deleted += remove
                    .execute(params![id])
                    .map_err(|e| to_storage_err(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| to_storage_err(format!("delete_items commit: {e}")))?;
    }
    Ok(deleted)
}

/// Record a search, keeping the later timestamp on conflict.
pub fn record_search(conn: &Connection, keyword: &str, at: DateTime<Utc>) -> ScoutResult<()> {
    conn.execute(
        "INSERT INTO search_log (keyword, searched_at) VALUES (?1, ?2)
         ON CONFLICT(keyword) DO UPDATE SET
            searched_at = MAX(searched_at, excluded.searched_at)",
        params![keyword, fmt_ts(at)],
    )
    .map_err(|e| to_storage_err(format!("record search '{keyword}': {e}")))?;
    Ok(())
}

/// Stored timestamps are fixed-width UTC, so text order is time order.
pub fn prune_search_log(conn: &Connection, before: DateTime<Utc>) -> ScoutResult<usize> {
    conn.execute(
        "DELETE FROM search_log WHERE searched_at < ?1",
        params![fmt_ts(before)],
    )
    .map_err(|e| to_storage_err(format!("prune search log: {e}")))
}

/// Load the search log, skipping entries with unreadable timestamps.
pub fn load_search_log(conn: &Connection) -> ScoutResult<Vec<(String, DateTime<Utc>)>> {
    let mut stmt = conn
        .prepare("SELECT keyword, searched_at FROM search_log ORDER BY keyword")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut log = Vec::new();
    for row in rows {
        let (keyword, raw) = row.map_err(|e| to_storage_err(e.to_string()))?;
        match parse_ts(&raw) {
            Ok(at) => log.push((keyword, at)),
            Err(details) => {
                let e = corruption("search_log", &keyword, details);
                warn!(error = %e, "skipping corrupt search log entry");
            }
        }
    }
    Ok(log)
}

fn decode(row: &Row<'_>) -> Result<CachedItem, StorageError> {
    let id: String = row
        .get(0)
        .map_err(|e| corruption("cached_items", "?", e.to_string()))?;
    let bad = |details: String| corruption("cached_items", &id, details);

    let text: String = row.get(1).map_err(|e| bad(e.to_string()))?;
    let raw_payload: String = row.get(2).map_err(|e| bad(e.to_string()))?;
    let payload_hash: String = row.get(3).map_err(|e| bad(e.to_string()))?;
    let fetched_at: String = row.get(4).map_err(|e| bad(e.to_string()))?;
    let expires_at: String = row.get(5).map_err(|e| bad(e.to_string()))?;
    let purge_after: String = row.get(6).map_err(|e| bad(e.to_string()))?;

    let payload: serde_json::Value =
        serde_json::from_str(&raw_payload).map_err(|e| bad(format!("payload: {e}")))?;
    if hash_payload(&payload) != payload_hash {
        return Err(bad("payload hash mismatch".to_string()));
    }

    Ok(CachedItem {
        text,
        payload,
        payload_hash,
        keywords: BTreeSet::new(),
        fetched_at: parse_ts(&fetched_at).map_err(bad)?,
        expires_at: parse_ts(&expires_at).map_err(bad)?,
        purge_after: parse_ts(&purge_after).map_err(bad)?,
        id: id.clone(),
    })
}
