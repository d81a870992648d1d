//! Numbered schema migrations, applied in order and recorded in `schema_version`.

mod v001_keywords;
mod v002_cache_tables;
mod v003_quota_tables;
mod v004_feedback_log;

use rusqlite::{params, Connection};
use tracing::info;

use scout_core::errors::{ScoutResult, StorageError};

type Migration = fn(&Connection) -> rusqlite::Result<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_keywords::migrate),
    (2, v002_cache_tables::migrate),
    (3, v003_quota_tables::migrate),
    (4, v004_feedback_log::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 4;

/// Apply every migration newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> ScoutResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| StorageError::MigrationFailed {
        version: 0,
        reason: e.to_string(),
    })?;

    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        let fail = |e: rusqlite::Error| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        };
        let tx = conn.unchecked_transaction().map_err(fail)?;
        migrate(&tx).map_err(fail)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", params![version])
            .map_err(fail)?;
        tx.commit().map_err(fail)?;
        info!(version, "migration applied");
    }
    Ok(LATEST_VERSION.max(current))
}

/// Highest applied migration, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> ScoutResult<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .map_err(|e| StorageError::MigrationFailed {
            version: 0,
            reason: e.to_string(),
        })?;
    Ok(version.unwrap_or(0))
}
