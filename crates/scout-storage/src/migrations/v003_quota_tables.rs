//! v003: quota ledger per period and daily consumption history.

use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS quota_periods (
            period_start      TEXT PRIMARY KEY,
            period_end        TEXT NOT NULL,
            total_allowed     INTEGER NOT NULL,
            used              INTEGER NOT NULL DEFAULT 0,
            source_breakdown  TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS quota_daily_usage (
            day      TEXT PRIMARY KEY,
            credits  INTEGER NOT NULL DEFAULT 0
        );
        ",
    )
}
