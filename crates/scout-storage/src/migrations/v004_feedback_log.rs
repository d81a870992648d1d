//! v004: consumed feedback events, for exactly-once processing across restarts.

use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS feedback_log (
            event_id     TEXT PRIMARY KEY,
            outcome      TEXT NOT NULL,
            keywords     TEXT NOT NULL,
            occurred_at  TEXT NOT NULL,
            applied_at   TEXT NOT NULL
        );
        ",
    )
}
