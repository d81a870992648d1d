//! v001: keyword weights.

use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS keywords (
            keyword                TEXT PRIMARY KEY,
            weight                 REAL NOT NULL,
            last_used_at           TEXT,
            last_weight_update_at  TEXT NOT NULL,
            feedback_count         INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_keywords_weight ON keywords(weight);
        ",
    )
}
