//! v002: cached items, their keyword associations, and the per-keyword search log.

use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cached_items (
            item_id       TEXT PRIMARY KEY,
            text          TEXT NOT NULL DEFAULT '',
            payload       TEXT NOT NULL,
            payload_hash  TEXT NOT NULL,
            fetched_at    TEXT NOT NULL,
            expires_at    TEXT NOT NULL,
            purge_after   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cached_items_purge ON cached_items(purge_after);

        CREATE TABLE IF NOT EXISTS item_keywords (
            item_id  TEXT NOT NULL,
            keyword  TEXT NOT NULL,
            PRIMARY KEY (item_id, keyword),
            FOREIGN KEY (item_id) REFERENCES cached_items(item_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_item_keywords_keyword ON item_keywords(keyword);

        CREATE TABLE IF NOT EXISTS search_log (
            keyword      TEXT PRIMARY KEY,
            searched_at  TEXT NOT NULL
        );
        ",
    )
}
