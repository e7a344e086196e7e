//! Database schema migrations.
//!
//! Applies the catalog schema (menu items, art, workshops) and the canned
//! knowledge base with its FTS5 index.

use rusqlite::Connection;
use tracing::info;

use barista_core::error::BaristaError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), BaristaError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| BaristaError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| BaristaError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: catalog_schema");
    }

    Ok(())
}

/// Version 1: catalog and knowledge base.
fn apply_v1(conn: &Connection) -> Result<(), BaristaError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS menu_items (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            category        TEXT NOT NULL,
            price           REAL NOT NULL CHECK (price >= 0),
            caffeine_level  TEXT NOT NULL DEFAULT 'none'
                            CHECK (caffeine_level IN
                                ('none', 'low', 'medium', 'high', 'very_high', 'extreme')),
            -- JSON array of lowercase tags, display order preserved.
            tags            TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_menu_items_price
            ON menu_items (price);

        CREATE INDEX IF NOT EXISTS idx_menu_items_caffeine
            ON menu_items (caffeine_level);

        CREATE TABLE IF NOT EXISTS art_items (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            artist      TEXT NOT NULL,
            price       REAL NOT NULL CHECK (price >= 0),
            available   INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS workshops (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            starts_at   TEXT NOT NULL,
            seats       INTEGER NOT NULL CHECK (seats >= 0),
            booked      INTEGER NOT NULL DEFAULT 0 CHECK (booked >= 0),
            price       REAL NOT NULL CHECK (price >= 0)
        );

        CREATE INDEX IF NOT EXISTS idx_workshops_starts_at
            ON workshops (starts_at ASC);

        CREATE TABLE IF NOT EXISTS knowledge_entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            question    TEXT NOT NULL,
            answer      TEXT NOT NULL
        );

        -- External-content index; populated by an explicit rebuild.
        CREATE VIRTUAL TABLE IF NOT EXISTS knowledge_fts USING fts5(
            question,
            answer,
            content = 'knowledge_entries',
            content_rowid = 'id',
            tokenize = 'porter unicode61'
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'catalog_schema');
        ",
    )
    .map_err(|e| BaristaError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}
