//! SQLite handle for the shop catalog.
//!
//! The catalog lives in `barista.db` under the data directory. It is written
//! by seeding and by whoever maintains the shop's data, and read on every
//! chat turn, so the file runs in WAL mode with a busy timeout.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use tracing::info;

use barista_core::error::BaristaError;

use crate::migrations;

/// File name of the catalog inside the data directory.
pub const DB_FILE_NAME: &str = "barista.db";

/// How long a statement waits on a lock held by another writer.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn storage_err(what: &'static str) -> impl Fn(rusqlite::Error) -> BaristaError {
    move |e| BaristaError::Storage(format!("{}: {}", what, e))
}

/// The catalog database: one connection behind a mutex.
pub struct Database {
    conn: Mutex<Connection>,
    location: String,
}

impl Database {
    /// Open (or create) the catalog in `data_dir`, creating the directory.
    pub fn open_in(data_dir: &Path) -> Result<Self, BaristaError> {
        std::fs::create_dir_all(data_dir)?;
        Self::open(&data_dir.join(DB_FILE_NAME))
    }

    /// Open (or create) a catalog file at `path` and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self, BaristaError> {
        let conn = Connection::open(path).map_err(storage_err("Failed to open catalog"))?;
        Self::init(conn, path.display().to_string())
    }

    /// A private in-memory catalog. Used by tests and demos.
    pub fn in_memory() -> Result<Self, BaristaError> {
        let conn = Connection::open_in_memory()
            .map_err(storage_err("Failed to open in-memory catalog"))?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(conn: Connection, location: String) -> Result<Self, BaristaError> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(storage_err("Failed to set busy timeout"))?;
        // In-memory databases answer "memory" here.
        let journal: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(storage_err("Failed to set journal mode"))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(storage_err("Failed to set synchronous"))?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(storage_err("Failed to enable foreign keys"))?;

        migrations::run_migrations(&conn)?;
        info!(location = %location, journal = %journal, "Catalog database ready");

        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }

    /// File path of the catalog, or `:memory:`.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run `f` with the connection locked.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, BaristaError>
    where
        F: FnOnce(&Connection) -> Result<T, BaristaError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BaristaError::Storage(format!("Catalog lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.location)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(|e| BaristaError::Storage(e.to_string()))
        })
        .unwrap()
    }

    #[test]
    fn test_in_memory_database_has_schema() {
        let db = Database::in_memory().unwrap();
        assert_eq!(count(&db, "menu_items"), 0);
        assert_eq!(count(&db, "art_items"), 0);
        assert_eq!(count(&db, "workshops"), 0);
        assert_eq!(count(&db, "knowledge_entries"), 0);
    }

    #[test]
    fn test_open_in_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let db = Database::open_in(&data_dir).unwrap();

        assert_eq!(count(&db, "menu_items"), 0);
        assert!(data_dir.join(DB_FILE_NAME).exists());
        assert!(db.location().ends_with(DB_FILE_NAME));
    }

    #[test]
    fn test_in_memory_location() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.location(), ":memory:");
        assert!(format!("{:?}", db).contains(":memory:"));
    }

    #[test]
    fn test_foreign_keys_and_busy_timeout_set() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in(dir.path()).unwrap();
        db.with_conn(|conn| {
            let fk: i64 = conn
                .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                .map_err(|e| BaristaError::Storage(e.to_string()))?;
            let timeout: i64 = conn
                .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
                .map_err(|e| BaristaError::Storage(e.to_string()))?;
            assert_eq!(fk, 1);
            assert_eq!(timeout, 5000);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_reopen_file_database_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barista.db");
        {
            let db = Database::open(&path).unwrap();
            db.with_conn(|conn| {
                conn.execute(
                    "INSERT INTO art_items (title, artist, price, available)
                     VALUES ('Dawn', 'R. Mendes', 120.0, 1)",
                    [],
                )
                .map_err(|e| BaristaError::Storage(e.to_string()))?;
                Ok(())
            })
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(count(&db, "art_items"), 1);
    }

    #[test]
    fn test_wal_mode_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("wal.db")).unwrap();
        db.with_conn(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .map_err(|e| BaristaError::Storage(e.to_string()))?;
            assert_eq!(mode, "wal");
            Ok(())
        })
        .unwrap();
    }
}
