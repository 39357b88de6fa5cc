//! SQLite-backed settings table
//!
//! One `settings(key, value, updated_at)` table, created on open. There is no
//! schema versioning: the table is the whole schema.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::Result;

const CREATE_SETTINGS: &str = "CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Shared handle to the settings database; clones use the same connection
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file, creating missing parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        // WAL keeps the shell responsive while a write is in flight
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        let db = Self::from_connection(conn)?;
        tracing::info!(path = %path.display(), "Opened settings database");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(CREATE_SETTINGS, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .lock()
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or overwrite `key`
    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.lock().execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Number of stored keys
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("snack-storage-{}-{}", name, std::process::id()))
            .join("nested")
            .join("shell.db")
    }

    #[test]
    fn test_open_in_memory_starts_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.is_empty().unwrap());
        assert_eq!(db.get_setting("lastSnackURL").unwrap(), None);
    }

    #[test]
    fn test_settings_overwrite() {
        let db = Database::open_in_memory().unwrap();

        db.set_setting("lastSnackURL", "https://expo.dev/a").unwrap();
        db.set_setting("lastSnackURL", "https://expo.dev/b").unwrap();

        assert_eq!(
            db.get_setting("lastSnackURL").unwrap().as_deref(),
            Some("https://expo.dev/b")
        );
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn test_clones_share_the_connection() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();

        other.set_setting("k", "v").unwrap();
        assert_eq!(db.get_setting("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let path = temp_db_path("parent");

        {
            let db = Database::open(&path).unwrap();
            db.set_setting("k", "v").unwrap();
        }

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.get_setting("k").unwrap().as_deref(), Some("v"));

        drop(reopened);
        let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn test_schema_has_only_the_settings_table() {
        let path = temp_db_path("schema");
        drop(Database::open(&path).unwrap());
        // Reopening an existing file must not fail on the existing table
        drop(Database::open(&path).unwrap());

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(tables, vec!["settings".to_string()]);

        drop(stmt);
        drop(conn);
        let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }
}
