//! Database module for channel information storage.
//!
//! This module provides SQLite-based persistent storage for:
//! - Channel rows, keyed by row id and matched by natural key
//! - Logo slots, one per channel row

mod channel;
mod logo;
mod models;
mod schema;

pub use models::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database error types.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Channel not found: id={0}")]
    ChannelNotFound(i64),

    #[error("Database path error: {0}")]
    PathError(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Main database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::PathError(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(())
    }

    /// Get the underlying connection (for advanced queries).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.connection().is_autocommit());
    }

    #[test]
    fn test_schema_creation() {
        let db = Database::open_in_memory().unwrap();

        let count: i32 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('channels', 'channel_logos')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("channels.db");
        let db = Database::open(&path).unwrap();
        drop(db);
        assert!(path.exists());

        // Reopen against an existing schema
        Database::open(&path).unwrap();
    }

    #[test]
    fn test_reopen_keeps_rows_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channels.db");

        let mut ch = livechannel_types::Channel::new(1, 2, 3).with_logo("http://x/y.png");
        ch.input_id = Some("input".to_string());
        ch.version_number = 3;
        ch.transient = true;
        let id = Database::open(&path).unwrap().insert_channel(&ch).unwrap();

        let db = Database::open(&path).unwrap();
        let columns: Vec<String> = db
            .connection()
            .prepare("PRAGMA table_info(channels)")
            .unwrap()
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        for column in ["channel_logo", "version_number", "transient"] {
            assert!(columns.iter().any(|c| c == column), "missing column {}", column);
        }

        let stored = db.get_channel(id).unwrap().unwrap();
        assert_eq!(stored.version_number, 3);
        assert!(stored.transient);
        assert_eq!(stored.logo_source(), Some("http://x/y.png"));
    }
}
