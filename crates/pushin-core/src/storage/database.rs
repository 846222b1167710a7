//! SQLite storage.
//!
//! Provides persistent storage for:
//! - The active unlock session (at most one row)
//! - Key-value store for front-end state (saved controller, tracker)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use crate::access::{UnlockSession, UnlockSessionStore};
use crate::error::StoreError;
use crate::workout::WorkoutKind;

/// SQLite database at `<data_dir>/pushin.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database in the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::open_at(&dir.join("pushin.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS unlock_session (
                id            TEXT PRIMARY KEY,
                started_at    TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                earned_by     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn write_session(&self, session: &UnlockSession) -> Result<(), StoreError> {
        let duration_secs =
            i64::try_from(session.duration_secs).map_err(|_| StoreError::OutOfRange {
                field: "duration_secs",
                value: session.duration_secs,
            })?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM unlock_session", [])?;
        tx.execute(
            "INSERT INTO unlock_session (id, started_at, duration_secs, earned_by)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id.to_string(),
                session.started_at.to_rfc3339(),
                duration_secs,
                session.earned_by.as_str(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn read_session(&self) -> Result<Option<UnlockSession>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, started_at, duration_secs, earned_by FROM unlock_session LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, started_at, duration_secs, earned_by)) = row else {
            return Ok(None);
        };
        let corrupt = |message: String| StoreError::Corrupt {
            key: "unlock_session".to_string(),
            message,
        };

        Ok(Some(UnlockSession {
            id: Uuid::parse_str(&id).map_err(|e| corrupt(e.to_string()))?,
            started_at: DateTime::parse_from_rfc3339(&started_at)
                .map_err(|e| corrupt(e.to_string()))?
                .with_timezone(&Utc),
            duration_secs: u64::try_from(duration_secs)
                .map_err(|_| corrupt(format!("negative duration {duration_secs}")))?,
            earned_by: earned_by
                .parse::<WorkoutKind>()
                .map_err(|e| corrupt(e.to_string()))?,
        }))
    }

    fn delete_session(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM unlock_session", [])?;
        Ok(())
    }
}

/// [`UnlockSessionStore`] backed by the `unlock_session` table.
pub struct SqliteSessionStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteSessionStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl UnlockSessionStore for SqliteSessionStore<'_> {
    fn create(&mut self, session: &UnlockSession) -> Result<(), StoreError> {
        self.db.write_session(session)
    }

    fn current(&self) -> Result<Option<UnlockSession>, StoreError> {
        self.db.read_session()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.db.delete_session()
    }
}
