//! SQLite-backed key-value store.
//!
//! One `kv` table holds every persisted entry (preferences, exchange rates,
//! records, the serialized timer engine).

use std::path::Path;

use rusqlite::{params, Connection};

use super::{data_dir, KvStore};
use crate::error::{PersistenceError, Result};

/// SQLite database holding the key-value table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/salaryflow/salaryflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("salaryflow.db"))
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| PersistenceError::OpenFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if SQLite cannot create the schema.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| PersistenceError::OpenFailed {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.migrate().map_err(|e| PersistenceError::OpenFailed {
            path: "kv".to_string(),
            message: e.to_string(),
        })?;
        Ok(db)
    }

    /// Make every insert of `key` abort, to exercise rollback paths.
    #[cfg(test)]
    pub(crate) fn reject_writes_to(&self, key: &str) {
        self.conn
            .execute_batch(&format!(
                "CREATE TRIGGER reject_{key} BEFORE INSERT ON kv WHEN NEW.key = '{key}'
                 BEGIN SELECT RAISE(ABORT, 'write rejected'); END;"
            ))
            .unwrap();
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

fn classify(key: &str, err: rusqlite::Error, write: bool) -> PersistenceError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.code == rusqlite::ErrorCode::DatabaseBusy
            || failure.code == rusqlite::ErrorCode::DatabaseLocked
        {
            return PersistenceError::Locked;
        }
    }
    if write {
        PersistenceError::write(key, err)
    } else {
        PersistenceError::read(key, err)
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let result = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            });
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(classify(key, e, false)),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| classify(key, e, true))?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| classify(key, e, true))?;
        Ok(())
    }

    fn put_many(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        let batch = entries.first().map_or("", |(key, _)| *key);
        // Dropping the transaction without commit rolls every insert back.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| classify(batch, e, true))?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| classify(key, e, true))?;
        }
        tx.commit().map_err(|e| classify(batch, e, true))?;
        Ok(())
    }
}
