//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the KeyValueStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{IndexResult, KeyValueStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite index store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the index database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(IndexError)` - Failed to open database
    pub fn new(path: &Path) -> IndexResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of URLs in the index
    pub fn len(&self) -> IndexResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM url_last_update", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> IndexResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> IndexResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT updated_at FROM url_last_update WHERE url = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> IndexResult<()> {
        self.conn.execute(
            "INSERT INTO url_last_update (url, updated_at) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_many(&self, keys: &[String]) -> IndexResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare_cached("SELECT updated_at FROM url_last_update WHERE url = ?1")?;

        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(stmt.query_row(params![key], |row| row.get(0)).optional()?);
        }
        Ok(values)
    }

    fn set_many(&mut self, entries: &[(String, String)]) -> IndexResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO url_last_update (url, updated_at) VALUES (?1, ?2)
                 ON CONFLICT(url) DO UPDATE SET updated_at = excluded.updated_at",
            )?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
