//! Storage traits and error types
//!
//! This module defines the key-value interface the incremental index is
//! persisted through, and the errors its backends can raise.

use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid timestamp stored for {url}: '{value}'")]
    Timestamp { url: String, value: String },

    #[error("Store returned {got} values for {expected} keys")]
    ShortRead { expected: usize, got: usize },
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// String key-value store backing the incremental index
///
/// Keys are URLs, values are timestamp strings. Writes are last-write-wins;
/// no atomicity across keys is required.
pub trait KeyValueStore: Send {
    /// Reads one key
    fn get(&self, key: &str) -> IndexResult<Option<String>>;

    /// Writes one key, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> IndexResult<()>;

    /// Reads many keys in one round trip
    ///
    /// The result has one entry per key, in the same order.
    fn get_many(&self, keys: &[String]) -> IndexResult<Vec<Option<String>>>;

    /// Writes many keys
    fn set_many(&mut self, entries: &[(String, String)]) -> IndexResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Short backend name for logging
    fn backend_name(&self) -> &'static str;
}
