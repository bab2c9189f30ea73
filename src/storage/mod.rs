//! Storage module for the incremental update index
//!
//! This module handles persistence of per-URL "last processed" timestamps:
//! - The `KeyValueStore` interface and its SQLite, Redis and in-memory backends
//! - SQLite schema management
//! - The `UpdateTracker` that decides which URLs need reprocessing

mod memory;
mod redis_store;
mod schema;
mod sqlite;
mod tracker;
mod traits;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use sqlite::SqliteStore;
pub use tracker::UpdateTracker;
pub use traits::{IndexError, IndexResult, KeyValueStore};

use crate::config::{IndexBackend, IndexConfig};
use std::path::Path;

/// Opens the store selected by the index configuration
///
/// # Returns
///
/// * `Ok(Box<dyn KeyValueStore>)` - The opened backend
/// * `Err(IndexError)` - Failed to open the database or parse the Redis URL
pub fn open_store(config: &IndexConfig) -> IndexResult<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match config.backend {
        IndexBackend::Sqlite => Box::new(SqliteStore::new(Path::new(&config.database_path))?),
        IndexBackend::Redis => Box::new(RedisStore::new(&config.redis_url())?),
        IndexBackend::Memory => Box::new(MemoryStore::new()),
    };

    tracing::info!("Using {} index store", store.backend_name());
    Ok(store)
}
