//! In-process storage implementation

use crate::storage::traits::{IndexResult, KeyValueStore};
use std::collections::HashMap;

/// Index store held in memory for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> IndexResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> IndexResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_many(&self, keys: &[String]) -> IndexResult<Vec<Option<String>>> {
        Ok(keys.iter().map(|key| self.entries.get(key).cloned()).collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
