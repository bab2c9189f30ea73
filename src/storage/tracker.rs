//! Incremental update tracker
//!
//! Maps each URL to the time it was last processed and answers whether a URL
//! must be processed again against a freshness threshold.

use crate::model::timestamp::{format_index_timestamp, parse_index_timestamp};
use crate::model::UrlLastUpdate;
use crate::storage::traits::{IndexError, IndexResult, KeyValueStore};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Store-backed index of last processing times
pub struct UpdateTracker {
    store: Box<dyn KeyValueStore>,
}

impl UpdateTracker {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Records that `url` was processed at `timestamp`
    pub fn upsert(&mut self, url: &str, timestamp: DateTime<Utc>) -> IndexResult<()> {
        self.store.set(url, &format_index_timestamp(&timestamp))
    }

    /// Records a single `UrlLastUpdate`
    pub fn upsert_record(&mut self, record: &UrlLastUpdate) -> IndexResult<()> {
        self.upsert(&record.url, record.updated_at)
    }

    /// Records every member of `records`; not atomic across members
    pub fn upsert_batch(&mut self, records: &HashSet<UrlLastUpdate>) -> IndexResult<()> {
        let entries: Vec<(String, String)> = records
            .iter()
            .map(|record| (record.url.clone(), format_index_timestamp(&record.updated_at)))
            .collect();

        self.store.set_many(&entries)?;
        tracing::debug!("Recorded {} URL(s) in the {} index", entries.len(), self.backend_name());
        Ok(())
    }

    /// Returns when `url` was last processed, if ever
    pub fn lookup(&self, url: &str) -> IndexResult<Option<DateTime<Utc>>> {
        match self.store.get(url)? {
            Some(raw) => decode(url, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// True when `url` has no record or its record is strictly older than `threshold`
    pub fn needs_processing(&self, url: &str, threshold: DateTime<Utc>) -> IndexResult<bool> {
        Ok(match self.lookup(url)? {
            Some(updated_at) => updated_at < threshold,
            None => true,
        })
    }

    /// Subset of `urls` that needs processing, read in one multi-get
    pub fn needs_processing_batch(
        &self,
        urls: &HashSet<String>,
        threshold: DateTime<Utc>,
    ) -> IndexResult<HashSet<String>> {
        if urls.is_empty() {
            return Ok(HashSet::new());
        }

        let keys: Vec<String> = urls.iter().cloned().collect();
        let values = self.store.get_many(&keys)?;

        if values.len() != keys.len() {
            return Err(IndexError::ShortRead {
                expected: keys.len(),
                got: values.len(),
            });
        }

        let mut pending = HashSet::new();
        for (url, value) in keys.into_iter().zip(values) {
            let stale = match value {
                Some(raw) => decode(&url, &raw)? < threshold,
                None => true,
            };
            if stale {
                pending.insert(url);
            }
        }

        Ok(pending)
    }
}

fn decode(url: &str, raw: &str) -> IndexResult<DateTime<Utc>> {
    parse_index_timestamp(raw).ok_or_else(|| IndexError::Timestamp {
        url: url.to_string(),
        value: raw.to_string(),
    })
}
