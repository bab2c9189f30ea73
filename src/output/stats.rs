//! Crawl run statistics
//!
//! This module provides the per-run counters collected by the coordinator
//! and their console rendering.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Counters for one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStats {
    /// Run identifier shared by all emitted nodes
    pub run_id: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// SITEMAP nodes emitted by the traversal
    pub sitemaps: u64,

    /// URL nodes emitted by the traversal, duplicates included
    pub urls: u64,

    /// URL nodes skipped because the index had them up to date
    pub unchanged: u64,

    /// URL nodes repeating a location seen earlier in the same run
    pub duplicates: u64,

    /// Nodes written to the sink
    pub written: u64,

    /// Written nodes per domain
    pub per_domain: BTreeMap<String, u64>,
}

impl CrawlStats {
    pub fn new(run_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at,
            finished_at: None,
            sitemaps: 0,
            urls: 0,
            unchanged: 0,
            duplicates: 0,
            written: 0,
            per_domain: BTreeMap::new(),
        }
    }

    /// Counts one node written for `domain`
    pub fn record_written(&mut self, domain: &str) {
        self.written += 1;
        *self.per_domain.entry(domain.to_string()).or_insert(0) += 1;
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.finished_at = Some(at);
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stdout may carry the JSON-lines output, so the summary stays off it.
pub fn print_statistics(stats: &CrawlStats) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Run: {}", stats.run_id);
    eprintln!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(duration) = stats.duration_seconds() {
        eprintln!("  Duration: {}s", duration);
    }
    eprintln!();

    eprintln!("Traversal:");
    eprintln!("  Sitemaps: {}", stats.sitemaps);
    eprintln!("  URLs: {}", stats.urls);
    eprintln!("  Duplicates: {}", stats.duplicates);
    eprintln!("  Unchanged: {}", stats.unchanged);
    eprintln!("  Written: {}", stats.written);
    eprintln!();

    if !stats.per_domain.is_empty() {
        eprintln!("Written by Domain ({}):", stats.per_domain.len());
        let mut domains: Vec<_> = stats.per_domain.iter().collect();
        domains.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (domain, count) in domains {
            let label = if domain.is_empty() { "(none)" } else { domain.as_str() };
            eprintln!("  {}: {}", label, count);
        }
    }
}
