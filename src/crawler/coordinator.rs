//! Crawler coordinator - one crawl run end to end
//!
//! This module wires the traversal to its collaborators:
//! - Walking every sitemap advertised by the site
//! - Filtering URL nodes through the incremental index
//! - Writing surviving nodes to the output sink
//! - Recording written URLs back into the index

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::walker::SitemapWalker;
use crate::model::{UrlLastUpdate, WebsiteNode};
use crate::output::{CrawlStats, DeferredSink, NodeSink};
use crate::storage::{open_store, UpdateTracker};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Main crawler coordinator structure
pub struct Coordinator<K: NodeSink> {
    walker: SitemapWalker,
    tracker: UpdateTracker,
    sink: K,
}

impl Coordinator<Box<dyn NodeSink>> {
    /// Builds a coordinator from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Fetcher and index are ready; the output is
    ///   created on the first write after traversal
    /// * `Err(HarvestError)` - Failed to build the HTTP client or open the
    ///   index store
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config.request)?;
        let walker = SitemapWalker::new(fetcher, &config.crawler);
        let tracker = UpdateTracker::new(open_store(&config.index)?);
        let sink: Box<dyn NodeSink> = Box::new(DeferredSink::new(config.output.clone()));

        Ok(Self::new(walker, tracker, sink))
    }
}

impl<K: NodeSink> Coordinator<K> {
    pub fn new(walker: SitemapWalker, tracker: UpdateTracker, sink: K) -> Self {
        Self {
            walker,
            tracker,
            sink,
        }
    }

    pub fn walker(&self) -> &SitemapWalker {
        &self.walker
    }

    pub fn tracker(&self) -> &UpdateTracker {
        &self.tracker
    }

    /// Consumes the coordinator, returning its sink
    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Runs the crawl
    ///
    /// Sitemap nodes are always written. URL nodes are written once per
    /// location, and only when the index says they need processing: against
    /// their `lastmod` when declared, otherwise against the run start.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - Counters of the finished run
    /// * `Err(HarvestError)` - Discovery, traversal, index or output failure
    pub async fn run(&mut self) -> Result<CrawlStats, HarvestError> {
        let identity = self.walker.identity().clone();
        let run_start = identity.processed_at();
        let mut stats = CrawlStats::new(identity.processed_by(), run_start);

        tracing::info!(
            "Starting {} crawl {} of {}",
            identity.processed_by_type(),
            identity.processed_by(),
            self.walker.home_url()
        );

        let nodes = self.walker.process_all_sitemaps().await?;
        let pending = self.select_pending(&nodes, run_start, &mut stats)?;

        let mut written_urls: HashSet<UrlLastUpdate> = HashSet::new();
        for node in &nodes {
            if !node.is_sitemap() {
                if !pending.contains(&node.location)
                    || written_urls.contains(node.location.as_str())
                {
                    continue;
                }
                written_urls.insert(UrlLastUpdate::with_timestamp(
                    node.location.clone(),
                    run_start,
                ));
            }

            self.sink.write_node(node)?;
            stats.record_written(&node.domain);
        }
        self.sink.flush()?;

        self.tracker.upsert_batch(&written_urls)?;

        stats.finish(Utc::now());
        tracing::info!(
            "Crawl {} finished: {} sitemaps, {} URLs ({} duplicates, {} unchanged), {} nodes written",
            stats.run_id,
            stats.sitemaps,
            stats.urls,
            stats.duplicates,
            stats.unchanged,
            stats.written
        );

        Ok(stats)
    }

    /// Distinct URL locations that need processing
    fn select_pending(
        &self,
        nodes: &[WebsiteNode],
        run_start: DateTime<Utc>,
        stats: &mut CrawlStats,
    ) -> Result<HashSet<String>, HarvestError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut by_threshold: HashMap<DateTime<Utc>, HashSet<String>> = HashMap::new();

        for node in nodes {
            if node.is_sitemap() {
                stats.sitemaps += 1;
                continue;
            }

            stats.urls += 1;
            if !seen.insert(node.location.as_str()) {
                stats.duplicates += 1;
                continue;
            }

            let threshold = node
                .last_modified
                .map(|modified| modified.with_timezone(&Utc))
                .unwrap_or(run_start);
            by_threshold
                .entry(threshold)
                .or_default()
                .insert(node.location.clone());
        }

        let mut pending = HashSet::new();
        for (threshold, urls) in &by_threshold {
            pending.extend(self.tracker.needs_processing_batch(urls, *threshold)?);
        }

        stats.unchanged = (seen.len() - pending.len()) as u64;
        tracing::debug!(
            "{} of {} distinct URL(s) need processing",
            pending.len(),
            seen.len()
        );

        Ok(pending)
    }
}
