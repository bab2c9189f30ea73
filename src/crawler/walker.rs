//! Breadth-first sitemap traversal
//!
//! The walker discovers seed sitemaps from the robots resource, then drains a
//! FIFO frontier of fetched documents. URL entries become nodes directly;
//! sitemap entries are fetched first and only emitted (and enqueued) when the
//! fetch succeeds.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{flatten_fields, parse_document, XmlElement};
use crate::crawler::scheduler::{Scheduler, Throttle};
use crate::model::{FieldValue, NodeKind, NodeMeta, ProcessedByType, WebsiteNode};
use crate::robots::discover_sitemaps;
use crate::url::build_domain_name;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::time::Duration;

const RUN_ID_PREFIX: &str = "website_node_crawler";

/// Provenance shared by every node of one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct RunIdentity {
    processed_by: String,
    processed_at: DateTime<Utc>,
    processed_by_type: ProcessedByType,
}

impl RunIdentity {
    /// Creates the identity of a run started at `processed_at`
    ///
    /// Without an explicit `processed_by`, the identifier is derived from the
    /// home URL, the run type and the start time.
    pub fn new(
        home_url: &str,
        processed_by_type: ProcessedByType,
        processed_at: DateTime<Utc>,
        processed_by: Option<String>,
    ) -> Self {
        let processed_by = processed_by.unwrap_or_else(|| {
            Self::default_run_id(home_url, processed_by_type, processed_at)
        });

        Self {
            processed_by,
            processed_at,
            processed_by_type,
        }
    }

    /// `website_node_crawler___{domain}___{type}___{YYYYmmdd_HHMM}`
    pub fn default_run_id(
        home_url: &str,
        processed_by_type: ProcessedByType,
        processed_at: DateTime<Utc>,
    ) -> String {
        format!(
            "{}___{}___{}___{}",
            RUN_ID_PREFIX,
            build_domain_name(home_url),
            processed_by_type,
            processed_at.format("%Y%m%d_%H%M")
        )
    }

    pub fn processed_by(&self) -> &str {
        &self.processed_by
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    pub fn processed_by_type(&self) -> ProcessedByType {
        self.processed_by_type
    }

    /// Provenance for a node created now
    pub fn stamp(&self) -> NodeMeta {
        NodeMeta {
            processed_by: self.processed_by.clone(),
            processed_at: self.processed_at,
            processed_by_type: self.processed_by_type,
            created_at: Utc::now(),
        }
    }
}

/// Sitemap traversal engine for one website
pub struct SitemapWalker {
    fetcher: Fetcher,
    home_url: String,
    robots_resource: String,
    sleep_time: Duration,
    identity: RunIdentity,
}

impl SitemapWalker {
    /// Creates a walker for the configured site, starting its run now
    pub fn new(fetcher: Fetcher, config: &CrawlerConfig) -> Self {
        let identity = RunIdentity::new(
            &config.home_url,
            config.processed_by_type,
            Utc::now(),
            config.processed_by.clone(),
        );

        Self {
            fetcher,
            home_url: config.home_url.clone(),
            robots_resource: config.robots_resource.clone(),
            sleep_time: Duration::from_millis(config.sleep_time_ms),
            identity,
        }
    }

    /// Replaces the run identity
    pub fn with_identity(mut self, identity: RunIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    /// Fetches and parses one sitemap document
    ///
    /// # Returns
    ///
    /// * `Ok(Some(XmlElement))` - Root element of the document
    /// * `Ok(None)` - The response body was empty
    /// * `Err(HarvestError)` - Fetch failure or malformed XML
    pub async fn fetch_and_parse(&self, url: &str) -> Result<Option<XmlElement>, HarvestError> {
        let content = self.fetcher.execute(url).await?;

        if content.trim().is_empty() {
            tracing::warn!("Empty sitemap document at {}", url);
            return Ok(None);
        }

        parse_document(url, &content).map(Some)
    }

    /// Returns the seed sitemap URLs listed in the robots resource
    pub async fn extract_sitemaps(&self) -> Result<Vec<String>, HarvestError> {
        discover_sitemaps(&self.fetcher, &self.home_url, &self.robots_resource).await
    }

    /// Walks every sitemap advertised in the robots resource
    ///
    /// Seeds are fetched in order and all of them join the frontier before
    /// traversal starts. A seed that cannot be fetched or parsed is skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<WebsiteNode>)` - Nodes in breadth-first discovery order
    /// * `Err(HarvestError)` - Discovery failed or an entry had no `loc`
    pub async fn process_all_sitemaps(&self) -> Result<Vec<WebsiteNode>, HarvestError> {
        let seeds = self.extract_sitemaps().await?;
        let mut scheduler = Scheduler::new(Throttle::new(self.sleep_time));

        for seed in seeds {
            match self.fetch_and_parse(&seed).await {
                Ok(Some(document)) => scheduler.enqueue(seed, document),
                Ok(None) => tracing::warn!("Skipping seed sitemap {}: empty body", seed),
                Err(e) => tracing::warn!("Skipping seed sitemap {}: {}", seed, e),
            }
        }

        self.traverse(scheduler).await
    }

    /// Walks the tree rooted at a single sitemap URL
    ///
    /// Unlike seeds from the robots resource, a root that fails to fetch or
    /// parse is an error.
    pub async fn process_sitemap(&self, url: &str) -> Result<Vec<WebsiteNode>, HarvestError> {
        let mut scheduler = Scheduler::new(Throttle::new(self.sleep_time));

        match self.fetch_and_parse(url).await? {
            Some(document) => scheduler.enqueue(url.to_string(), document),
            None => return Ok(Vec::new()),
        }

        self.traverse(scheduler).await
    }

    async fn traverse(&self, mut scheduler: Scheduler) -> Result<Vec<WebsiteNode>, HarvestError> {
        let mut nodes = Vec::new();
        let mut pruned = 0usize;

        while let Some(queued) = scheduler.next_document().await {
            let parent_url = queued.parent_url;
            let mut urls_added = 0usize;
            let mut sitemaps_added = 0usize;

            for entry in &queued.document.children {
                let Some(kind) = NodeKind::from_tag(&entry.name) else {
                    tracing::warn!("Ignoring unknown element <{}> in {}", entry.name, parent_url);
                    continue;
                };

                let fields = flatten_fields(entry);
                let location = match fields.get("loc").and_then(FieldValue::as_text) {
                    Some(location) => location.to_string(),
                    None => {
                        return Err(HarvestError::MalformedDocument {
                            url: parent_url,
                            tag: entry.name.clone(),
                            field: "loc".to_string(),
                        })
                    }
                };

                match kind {
                    NodeKind::Url => {
                        nodes.push(WebsiteNode::from_fields(
                            location,
                            &parent_url,
                            kind,
                            fields,
                            self.identity.stamp(),
                        ));
                        urls_added += 1;
                    }
                    NodeKind::Sitemap => match self.fetch_and_parse(&location).await {
                        Ok(Some(document)) => {
                            nodes.push(WebsiteNode::from_fields(
                                location.clone(),
                                &parent_url,
                                kind,
                                fields,
                                self.identity.stamp(),
                            ));
                            scheduler.enqueue(location, document);
                            sitemaps_added += 1;
                        }
                        Ok(None) => {
                            tracing::warn!("Pruning sitemap {}: empty body", location);
                            pruned += 1;
                        }
                        Err(e) => {
                            tracing::warn!("Pruning sitemap {}: {}", location, e);
                            pruned += 1;
                        }
                    },
                }
            }

            tracing::info!(
                "Processed {}: {} URL entries added, {} sitemaps enqueued ({} queued)",
                parent_url,
                urls_added,
                sitemaps_added,
                scheduler.frontier_size()
            );
        }

        tracing::info!(
            "Traversal finished: {} documents, {} nodes, {} sitemaps pruned",
            scheduler.documents_started(),
            nodes.len(),
            pruned
        );

        Ok(nodes)
    }
}
