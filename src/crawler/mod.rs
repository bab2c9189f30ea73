//! Crawler module for sitemap discovery and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Sitemap XML parsing
//! - Frontier scheduling and per-document pacing
//! - Breadth-first sitemap traversal
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod walker;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use parser::{flatten_fields, parse_document, XmlElement};
pub use scheduler::{QueuedSitemap, Scheduler, Throttle};
pub use walker::{RunIdentity, SitemapWalker};

use crate::config::Config;
use crate::output::CrawlStats;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the fetcher, index store and output sink
/// 2. Discover seed sitemaps from the robots resource
/// 3. Walk the sitemap tree breadth-first
/// 4. Open the output, write nodes that need processing and record them in
///    the index
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed successfully
/// * `Err(HarvestError)` - Crawl failed
pub async fn crawl(config: &Config) -> Result<CrawlStats, HarvestError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.run().await
}
