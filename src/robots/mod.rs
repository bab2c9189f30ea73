//! Robots.txt handling module
//!
//! Sitemap discovery only: the robots resource is fetched once per run and
//! its `Sitemap:` directives seed the traversal. Access rules are not
//! evaluated.

mod parser;

pub use parser::extract_sitemap_urls;

use crate::crawler::Fetcher;
use crate::url::join_url;
use crate::HarvestError;

/// Fetches the robots resource of a site and returns its sitemap URLs
///
/// # Arguments
///
/// * `fetcher` - Fetch executor used for the request
/// * `home_url` - Home URL of the site
/// * `resource` - Robots resource path, resolved against `home_url`
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Seed sitemap URLs in file order, never empty
/// * `Err(HarvestError::Discovery)` - The robots resource could not be fetched
/// * `Err(HarvestError::NoSitemaps)` - Empty body or no sitemap directives
pub async fn discover_sitemaps(
    fetcher: &Fetcher,
    home_url: &str,
    resource: &str,
) -> Result<Vec<String>, HarvestError> {
    let robots_url = join_url(home_url, resource)?;
    tracing::info!("Fetching robots resource {}", robots_url);

    let content = fetcher
        .execute(&robots_url)
        .await
        .map_err(|source| HarvestError::Discovery {
            url: robots_url.clone(),
            source,
        })?;

    if content.trim().is_empty() {
        return Err(HarvestError::NoSitemaps { url: robots_url });
    }

    let sitemaps = extract_sitemap_urls(&content);
    if sitemaps.is_empty() {
        return Err(HarvestError::NoSitemaps { url: robots_url });
    }

    tracing::info!("Found {} sitemap(s) in {}", sitemaps.len(), robots_url);
    Ok(sitemaps)
}
