//! URL handling module for Sitemap-Harvest
//!
//! This module provides domain-name derivation for run identifiers, network
//! location extraction for emitted records, and resolution of the robots
//! resource against the site's home URL.

mod domain;

// Re-export main functions
pub use domain::{build_domain_name, network_location};

use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves `relative` against `base`, the way a browser resolves a link
///
/// # Arguments
///
/// * `base` - An absolute URL (e.g. the site's home URL)
/// * `relative` - A path or URL to resolve against it (e.g. `robots.txt`)
///
/// # Returns
///
/// * `Ok(String)` - The resolved absolute URL
/// * `Err(UrlError)` - `base` is not an absolute URL or the join failed
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::join_url;
///
/// assert_eq!(
///     join_url("https://example.com", "robots.txt").unwrap(),
///     "https://example.com/robots.txt"
/// );
/// ```
pub fn join_url(base: &str, relative: &str) -> UrlResult<String> {
    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
    let joined = base_url
        .join(relative)
        .map_err(|e| UrlError::Parse(format!("{} + {}: {}", base, relative, e)))?;
    Ok(joined.to_string())
}

/// Parses `url` and checks that it is an absolute `http`/`https` URL with a host
pub fn parse_http_url(url: &str) -> UrlResult<Url> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingDomain(url.to_string()));
    }

    Ok(parsed)
}
