//! Sitemap directive extraction from robots.txt content

const SITEMAP_PREFIX: &str = "sitemap:";
const VALUE_SEPARATOR: &str = ": ";

/// Extracts the sitemap URLs advertised in a robots.txt file
///
/// Every line whose lowercase form starts with `sitemap:` contributes the
/// text after its first `": "`, trimmed. Lines missing the separator or with
/// an empty value contribute nothing. Order is preserved and duplicates are
/// kept.
///
/// # Example
///
/// ```
/// use sitemap_harvest::robots::extract_sitemap_urls;
///
/// let robots = "User-agent: *\nSitemap: https://example.com/sitemap.xml\n";
/// assert_eq!(extract_sitemap_urls(robots), vec!["https://example.com/sitemap.xml"]);
/// ```
pub fn extract_sitemap_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| line.to_lowercase().starts_with(SITEMAP_PREFIX))
        .filter_map(|line| match line.split_once(VALUE_SEPARATOR) {
            Some((_, value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
            _ => {
                tracing::warn!("Skipping unusable sitemap line in robots.txt: '{}'", line);
                None
            }
        })
        .collect()
}
