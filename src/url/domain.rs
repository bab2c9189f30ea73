use url::Url;

/// Builds a filesystem- and identifier-safe name from the host of a URL
///
/// The host is taken from the raw authority text, so its case is kept and
/// no IDNA conversion happens. Input without a `://` is treated as starting
/// with the authority. Credentials and the port are ignored, and every
/// character that is not an ASCII letter, digit or underscore is replaced
/// with `_`.
///
/// # Arguments
///
/// * `url` - The URL (or bare host) to derive the name from
///
/// # Returns
///
/// The sanitized host name, or an empty string when no host can be found
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::build_domain_name;
///
/// assert_eq!(build_domain_name("https://www.example.com/#section"), "www_example_com");
/// assert_eq!(build_domain_name("www.example.com"), "www_example_com");
/// assert_eq!(build_domain_name("example.com:8080"), "example_com");
/// ```
pub fn build_domain_name(url: &str) -> String {
    let after_scheme = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };

    let authority = after_scheme
        .split(|c: char| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    let host_port = match authority.split_once('@') {
        Some((_, rest)) => rest.split('@').next().unwrap_or_default(),
        None => authority,
    };
    let host = host_port.split(':').next().unwrap_or_default();

    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns the network location (`host[:port]`) of an absolute URL
///
/// Default ports are omitted, mirroring how the `url` crate normalizes them.
/// Returns an empty string when the input is not an absolute URL with a host.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::network_location;
///
/// assert_eq!(network_location("https://example.com/page"), "example.com");
/// assert_eq!(network_location("http://example.com:8080/a"), "example.com:8080");
/// assert_eq!(network_location("/relative/path"), "");
/// ```
pub fn network_location(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
