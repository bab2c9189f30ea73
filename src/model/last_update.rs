use chrono::{DateTime, Utc};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single fact of the incremental index: when a URL was last processed
///
/// Identity is the URL alone. Two records with the same URL and different
/// timestamps compare equal and hash the same, so a `HashSet<UrlLastUpdate>`
/// holds at most one timestamp per URL.
#[derive(Debug, Clone)]
pub struct UrlLastUpdate {
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

impl UrlLastUpdate {
    /// Creates a record stamped with the current time
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timestamp(url, Utc::now())
    }

    /// Creates a record with an explicit timestamp
    pub fn with_timestamp(url: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            updated_at,
        }
    }
}

impl PartialEq for UrlLastUpdate {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for UrlLastUpdate {}

impl Hash for UrlLastUpdate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl Borrow<str> for UrlLastUpdate {
    fn borrow(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for UrlLastUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UrlLastUpdate(url={}, updated_at={})",
            self.url,
            self.updated_at.to_rfc3339()
        )
    }
}
