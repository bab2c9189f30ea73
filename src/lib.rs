//! Sitemap-Harvest: a polite sitemap enumerator
//!
//! This crate discovers every URL a website publishes through the sitemaps
//! advertised in its `robots.txt`, walking sitemap indexes breadth-first and
//! emitting one structured record per entry. An incremental index of
//! "last processed" timestamps lets repeated runs skip unchanged URLs.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

pub use crawler::FetchError;

/// Main error type for Sitemap-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed sitemap {url}: <{tag}> element has no <{field}>")]
    MalformedDocument {
        url: String,
        tag: String,
        field: String,
    },

    #[error("XML parse error for {url}: {message}")]
    Xml { url: String, message: String },

    #[error("Failed to fetch robots resource {url}: {source}")]
    Discovery {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("No sitemaps listed in {url}")]
    NoSitemaps { url: String },

    #[error("Index error: {0}")]
    Index(#[from] storage::IndexError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL: {0}")]
    MissingDomain(String),
}

/// Result type alias for Sitemap-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{NodeKind, UrlLastUpdate, WebsiteNode};
pub use crate::url::{build_domain_name, network_location};
