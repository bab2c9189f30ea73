use crate::model::ProcessedByType;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Sitemap-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Sitemap discovery and traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Home URL of the website; the robots resource is resolved against it
    #[serde(rename = "home-url")]
    pub home_url: String,

    /// Path of the robots resource relative to the home URL
    #[serde(rename = "robots-resource", default = "default_robots_resource")]
    pub robots_resource: String,

    /// Pause between two sitemap documents (milliseconds)
    #[serde(rename = "sleep-time-ms", default = "default_sleep_time_ms")]
    pub sleep_time_ms: u64,

    /// Whether runs are started by hand or by a scheduler
    #[serde(rename = "processed-by-type", default)]
    pub processed_by_type: ProcessedByType,

    /// Explicit run identifier; derived from the home URL when absent
    #[serde(rename = "processed-by", default)]
    pub processed_by: Option<String>,
}

/// HTTP request profile of the fetch executor
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// HTTP method used for every request
    #[serde(default = "default_method")]
    pub method: String,

    /// Optional request body
    #[serde(default)]
    pub body: Option<String>,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Whether redirects are followed
    #[serde(rename = "allow-redirects", default = "default_true")]
    pub allow_redirects: bool,

    /// Whether the browser-like header profile is applied
    #[serde(rename = "update-headers", default = "default_true")]
    pub update_headers: bool,

    /// Status codes treated as transient failures
    #[serde(rename = "retry-status-codes", default = "default_retry_status_codes")]
    pub retry_status_codes: Vec<u16>,

    /// Delay between two attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Maximum number of attempts per request
    #[serde(rename = "retry-tries", default = "default_retry_tries")]
    pub retry_tries: u32,

    /// Overall timeout of one attempt (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            body: None,
            headers: BTreeMap::new(),
            allow_redirects: true,
            update_headers: true,
            retry_status_codes: default_retry_status_codes(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_tries: default_retry_tries(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Store backing the incremental index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Sqlite,
    Redis,
    Memory,
}

/// Incremental index configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub backend: IndexBackend,

    /// Path to the SQLite database file (sqlite backend)
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Redis host (redis backend)
    #[serde(default = "default_redis_host")]
    pub host: String,

    /// Redis port (redis backend)
    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// Redis logical database index (redis backend)
    #[serde(default)]
    pub db: i64,
}

impl IndexConfig {
    /// Connection URL for the redis backend
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            database_path: default_database_path(),
            host: default_redis_host(),
            port: default_redis_port(),
            db: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// JSON-lines destination; `-` writes to stdout
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl OutputConfig {
    pub fn is_stdout(&self) -> bool {
        self.path == "-"
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_robots_resource() -> String {
    "robots.txt".to_string()
}

fn default_sleep_time_ms() -> u64 {
    2000
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_true() -> bool {
    true
}

fn default_retry_status_codes() -> Vec<u16> {
    vec![429, 503]
}

fn default_retry_delay_ms() -> u64 {
    180_000
}

fn default_retry_tries() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_database_path() -> String {
    "./sitemap-index.db".to_string()
}

fn default_redis_host() -> String {
    "redis".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_output_path() -> String {
    "-".to_string()
}
