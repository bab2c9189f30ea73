//! HTTP fetcher implementation
//!
//! This module handles every HTTP request the crawler makes:
//! - Building the HTTP client from the configured request profile
//! - Issuing the request with a fixed method, body and header set
//! - Retrying transient failures with a fixed delay and bounded attempts
//! - Classifying terminal failures

use crate::config::{parse_header, parse_method, RequestConfig};
use crate::HarvestError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect::Policy, Client, Method};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirect hops followed when redirects are allowed
const MAX_REDIRECTS: usize = 10;

/// Browser-like header profile applied when `update-headers` is enabled
///
/// `Accept-Encoding` is left to reqwest, which negotiates it itself when the
/// gzip and brotli decoders are enabled.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "user-agent",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.3",
    ),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("accept-language", "en-US,en;q=0.9,es;q=0.8"),
    ("cache-control", "max-age=0"),
    ("upgrade-insecure-requests", "1"),
];

/// Terminal failures of a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure or retryable status that outlasted the attempt budget
    #[error("Connectivity error for {url} after {attempts} attempt(s): {message}")]
    Connectivity {
        url: String,
        attempts: u32,
        message: String,
    },

    /// Non-retryable HTTP error status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Anything else; never retried
    #[error("Unexpected error processing request to {url}: {message}")]
    Unexpected { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Connectivity { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Unexpected { url, .. } => url,
        }
    }
}

/// Outcome of a single attempt
#[derive(Debug)]
enum Attempt {
    /// Body of a successful response
    Done(String),

    /// Transient failure; worth another attempt
    Retry(String),

    /// Terminal failure
    Fatal(FetchError),
}

/// Builds an HTTP client for the configured request profile
///
/// Configured headers are applied first; the browser profile, when enabled,
/// overrides them.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - A header is invalid or the client failed to build
pub fn build_http_client(config: &RequestConfig) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.headers {
        let (name, value) = parse_header(name, value)?;
        headers.insert(name, value);
    }

    if config.update_headers {
        for (name, value) in BROWSER_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
    }

    let redirect = if config.allow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Retrying fetch executor
///
/// Every request uses the same method, body and headers. Responses whose
/// status is in the retryable set, as well as connection failures and
/// timeouts, are retried after a fixed delay until the attempt budget runs
/// out. Any other HTTP error status fails immediately.
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::config::RequestConfig;
/// use sitemap_harvest::crawler::Fetcher;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new(&RequestConfig::default())?;
/// let body = fetcher.execute("https://example.com/robots.txt").await?;
/// println!("{}", body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    method: Method,
    body: Option<String>,
    retry_status_codes: Vec<u16>,
    retry_delay: Duration,
    retry_tries: u32,
}

impl Fetcher {
    /// Creates a fetcher from the request profile
    pub fn new(config: &RequestConfig) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        let method = parse_method(&config.method)?;

        Ok(Self {
            client,
            method,
            body: config.body.clone(),
            retry_status_codes: config.retry_status_codes.clone(),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            retry_tries: config.retry_tries.max(1),
        })
    }

    pub fn retry_tries(&self) -> u32 {
        self.retry_tries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Fetches `url` and returns the raw response body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(FetchError::Connectivity)` - Retry budget exhausted
    /// * `Err(FetchError::HttpStatus)` - Non-retryable error status
    /// * `Err(FetchError::Unexpected)` - Any other failure
    pub async fn execute(&self, url: &str) -> Result<String, FetchError> {
        let mut last_failure = String::new();

        for attempt in 1..=self.retry_tries {
            match self.attempt(url).await {
                Attempt::Done(body) => return Ok(body),
                Attempt::Fatal(err) => {
                    tracing::error!("{}", err);
                    return Err(err);
                }
                Attempt::Retry(message) => {
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.retry_tries,
                        url,
                        message
                    );
                    last_failure = message;

                    if attempt < self.retry_tries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        let err = FetchError::Connectivity {
            url: url.to_string(),
            attempts: self.retry_tries,
            message: last_failure,
        };
        tracing::error!("{}", err);
        Err(err)
    }

    /// Performs one request and classifies its outcome
    async fn attempt(&self, url: &str) -> Attempt {
        let mut request = self.client.request(self.method.clone(), url);
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return classify_transport_error(url, e),
        };

        let status = response.status();

        if self.retry_status_codes.contains(&status.as_u16()) {
            return Attempt::Retry(format!("retryable response code {}", status.as_u16()));
        }

        if status.is_client_error() || status.is_server_error() {
            return Attempt::Fatal(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        match response.text().await {
            Ok(body) => Attempt::Done(body),
            Err(e) => classify_transport_error(url, e),
        }
    }
}

/// Connection failures and timeouts are transient; everything else is not
fn classify_transport_error(url: &str, err: reqwest::Error) -> Attempt {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        Attempt::Retry(err.to_string())
    } else {
        Attempt::Fatal(FetchError::Unexpected {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}
