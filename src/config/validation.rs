use crate::config::types::{Config, CrawlerConfig, IndexBackend, IndexConfig, OutputConfig, RequestConfig};
use crate::url::parse_http_url;
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_request_config(&config.request)?;
    validate_index_config(&config.index)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    parse_http_url(&config.home_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid home-url: {}", e)))?;

    if config.robots_resource.trim().is_empty() {
        return Err(ConfigError::Validation(
            "robots-resource cannot be empty".to_string(),
        ));
    }

    if let Some(processed_by) = &config.processed_by {
        if processed_by.trim().is_empty() {
            return Err(ConfigError::Validation(
                "processed-by cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the HTTP request profile
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    parse_method(&config.method)?;

    for (name, value) in &config.headers {
        parse_header(name, value)?;
    }

    if config.retry_tries < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-tries must be >= 1, got {}",
            config.retry_tries
        )));
    }

    for code in &config.retry_status_codes {
        if !(100..=599).contains(code) {
            return Err(ConfigError::Validation(format!(
                "retry-status-codes must be HTTP status codes, got {}",
                code
            )));
        }
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates incremental index configuration
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    match config.backend {
        IndexBackend::Sqlite if config.database_path.is_empty() => Err(ConfigError::Validation(
            "index database-path cannot be empty".to_string(),
        )),
        IndexBackend::Redis if config.host.is_empty() => Err(ConfigError::Validation(
            "index host cannot be empty".to_string(),
        )),
        IndexBackend::Redis if config.port == 0 => Err(ConfigError::Validation(
            "index port must be greater than 0".to_string(),
        )),
        IndexBackend::Redis if config.db < 0 => Err(ConfigError::Validation(format!(
            "index db must be >= 0, got {}",
            config.db
        ))),
        _ => Ok(()),
    }
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Parses an HTTP method name (case-insensitive)
pub(crate) fn parse_method(method: &str) -> Result<Method, ConfigError> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| ConfigError::Validation(format!("Invalid HTTP method: '{}'", method)))
}

/// Parses one configured request header
pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::Validation(format!("Invalid header name: '{}'", name)))?;
    let header_value = HeaderValue::from_str(value).map_err(|_| {
        ConfigError::Validation(format!("Invalid value for header '{}'", name))
    })?;
    Ok((header_name, header_value))
}
