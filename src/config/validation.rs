use crate::config::endpoint::Endpoint;
use crate::config::types::{
    Config, CrawlConfig, EndpointSet, HttpConfig, OutputConfig, LAW_DETAIL, LAW_SEARCH,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent page workers
pub const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_endpoints(&config.endpoints)?;
    Ok(())
}

/// Validates crawl defaults
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_num_workers(config.num_workers)?;

    if let Some(end_date) = config.end_date {
        if end_date < config.start_date {
            return Err(ConfigError::Validation(format!(
                "end-date {} is before start-date {}",
                end_date, config.start_date
            )));
        }
    }

    Ok(())
}

/// Validates a worker count, whether from the file or the command line
pub fn validate_num_workers(num_workers: usize) -> Result<(), ConfigError> {
    if num_workers < 1 || num_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "num-workers must be between 1 and {}, got {}",
            MAX_WORKERS, num_workers
        )));
    }
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json-path cannot be empty".to_string(),
        ));
    }

    if matches!(config.database_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "database-path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates every endpoint and checks that the crawl endpoints exist
fn validate_endpoints(endpoints: &EndpointSet) -> Result<(), ConfigError> {
    endpoints.get(LAW_SEARCH)?;
    endpoints.get(LAW_DETAIL)?;

    for (name, endpoint) in endpoints.iter() {
        validate_endpoint(name, endpoint)?;
    }

    Ok(())
}

fn validate_endpoint(name: &str, endpoint: &Endpoint) -> Result<(), ConfigError> {
    let url = Url::parse(&endpoint.url).map_err(|e| {
        ConfigError::InvalidUrl(format!("endpoint '{}' url '{}': {}", name, endpoint.url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "endpoint '{}' must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    Ok(())
}
