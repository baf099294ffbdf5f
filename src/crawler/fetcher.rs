//! HTTP request execution
//!
//! This module owns the single shared `reqwest::Client` and turns rendered
//! [`ApiRequest`]s into decoded JSON. Every failure is classified into a
//! [`RequestError`]; nothing here retries.

use crate::config::{
    ApiRequest, Config, Endpoint, EndpointSet, HttpConfig, HttpMethod, Vars, LAW_DETAIL, LAW_SEARCH,
};
use crate::{ConfigError, LexError, RequestError};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Builds the HTTP client shared by every request of a crawl
///
/// # Example
///
/// ```no_run
/// use lexcrawl::config::HttpConfig;
/// use lexcrawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Executes one request and decodes its JSON body
///
/// # Request Flow
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200, JSON body | `Ok(value)` |
/// | Any other status | `HttpStatus` |
/// | Client timeout | `Timeout` |
/// | Connection/transport failure | `Network` |
/// | Body is not JSON | `Decode` |
pub async fn execute(client: &Client, request: &ApiRequest) -> Result<Value, RequestError> {
    let mut builder = match request.method {
        HttpMethod::Get => client.get(&request.url),
        HttpMethod::Post => client.post(&request.url),
    };

    if !request.params.is_empty() {
        builder = builder.query(&request.params);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| classify_error(&request.url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(RequestError::HttpStatus {
            url: request.url.clone(),
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify_error(&request.url, e))?;

    serde_json::from_slice(&bytes).map_err(|e| RequestError::Decode {
        url: request.url.clone(),
        message: e.to_string(),
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> RequestError {
    if error.is_timeout() {
        RequestError::Timeout {
            url: url.to_string(),
        }
    } else {
        RequestError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Client for the legal-document API
///
/// Pairs the shared HTTP client with the configured endpoints. The search and
/// detail endpoints are resolved once at construction; the catalog endpoints
/// are looked up on demand.
#[derive(Debug, Clone)]
pub struct LawClient {
    pub(crate) http: Client,
    pub(crate) search: Endpoint,
    pub(crate) detail: Endpoint,
    endpoints: EndpointSet,
}

impl LawClient {
    /// Creates a client, failing if the crawl endpoints are not configured
    pub fn new(http: Client, endpoints: EndpointSet) -> Result<Self, ConfigError> {
        let search = endpoints.get(LAW_SEARCH)?.clone();
        let detail = endpoints.get(LAW_DETAIL)?.clone();
        Ok(Self {
            http,
            search,
            detail,
            endpoints,
        })
    }

    /// Builds the HTTP client and endpoint set from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, LexError> {
        let http = build_http_client(&config.http)?;
        Ok(Self::new(http, config.endpoints.clone())?)
    }

    /// Looks up a configured endpoint by logical name
    pub fn endpoint(&self, name: &str) -> Result<&Endpoint, ConfigError> {
        self.endpoints.get(name)
    }

    /// Renders an endpoint with the given variables and executes it
    pub async fn request(&self, endpoint: &Endpoint, vars: &Vars) -> Result<Value, RequestError> {
        let request = endpoint.render(vars);
        tracing::debug!(url = %request.url, method = ?request.method, "sending request");
        execute(&self.http, &request).await
    }
}
