use crate::config::endpoint::Endpoint;
use crate::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Logical endpoint names understood by the crawler
pub const LAW_SEARCH: &str = "law-search";
pub const LAW_DETAIL: &str = "law-detail";
pub const LAW_STATUS: &str = "law-status";
pub const LAW_ORGANIZATION: &str = "law-organization";
pub const QUESTIONS_BY_LAW: &str = "list-question-by-lawid";
pub const SUGGEST_BY_LAW: &str = "suggest-by-law";

/// Main configuration structure for lexcrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub endpoints: EndpointSet,
}

/// Crawl defaults, overridable from the command line
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Number of pages fetched concurrently
    #[serde(rename = "num-workers", default = "default_num_workers")]
    pub num_workers: usize,

    /// First publication date of the search window
    #[serde(rename = "start-date", default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last publication date of the search window (today when unset)
    #[serde(rename = "end-date", default)]
    pub end_date: Option<NaiveDate>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            start_date: default_start_date(),
            end_date: None,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON file receiving the crawled documents
    #[serde(rename = "json-path", default = "default_json_path")]
    pub json_path: String,

    /// Optional SQLite document store
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            database_path: None,
        }
    }
}

/// Upstream endpoints keyed by logical name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct EndpointSet(BTreeMap<String, Endpoint>);

impl EndpointSet {
    /// Looks up an endpoint by its logical name
    pub fn get(&self, name: &str) -> Result<&Endpoint, ConfigError> {
        self.0
            .get(name)
            .ok_or_else(|| ConfigError::MissingEndpoint(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, endpoint: Endpoint) {
        self.0.insert(name.into(), endpoint);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Endpoint)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn default_num_workers() -> usize {
    8
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1944, 1, 1).unwrap_or_default()
}

fn default_user_agent() -> String {
    format!("lexcrawl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_json_path() -> String {
    "output/law_detail_documents.json".to_string()
}
