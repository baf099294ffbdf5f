//! lexcrawl: a parallel crawler for legal-document APIs
//!
//! This crate pages through a date-bounded document search, fetches every
//! document's detail record over a bounded pool of workers, normalizes the
//! payloads into [`DocumentRecord`]s and hands the ordered collection to the
//! JSON writer and the SQLite document store.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for lexcrawl operations
#[derive(Debug, Error)]
pub enum LexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

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

    #[error("Missing endpoint: {0}")]
    MissingEndpoint(String),
}

/// Failure of a single upstream request
///
/// None of these abort a crawl: the caller logs them and treats the unit of
/// work (one page, one document) as having produced nothing.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Undecodable response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Failure to turn a raw detail payload into a [`DocumentRecord`]
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for field '{field}': {message}")]
    InvalidField { field: &'static str, message: String },
}

/// Result type alias for lexcrawl operations
pub type Result<T> = std::result::Result<T, LexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CancelToken, Coordinator, CrawlOutput, CrawlParams, CrawlReport};
pub use record::{DateValue, DocumentRecord, LawField, OrganizationIds};
