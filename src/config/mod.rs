//! Configuration module for lexcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The file names every upstream endpoint the crawler talks to, the HTTP client
//! settings, crawl defaults and output locations.
//!
//! # Example
//!
//! ```no_run
//! use lexcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("lexcrawl.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawl.num_workers);
//! ```

mod endpoint;
mod parser;
mod types;
mod validation;

// Re-export types
pub use endpoint::{ApiRequest, Endpoint, HttpMethod, Vars};
pub use types::{
    Config, CrawlConfig, EndpointSet, HttpConfig, OutputConfig, LAW_DETAIL, LAW_ORGANIZATION,
    LAW_SEARCH, LAW_STATUS, QUESTIONS_BY_LAW, SUGGEST_BY_LAW,
};

// Re-export parser functions
pub use parser::{compute_config_hash, config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate_num_workers, MAX_WORKERS};
