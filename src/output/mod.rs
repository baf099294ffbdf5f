//! Output module for crawl results
//!
//! This module handles:
//! - Writing the crawled documents to a JSON file
//! - Reading such a file back (for post-processing)
//! - Formatting the crawl report for the terminal

mod json;
mod report;

pub use json::{read_json, write_json};
pub use report::{format_report, print_report};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize documents: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
