//! Crawler module for the legal-document API
//!
//! This module contains the core crawling logic, including:
//! - HTTP request execution and error classification
//! - Detail fetching and record conversion
//! - Search pagination and per-page assembly
//! - Overall crawl coordination over a bounded worker pool
//! - Reference-data queries (statuses, organizations, questions)

mod catalog;
mod coordinator;
mod detail;
mod fetcher;
mod page;

pub use coordinator::{CancelToken, Coordinator, CrawlOutput, CrawlReport};
pub use fetcher::{build_http_client, execute, LawClient};
pub use page::{page_count, PageFetch, PageStatus, SearchQuery, SearchResult, PAGE_SIZE};

use crate::config::{validate_num_workers, Config};
use crate::output::write_json;
use crate::storage::{SqliteStorage, Storage};
use crate::{ConfigError, LexError};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// The four parameters of a crawl invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlParams {
    pub num_workers: usize,
    pub output_path: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CrawlParams {
    /// Takes every parameter from the configuration; the end date defaults to today
    pub fn from_config(config: &Config) -> Self {
        Self {
            num_workers: config.crawl.num_workers,
            output_path: PathBuf::from(&config.output.json_path),
            start_date: config.crawl.start_date,
            end_date: config
                .crawl
                .end_date
                .unwrap_or_else(|| Local::now().date_naive()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_num_workers(self.num_workers)?;
        if self.end_date < self.start_date {
            return Err(ConfigError::Validation(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(())
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Crawl the requested window over `num_workers` workers
/// 3. Write the ordered records as JSON to `output_path`
/// 4. Store the run and its records in SQLite when a database is configured
///
/// Upstream failures only shrink the result; the returned error covers
/// invalid parameters and output/storage failures.
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    params: &CrawlParams,
    cancel: CancelToken,
) -> Result<CrawlReport, LexError> {
    params.validate()?;

    let client = LawClient::from_config(config)?;
    let span = tracing::info_span!(
        "crawl",
        start = %params.start_date,
        end = %params.end_date,
        workers = params.num_workers
    );
    let coordinator = Coordinator::new(client, params.num_workers)
        .with_cancel_token(cancel)
        .with_span(span);

    let output = coordinator.crawl(params.start_date, params.end_date).await;

    write_json(&params.output_path, &output.records)?;
    tracing::info!(
        "Wrote {} documents to {}",
        output.records.len(),
        params.output_path.display()
    );

    if let Some(database_path) = &config.output.database_path {
        let mut storage = SqliteStorage::new(Path::new(database_path))?;
        let run_id = storage.create_run(config_hash, params.start_date, params.end_date)?;
        let saved = storage.save_documents(run_id, &output.records)?;
        storage.complete_run(run_id, &output.report)?;
        tracing::info!("Stored {} documents in {} (run {})", saved, database_path, run_id);
    }

    Ok(output.report)
}
