//! Storage traits and error types
//!
//! This module defines the trait interface for document stores and
//! associated error types.

use crate::crawler::CrawlReport;
use crate::record::DocumentRecord;
use crate::storage::RunRecord;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document store implementations
///
/// Receives the ordered output of a crawl. Records are keyed by document id,
/// so storing a later crawl of the same window replaces earlier rows.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `start_date` / `end_date` - The crawled publication window
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(
        &mut self,
        config_hash: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Records the crawl figures and marks the run finished
    fn complete_run(&mut self, run_id: i64, report: &CrawlReport) -> StorageResult<()>;

    // ===== Documents =====

    /// Inserts or replaces documents in one transaction
    ///
    /// # Returns
    ///
    /// The number of documents written
    fn save_documents(&mut self, run_id: i64, records: &[DocumentRecord]) -> StorageResult<usize>;

    /// Gets a document by its upstream id
    fn get_document(&self, id: i64) -> StorageResult<Option<DocumentRecord>>;

    /// Counts every stored document
    fn count_documents(&self) -> StorageResult<u64>;

    /// Counts documents last written by the given run
    fn count_documents_for_run(&self, run_id: i64) -> StorageResult<u64>;
}
