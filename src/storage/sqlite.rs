//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::CrawlReport;
use crate::record::{DateValue, DocumentRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, start_date, end_date,
     total_items, fetched_items, failed_pages, skipped_documents, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        total_items: row.get(6)?,
        fetched_items: row.get(7)?,
        failed_pages: row.get(8)?,
        skipped_documents: row.get(9)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(10)?)
            .unwrap_or(RunStatus::Running),
    })
}

fn date_column(value: &Option<DateValue>) -> Option<String> {
    value.as_ref().map(|date| match date {
        DateValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        DateValue::Raw(s) => s.clone(),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(
        &mut self,
        config_hash: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, start_date, end_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                config_hash,
                start_date.to_string(),
                end_date.to_string(),
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(self.conn.query_row(&sql, [], run_from_row).optional()?)
    }

    fn complete_run(&mut self, run_id: i64, report: &CrawlReport) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let status = if report.cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, total_items = ?3, fetched_items = ?4,
             failed_pages = ?5, skipped_documents = ?6 WHERE id = ?7",
            params![
                status.to_db_string(),
                now,
                report.total_items.map(|t| t as i64),
                report.fetched as i64,
                report.failed_pages.len() as i64,
                report.skipped_documents as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Documents =====

    fn save_documents(&mut self, run_id: i64, records: &[DocumentRecord]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (id, code, subject, law_type, published_date, record, run_id, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    code = excluded.code,
                    subject = excluded.subject,
                    law_type = excluded.law_type,
                    published_date = excluded.published_date,
                    record = excluded.record,
                    run_id = excluded.run_id,
                    stored_at = excluded.stored_at",
            )?;

            for record in records {
                let json = serde_json::to_string(&record.to_json()?)?;
                stmt.execute(params![
                    record.id,
                    record.code,
                    record.subject,
                    record.law_type,
                    date_column(&record.published_date),
                    json,
                    run_id,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn get_document(&self, id: i64) -> StorageResult<Option<DocumentRecord>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM documents WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_documents_for_run(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
