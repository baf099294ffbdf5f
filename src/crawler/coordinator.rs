//! Crawler coordinator - main crawl orchestration logic
//!
//! This module turns a date window into a complete, ordered collection of
//! documents:
//! - One search call discovers the total number of results
//! - Pages are dispatched over a fixed pool of workers
//! - Finished pages are merged by page number, never by arrival order
//! - A fetched/total tally is reported at the end

use crate::crawler::fetcher::LawClient;
use crate::crawler::page::{page_count, PageFetch, PageStatus, SearchQuery, SearchResult};
use crate::record::DocumentRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, Span};

/// Shared cancellation signal for a crawl
///
/// Checked before each page is dispatched and before each detail request.
/// Requests already in flight are allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Aggregate figures for one crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_workers: usize,

    /// Total reported by the first search; `None` if that search failed
    pub total_items: Option<u64>,
    pub page_count: u32,

    /// Records in the final output
    pub fetched: usize,

    /// Documents whose detail could not be fetched or converted
    pub skipped_documents: usize,

    /// Pages whose search failed or whose task died
    pub failed_pages: Vec<u32>,

    pub cancelled: bool,
    pub elapsed: Duration,
}

impl CrawlReport {
    fn new(start_date: NaiveDate, end_date: NaiveDate, num_workers: usize) -> Self {
        Self {
            start_date,
            end_date,
            num_workers,
            total_items: None,
            page_count: 0,
            fetched: 0,
            skipped_documents: 0,
            failed_pages: Vec::new(),
            cancelled: false,
            elapsed: Duration::ZERO,
        }
    }

    /// True when every reported item made it into the output
    pub fn is_complete(&self) -> bool {
        self.total_items == Some(self.fetched as u64) && !self.cancelled
    }
}

/// Result of a crawl: the ordered records and the figures behind them
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    pub records: Vec<DocumentRecord>,
    pub report: CrawlReport,
}

/// Main crawl coordinator
pub struct Coordinator {
    client: Arc<LawClient>,
    num_workers: usize,
    cancel: CancelToken,
    span: Span,
}

impl Coordinator {
    /// Creates a coordinator running at most `num_workers` pages at once
    ///
    /// A worker count of zero is treated as one.
    pub fn new(client: LawClient, num_workers: usize) -> Self {
        Self {
            client: Arc::new(client),
            num_workers: num_workers.max(1),
            cancel: CancelToken::new(),
            span: tracing::info_span!("crawl"),
        }
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Emits all crawl events under the given span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Crawls every document published in `[start_date, end_date]`
    ///
    /// # Algorithm
    ///
    /// 1. Search page 1 to learn the total number of items
    /// 2. If that search fails, return an empty output (not an error)
    /// 3. `page_count = ceil(total / 20)`
    /// 4. Run one page task per page number, at most `num_workers` at a time
    /// 5. Concatenate page records in ascending page order
    pub async fn crawl(&self, start_date: NaiveDate, end_date: NaiveDate) -> CrawlOutput {
        let started = Instant::now();
        let mut report = CrawlReport::new(start_date, end_date, self.num_workers);
        let query = SearchQuery::new(start_date, end_date);

        tracing::info!(
            parent: &self.span,
            "Crawling documents from {} to {} with {} workers",
            start_date,
            end_date,
            self.num_workers
        );

        let first = self
            .client
            .search(&query)
            .instrument(self.span.clone())
            .await;
        let total_items = match first {
            Ok(SearchResult {
                total_items: Some(total),
                ..
            }) => total,
            Ok(_) => {
                tracing::warn!(parent: &self.span, "Initial search has no TotalItems, nothing to crawl");
                report.elapsed = started.elapsed();
                return CrawlOutput {
                    records: Vec::new(),
                    report,
                };
            }
            Err(e) => {
                tracing::warn!(parent: &self.span, error = %e, "Initial search failed, nothing to crawl");
                report.elapsed = started.elapsed();
                return CrawlOutput {
                    records: Vec::new(),
                    report,
                };
            }
        };

        let pages = page_count(total_items);
        report.total_items = Some(total_items);
        report.page_count = pages;
        tracing::info!(parent: &self.span, total_items, pages, "Search window resolved");

        let (fetched_pages, dispatched) = self.dispatch_pages(&query, pages).await;

        for page in 1..=dispatched {
            match fetched_pages.get(&page) {
                Some(fetch) => {
                    match fetch.status {
                        PageStatus::SearchFailed => report.failed_pages.push(page),
                        PageStatus::Cancelled => report.cancelled = true,
                        PageStatus::Complete => {}
                    }
                    report.skipped_documents += fetch.skipped;
                }
                None => report.failed_pages.push(page),
            }
        }
        // Sized from what arrived; the upstream total is not trusted
        let arrived = fetched_pages.values().map(|p| p.records.len()).sum();
        let mut records = Vec::with_capacity(arrived);
        for (_, fetch) in fetched_pages {
            records.extend(fetch.records);
        }

        if dispatched < pages {
            report.cancelled = true;
        }
        report.fetched = records.len();
        report.elapsed = started.elapsed();

        tracing::info!(
            parent: &self.span,
            failed_pages = report.failed_pages.len(),
            skipped = report.skipped_documents,
            cancelled = report.cancelled,
            "Crawled {} / {} law documents in {:?}",
            report.fetched,
            total_items,
            report.elapsed
        );

        CrawlOutput { records, report }
    }

    /// Runs page tasks over the worker pool
    ///
    /// Returns the finished pages keyed by page number, and how many pages
    /// were dispatched (pages `1..=n`; fewer than requested after cancellation).
    async fn dispatch_pages(
        &self,
        query: &SearchQuery,
        pages: u32,
    ) -> (BTreeMap<u32, PageFetch>, u32) {
        let permits = Arc::new(Semaphore::new(self.num_workers));
        let mut tasks = JoinSet::new();
        let mut dispatched = 0;

        for page in 1..=pages {
            if self.cancel.is_cancelled() {
                tracing::info!(parent: &self.span, page, "Cancelled, not dispatching remaining pages");
                break;
            }

            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            // Waiting for a permit may have taken a while
            if self.cancel.is_cancelled() {
                tracing::info!(parent: &self.span, page, "Cancelled, not dispatching remaining pages");
                break;
            }

            let client = Arc::clone(&self.client);
            let cancel = self.cancel.clone();
            let query = *query;
            let page_span = tracing::debug_span!(parent: &self.span, "page", page);

            tasks.spawn(
                async move {
                    let _permit = permit;
                    client.fetch_page(page, &query, &cancel).await
                }
                .instrument(page_span),
            );
            dispatched = page;
        }

        let mut fetched = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(fetch) => {
                    fetched.insert(fetch.page, fetch);
                }
                Err(e) => {
                    tracing::error!(parent: &self.span, error = %e, "Page task failed");
                }
            }
        }

        (fetched, dispatched)
    }
}
