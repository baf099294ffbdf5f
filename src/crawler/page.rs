//! Search pagination and per-page assembly

use crate::config::Vars;
use crate::crawler::coordinator::CancelToken;
use crate::crawler::fetcher::LawClient;
use crate::record::{as_i64, DocumentRecord};
use crate::RequestError;
use chrono::NaiveDate;
use serde_json::Value;

/// Number of documents per search page; fixed by the upstream API
pub const PAGE_SIZE: u64 = 20;

/// Number of pages needed to cover `total_items` results
pub fn page_count(total_items: u64) -> u32 {
    u32::try_from(total_items.div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX)
}

/// One search request: a date window and a 1-based page number
///
/// Queries are plain values; [`SearchQuery::for_page`] produces the query for
/// another page without touching the original, so concurrent pages never share
/// mutable request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub page: u32,
}

impl SearchQuery {
    /// Creates a query for page 1 of the given window
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            page: 1,
        }
    }

    pub fn for_page(&self, page: u32) -> Self {
        Self { page, ..*self }
    }

    /// Template variables for the search endpoint
    pub fn vars(&self) -> Vars {
        Vars::new()
            .set("start_date", self.start_date.format("%Y-%m-%d").to_string())
            .set("end_date", self.end_date.format("%Y-%m-%d").to_string())
            .set("page", self.page)
            .set("page_size", PAGE_SIZE)
    }
}

/// The useful part of a search response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Only the first search needs it; later pages may omit it
    pub total_items: Option<u64>,
    pub document_ids: Vec<i64>,
}

impl SearchResult {
    /// Reads `Data.TotalItems` and `Data.Documents[].LawID`
    ///
    /// Returns `None` when there is no `Data` object; documents without an id
    /// are dropped.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let data = raw.get("Data").filter(|d| d.is_object())?;
        let total_items = data.get("TotalItems").and_then(as_i64);
        let document_ids = data
            .get("Documents")
            .and_then(Value::as_array)
            .map(|docs| {
                docs.iter()
                    .filter_map(|doc| doc.get("LawID").and_then(as_i64))
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            total_items: total_items.map(|t| u64::try_from(t).unwrap_or(0)),
            document_ids,
        })
    }
}

/// How a page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Every id on the page was attempted
    Complete,
    /// The search request for the page failed; no ids were known
    SearchFailed,
    /// Cancellation was requested while the page was in progress
    Cancelled,
}

/// Records produced by one page, in search order
#[derive(Debug, Clone)]
pub struct PageFetch {
    pub page: u32,
    pub records: Vec<DocumentRecord>,
    /// Ids whose detail could not be fetched or converted
    pub skipped: usize,
    pub status: PageStatus,
}

impl PageFetch {
    fn search_failed(page: u32) -> Self {
        Self {
            page,
            records: Vec::new(),
            skipped: 0,
            status: PageStatus::SearchFailed,
        }
    }
}

impl LawClient {
    /// Runs a search and extracts the total and the ids on the page
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, RequestError> {
        let raw = self.request(&self.search, &query.vars()).await?;
        SearchResult::from_raw(&raw).ok_or_else(|| RequestError::Decode {
            url: self.search.url.clone(),
            message: "response has no Data object".to_string(),
        })
    }

    /// Fetches one page of results and the detail record of every id on it
    ///
    /// Details are fetched one after another; records keep the order of the
    /// ids in the search response. A failed search yields an empty page.
    pub async fn fetch_page(&self, page: u32, query: &SearchQuery, cancel: &CancelToken) -> PageFetch {
        let query = query.for_page(page);
        let result = match self.search(&query).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(page, error = %e, "Search failed, skipping page");
                return PageFetch::search_failed(page);
            }
        };

        let mut records = Vec::with_capacity(result.document_ids.len());
        let mut skipped = 0;
        for law_id in result.document_ids {
            if cancel.is_cancelled() {
                tracing::debug!(page, "Cancelled before fetching document {}", law_id);
                return PageFetch {
                    page,
                    records,
                    skipped,
                    status: PageStatus::Cancelled,
                };
            }

            match self.fetch_detail(law_id).await {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        tracing::debug!(page, fetched = records.len(), skipped, "Page complete");
        PageFetch {
            page,
            records,
            skipped,
            status: PageStatus::Complete,
        }
    }
}
