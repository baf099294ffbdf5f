//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the search and detail endpoints
//! and run the full crawl cycle end-to-end.

use chrono::NaiveDate;
use lexcrawl::config::{parse_config, Config};
use lexcrawl::crawler::{run_crawl, CancelToken, Coordinator, CrawlParams, LawClient};
use lexcrawl::output::read_json;
use lexcrawl::storage::{RunStatus, SqliteStorage, Storage};
use serde_json::json;
use std::collections::HashSet;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves a detail payload for every `LawID`
///
/// Ids in `missing` get a 404; ids in `without_code` get a payload that has no
/// `News_Code` and so fails record conversion.
#[derive(Default)]
struct DetailResponder {
    missing: HashSet<i64>,
    without_code: HashSet<i64>,
    cancel_at: Option<(i64, CancelToken)>,
}

impl DetailResponder {
    fn all() -> Self {
        Self::default()
    }

    fn missing(ids: &[i64]) -> Self {
        Self {
            missing: ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn without_code(mut self, ids: &[i64]) -> Self {
        self.without_code.extend(ids.iter().copied());
        self
    }

    fn cancelling_at(law_id: i64, token: CancelToken) -> Self {
        Self {
            cancel_at: Some((law_id, token)),
            ..Self::default()
        }
    }
}

impl Respond for DetailResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let law_id = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "LawID")
            .and_then(|(_, v)| v.parse::<i64>().ok());

        let Some(law_id) = law_id else {
            return ResponseTemplate::new(400);
        };

        if let Some((at, token)) = &self.cancel_at {
            if *at == law_id {
                token.cancel();
            }
        }

        if self.missing.contains(&law_id) {
            return ResponseTemplate::new(404);
        }

        if self.without_code.contains(&law_id) {
            return ResponseTemplate::new(200).set_body_json(json!({
                "Document": { "LawID": law_id, "News_Subject": "Bản nháp" },
                "ContentVN": ""
            }));
        }

        ResponseTemplate::new(200).set_body_json(json!({
            "Document": {
                "LawID": law_id,
                "News_Code": format!("{}/2023/TT-BTC", law_id),
                "News_Subject": format!("Thông tư số {}", law_id),
                "News_Date": "/Date(1685577600000)/",
                "LawType": "Thông tư",
                "LawOrganizationIds": "3,4"
            },
            "ContentVN": format!("<p>Điều 1. Document {}</p>", law_id)
        }))
    }
}

fn config_for(server: &MockServer, extra: &str) -> Config {
    let toml = format!(
        r#"
{extra}

[endpoints.law-search]
url = "{uri}/search"
method = "POST"
body = {{ bday = "{{start_date}}", eday = "{{end_date}}", page = "{{page}}", pageSize = 20 }}

[endpoints.law-detail]
url = "{uri}/detail"
params = {{ LawID = "{{law_id}}" }}
"#,
        uri = server.uri(),
        extra = extra
    );
    parse_config(&toml).expect("test config is valid")
}

fn search_body(total: u64, ids: impl IntoIterator<Item = i64>) -> serde_json::Value {
    let documents: Vec<_> = ids.into_iter().map(|id| json!({ "LawID": id })).collect();
    json!({ "Data": { "TotalItems": total, "Documents": documents } })
}

async fn mount_search_page(server: &MockServer, page: u32, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "page": page })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer, responder: DetailResponder) {
    Mock::given(method("GET"))
        .and(path("/detail"))
        .respond_with(responder)
        .mount(server)
        .await;
}

/// Mounts a 45-item window: pages of ids 1..=20, 21..=40 and 41..=45
async fn mount_45_items(server: &MockServer) {
    mount_search_page(
        server,
        1,
        ResponseTemplate::new(200).set_body_json(search_body(45, 1..=20)),
    )
    .await;
    mount_search_page(
        server,
        2,
        ResponseTemplate::new(200).set_body_json(search_body(45, 21..=40)),
    )
    .await;
    mount_search_page(
        server,
        3,
        ResponseTemplate::new(200).set_body_json(search_body(45, 41..=45)),
    )
    .await;
}

fn window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
    )
}

fn coordinator(config: &Config, num_workers: usize) -> Coordinator {
    Coordinator::new(LawClient::from_config(config).unwrap(), num_workers)
}

#[tokio::test]
async fn test_full_crawl_45_items() {
    let server = MockServer::start().await;
    mount_45_items(&server).await;
    mount_details(&server, DetailResponder::all()).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 8).crawl(start, end).await;

    let ids: Vec<i64> = output.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=45).collect::<Vec<_>>());

    let report = &output.report;
    assert_eq!(report.total_items, Some(45));
    assert_eq!(report.page_count, 3);
    assert_eq!(report.fetched, 45);
    assert!(report.failed_pages.is_empty());
    assert!(!report.cancelled);
    assert!(report.is_complete());

    let first = &output.records[0];
    assert_eq!(first.code, "1/2023/TT-BTC");
    assert_eq!(first.law_type, "Thông tư");
}

#[tokio::test]
async fn test_output_independent_of_worker_count() {
    let server = MockServer::start().await;
    mount_45_items(&server).await;
    mount_details(&server, DetailResponder::all()).await;

    let config = config_for(&server, "");
    let (start, end) = window();

    let sequential = coordinator(&config, 1).crawl(start, end).await;
    let parallel = coordinator(&config, 8).crawl(start, end).await;

    assert_eq!(sequential.records.len(), 45);
    assert_eq!(sequential.records, parallel.records);
}

#[tokio::test]
async fn test_failed_detail_skips_only_that_document() {
    let server = MockServer::start().await;
    mount_search_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(search_body(3, [1, 2, 3])),
    )
    .await;
    mount_details(&server, DetailResponder::missing(&[2])).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 4).crawl(start, end).await;

    let ids: Vec<i64> = output.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(output.report.skipped_documents, 1);
    assert!(output.report.failed_pages.is_empty());
}

#[tokio::test]
async fn test_unconvertible_detail_skips_only_that_document() {
    let server = MockServer::start().await;
    mount_search_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(search_body(4, [1, 2, 3, 4])),
    )
    .await;
    mount_details(&server, DetailResponder::missing(&[4]).without_code(&[2])).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 4).crawl(start, end).await;

    let ids: Vec<i64> = output.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(output.report.skipped_documents, 2);
    assert!(output.report.failed_pages.is_empty());
}

#[tokio::test]
async fn test_later_page_without_total_is_still_crawled() {
    let server = MockServer::start().await;
    mount_search_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(search_body(25, 1..=20)),
    )
    .await;
    mount_search_page(
        &server,
        2,
        ResponseTemplate::new(200).set_body_json(json!({
            "Data": { "Documents": [{ "LawID": 21 }, { "LawID": 22 }] }
        })),
    )
    .await;
    mount_details(&server, DetailResponder::all()).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 8).crawl(start, end).await;

    assert_eq!(output.records.len(), 22);
    assert_eq!(output.records[21].id, 22);
    assert!(output.report.failed_pages.is_empty());
}

#[tokio::test]
async fn test_huge_reported_total_does_not_preallocate() {
    let server = MockServer::start().await;
    mount_search_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(search_body(4_000_000_000, 1..=20)),
    )
    .await;
    mount_details(&server, DetailResponder::all()).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let crawler = coordinator(&config, 8);
    crawler.cancel_token().cancel();

    let output = crawler.crawl(start, end).await;

    assert!(output.records.is_empty());
    assert!(output.report.cancelled);
    assert_eq!(output.report.total_items, Some(4_000_000_000));
}

#[tokio::test]
async fn test_failed_page_search_skips_only_that_page() {
    let server = MockServer::start().await;
    mount_search_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(search_body(45, 1..=20)),
    )
    .await;
    mount_search_page(&server, 2, ResponseTemplate::new(500)).await;
    mount_search_page(
        &server,
        3,
        ResponseTemplate::new(200).set_body_json(search_body(45, 41..=45)),
    )
    .await;
    mount_details(&server, DetailResponder::all()).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 8).crawl(start, end).await;

    let ids: Vec<i64> = output.records.iter().map(|r| r.id).collect();
    let expected: Vec<i64> = (1..=20).chain(41..=45).collect();
    assert_eq!(ids, expected);
    assert_eq!(output.report.failed_pages, vec![2]);
    assert_eq!(output.report.fetched, 25);
    assert!(!output.report.is_complete());
}

#[tokio::test]
async fn test_initial_search_failure_yields_empty_output() {
    let server = MockServer::start().await;
    mount_search_page(&server, 1, ResponseTemplate::new(503)).await;
    mount_details(&server, DetailResponder::all()).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 8).crawl(start, end).await;

    assert!(output.records.is_empty());
    assert_eq!(output.report.total_items, None);
    assert_eq!(output.report.page_count, 0);
}

#[tokio::test]
async fn test_empty_window() {
    let server = MockServer::start().await;
    mount_search_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(search_body(0, [])),
    )
    .await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 8).crawl(start, end).await;

    assert!(output.records.is_empty());
    assert_eq!(output.report.total_items, Some(0));
    assert_eq!(output.report.page_count, 0);
    assert!(output.report.is_complete());
}

#[tokio::test]
async fn test_cancel_before_dispatch() {
    let server = MockServer::start().await;
    mount_45_items(&server).await;
    mount_details(&server, DetailResponder::all()).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let crawler = coordinator(&config, 8);
    crawler.cancel_token().cancel();

    let output = crawler.crawl(start, end).await;

    assert!(output.records.is_empty());
    assert!(output.report.cancelled);
    assert_eq!(output.report.total_items, Some(45));
}

#[tokio::test]
async fn test_cancel_mid_page_keeps_fetched_records() {
    let server = MockServer::start().await;
    mount_45_items(&server).await;

    let cancel = CancelToken::new();
    mount_details(&server, DetailResponder::cancelling_at(3, cancel.clone())).await;

    let config = config_for(&server, "");
    let (start, end) = window();
    let output = coordinator(&config, 1)
        .with_cancel_token(cancel)
        .crawl(start, end)
        .await;

    let ids: Vec<i64> = output.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(output.report.cancelled);
    assert!(!output.report.is_complete());
}

#[tokio::test]
async fn test_run_crawl_writes_json_and_database() {
    let server = MockServer::start().await;
    mount_45_items(&server).await;
    mount_details(&server, DetailResponder::missing(&[44])).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let json_path = temp_dir.path().join("out/laws.json");
    let db_path = temp_dir.path().join("laws.db");
    let config = config_for(
        &server,
        &format!(
            "[output]\njson-path = {:?}\ndatabase-path = {:?}\n",
            json_path.to_string_lossy(),
            db_path.to_string_lossy()
        ),
    );

    let (start, end) = window();
    let params = CrawlParams {
        num_workers: 4,
        output_path: json_path.clone(),
        start_date: start,
        end_date: end,
    };

    let report = run_crawl(&config, "test_hash", &params, CancelToken::new())
        .await
        .unwrap();
    assert_eq!(report.fetched, 44);
    assert_eq!(report.skipped_documents, 1);

    let written = read_json(&json_path).unwrap();
    assert_eq!(written.len(), 44);
    assert_eq!(written[0].id, 1);
    assert_eq!(written[43].id, 45);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_documents().unwrap(), 44);
    assert!(storage.get_document(44).unwrap().is_none());
    assert_eq!(storage.get_document(45).unwrap().unwrap().code, "45/2023/TT-BTC");

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test_hash");
    assert_eq!(run.fetched_items, Some(44));
    assert_eq!(run.total_items, Some(45));
}

#[tokio::test]
async fn test_run_crawl_rejects_zero_workers() {
    let server = MockServer::start().await;
    let config = config_for(&server, "");
    let temp_dir = tempfile::tempdir().unwrap();
    let (start, end) = window();

    let params = CrawlParams {
        num_workers: 0,
        output_path: temp_dir.path().join("laws.json"),
        start_date: start,
        end_date: end,
    };

    let result = run_crawl(&config, "h", &params, CancelToken::new()).await;
    assert!(result.is_err());
    assert!(!params.output_path.exists());
}
