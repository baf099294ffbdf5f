//! Detail fetching: one document id in, one normalized record (or nothing) out

use crate::config::Vars;
use crate::crawler::fetcher::LawClient;
use crate::record::DocumentRecord;
use serde_json::Value;

impl LawClient {
    /// Fetches and converts the detail record for one document
    ///
    /// Request failures, empty responses and conversion failures are logged
    /// with the document id and yield `None`; they never affect other ids.
    pub async fn fetch_detail(&self, law_id: i64) -> Option<DocumentRecord> {
        let vars = Vars::new().set("law_id", law_id);
        let raw = match self.request(&self.detail, &vars).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(law_id, error = %e, "Detail request failed");
                return None;
            }
        };

        if is_empty_payload(&raw) {
            tracing::debug!(law_id, "Empty detail response");
            return None;
        }

        match DocumentRecord::from_raw(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(law_id, error = %e, "Skipping document that failed conversion");
                None
            }
        }
    }
}

fn is_empty_payload(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Endpoint, EndpointSet, HttpConfig, LAW_DETAIL, LAW_SEARCH};
    use crate::crawler::build_http_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LawClient {
        let mut endpoints = EndpointSet::default();
        endpoints.insert(LAW_SEARCH, Endpoint::get(format!("{}/search", server.uri())));
        endpoints.insert(
            LAW_DETAIL,
            Endpoint::get(format!("{}/detail", server.uri())).with_param("LawID", "{law_id}"),
        );
        LawClient::new(build_http_client(&HttpConfig::default()).unwrap(), endpoints).unwrap()
    }

    async fn mount_detail(server: &MockServer, law_id: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/detail"))
            .and(query_param("LawID", law_id))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn test_is_empty_payload() {
        assert!(is_empty_payload(&json!(null)));
        assert!(is_empty_payload(&json!({})));
        assert!(is_empty_payload(&json!([])));
        assert!(!is_empty_payload(&json!({ "Document": {} })));
    }

    #[tokio::test]
    async fn test_fetch_detail_success() {
        let server = MockServer::start().await;
        mount_detail(
            &server,
            "11",
            ResponseTemplate::new(200).set_body_json(json!({
                "Document": { "LawID": 11, "News_Code": "11/2021/TT-BTC" },
                "ContentVN": "body"
            })),
        )
        .await;

        let record = client_for(&server).fetch_detail(11).await.unwrap();
        assert_eq!(record.id, 11);
        assert_eq!(record.code, "11/2021/TT-BTC");
        assert_eq!(record.content, "body");
    }

    #[tokio::test]
    async fn test_fetch_detail_missing_code_is_skipped() {
        let server = MockServer::start().await;
        mount_detail(
            &server,
            "12",
            ResponseTemplate::new(200).set_body_json(json!({ "Document": { "LawID": 12 } })),
        )
        .await;

        assert!(client_for(&server).fetch_detail(12).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_detail_http_error_is_skipped() {
        let server = MockServer::start().await;
        mount_detail(&server, "13", ResponseTemplate::new(500)).await;

        assert!(client_for(&server).fetch_detail(13).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_detail_null_body_is_skipped() {
        let server = MockServer::start().await;
        mount_detail(&server, "14", ResponseTemplate::new(200).set_body_string("null")).await;

        assert!(client_for(&server).fetch_detail(14).await.is_none());
    }
}
