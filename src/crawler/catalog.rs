//! Reference-data queries: statuses, organizations, related questions and
//! suggestions. Like the crawl itself these degrade to empty results when the
//! upstream call fails; only a missing endpoint definition is an error.

use crate::config::{
    Endpoint, Vars, LAW_ORGANIZATION, LAW_STATUS, QUESTIONS_BY_LAW, SUGGEST_BY_LAW,
};
use crate::crawler::fetcher::LawClient;
use crate::record::{LawOrganization, LawStatus, QuestionAnswerPair};
use crate::ConfigError;
use serde_json::Value;

/// Question categories served by the question endpoint
const QUESTION_TYPES: [i64; 2] = [1, 2];

impl LawClient {
    /// Lists every document status
    pub async fn fetch_statuses(&self) -> Result<Vec<LawStatus>, ConfigError> {
        let endpoint = self.endpoint(LAW_STATUS)?;
        let items = self.fetch_list(endpoint, &Vars::new()).await;
        Ok(items.iter().filter_map(LawStatus::from_raw).collect())
    }

    /// Lists every issuing organization
    pub async fn fetch_organizations(&self) -> Result<Vec<LawOrganization>, ConfigError> {
        let endpoint = self.endpoint(LAW_ORGANIZATION)?;
        let items = self.fetch_list(endpoint, &Vars::new()).await;
        Ok(items.iter().filter_map(LawOrganization::from_raw).collect())
    }

    /// Collects the Q&A articles linked to a document, across both question types
    ///
    /// Many documents have no questions at all; upstream answers those with an
    /// error, which shows up here as an empty list.
    pub async fn fetch_related_questions(
        &self,
        law_id: i64,
    ) -> Result<Vec<QuestionAnswerPair>, ConfigError> {
        let endpoint = self.endpoint(QUESTIONS_BY_LAW)?;
        let mut pairs = Vec::new();

        for question_type in QUESTION_TYPES {
            let vars = Vars::new()
                .set("law_id", law_id)
                .set("type", question_type);
            for group in self.fetch_list(endpoint, &vars).await {
                let Some(articles) = group.get("listBaiViet").and_then(Value::as_array) else {
                    continue;
                };
                pairs.extend(
                    articles
                        .iter()
                        .filter_map(|article| QuestionAnswerPair::from_article(law_id, article)),
                );
            }
        }

        Ok(pairs)
    }

    /// Returns the upstream's suggested related documents, as raw JSON
    pub async fn fetch_suggestions(&self, law_id: i64) -> Result<Option<Value>, ConfigError> {
        let endpoint = self.endpoint(SUGGEST_BY_LAW)?;
        let vars = Vars::new().set("law_id", law_id);
        match self.request(endpoint, &vars).await {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(law_id, error = %e, "Suggestion request failed");
                Ok(None)
            }
        }
    }

    async fn fetch_list(&self, endpoint: &Endpoint, vars: &Vars) -> Vec<Value> {
        match self.request(endpoint, vars).await {
            Ok(Value::Array(items)) => items,
            Ok(Value::Null) => Vec::new(),
            Ok(_) => {
                tracing::warn!(url = %endpoint.url, "Expected a JSON list");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "List request failed");
                Vec::new()
            }
        }
    }
}
