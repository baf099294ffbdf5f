//! Reference data served next to the documents: statuses, issuing
//! organizations and the Q&A articles linked to a document.

use crate::record::{int_field, string_field};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validity status of a document (in force, expired, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawStatus {
    pub status_id: i64,
    pub status_name: String,
    pub entity_state: i64,
}

impl LawStatus {
    pub fn from_raw(raw: &Value) -> Option<Self> {
        raw.get("Status_ID")?;
        Some(Self {
            status_id: int_field(raw, "Status_ID"),
            status_name: string_field(raw, "Status_Name"),
            entity_state: int_field(raw, "EntityState"),
        })
    }
}

/// An organization that issues documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawOrganization {
    pub org_id: i64,
    pub org_name: String,
    pub priority: i64,
    pub entity_state: i64,
}

impl LawOrganization {
    pub fn from_raw(raw: &Value) -> Option<Self> {
        raw.get("OrgID")?;
        Some(Self {
            org_id: int_field(raw, "OrgID"),
            org_name: string_field(raw, "OrgName"),
            priority: int_field(raw, "UuTien"),
            entity_state: int_field(raw, "EntityState"),
        })
    }
}

/// A question article answered with reference to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswerPair {
    pub law_id: i64,
    pub question: String,
    pub answer_content: String,
    pub answer_url: String,
}

impl QuestionAnswerPair {
    /// Builds a pair from one `listBaiViet` entry
    pub fn from_article(law_id: i64, raw: &Value) -> Option<Self> {
        let question = string_field(raw, "Title");
        if question.is_empty() {
            return None;
        }
        Some(Self {
            law_id,
            question,
            answer_content: String::new(),
            answer_url: string_field(raw, "Url"),
        })
    }
}
