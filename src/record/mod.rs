//! Normalized document records
//!
//! A [`DocumentRecord`] is built from one raw detail payload by
//! [`DocumentRecord::from_raw`] and is immutable afterwards. Only `id` and
//! `code` are required; everything else falls back to an empty value so that
//! partial upstream data never costs a whole record.

mod catalog;
pub mod dates;

pub use catalog::{LawOrganization, LawStatus, QuestionAnswerPair};

use crate::RecordError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A date field that upstream sometimes sends in an unparseable form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Date(NaiveDate),
    Raw(String),
}

/// Issuing organizations: a list of ids, or the raw string when it cannot be split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrganizationIds {
    Ids(Vec<i64>),
    Raw(String),
}

impl Default for OrganizationIds {
    fn default() -> Self {
        Self::Ids(Vec::new())
    }
}

/// A legal field (domain) a document is classified under
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawField {
    pub field_id: i64,
    pub field_url: String,
    pub field_value: i64,
    pub field_name: String,
}

/// The normalized unit of crawl output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: i64,
    pub code: String,
    pub subject: String,
    pub description: String,
    pub published_date: Option<DateValue>,
    pub effective_date: Option<DateValue>,
    pub expiry_date: Option<DateValue>,
    pub fields: Vec<LawField>,
    pub organization_ids: OrganizationIds,
    pub law_type: String,
    pub content: String,
}

impl DocumentRecord {
    /// Converts a raw detail payload
    ///
    /// The payload looks like `{"Document": {...metadata...}, "ContentVN": "..."}`.
    ///
    /// # Errors
    ///
    /// [`RecordError::MissingField`] when `Document`, `LawID` or `News_Code` is
    /// absent, [`RecordError::InvalidField`] when `LawID` is not an integer.
    pub fn from_raw(raw: &Value) -> Result<Self, RecordError> {
        let document = raw
            .get("Document")
            .filter(|d| d.is_object())
            .ok_or(RecordError::MissingField("Document"))?;

        let id = match document.get("LawID") {
            None | Some(Value::Null) => return Err(RecordError::MissingField("LawID")),
            Some(v) => as_i64(v).ok_or_else(|| RecordError::InvalidField {
                field: "LawID",
                message: format!("expected an integer, got {}", v),
            })?,
        };

        let code = string_field(document, "News_Code");
        if code.trim().is_empty() {
            return Err(RecordError::MissingField("News_Code"));
        }

        Ok(Self {
            id,
            code,
            subject: string_field(document, "News_Subject"),
            description: string_field(document, "SEO_Description"),
            published_date: date_field(document, "News_Date"),
            effective_date: date_field(document, "News_EffectDate"),
            expiry_date: date_field(document, "News_Effectless"),
            fields: document
                .get("LawFields")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(law_field).collect())
                .unwrap_or_default(),
            organization_ids: document
                .get("LawOrganizationIds")
                .map(organization_ids)
                .unwrap_or_default(),
            law_type: string_field(document, "LawType"),
            content: string_field(raw, "ContentVN"),
        })
    }

    /// Serializes to a plain JSON structure for the persistence layer
    ///
    /// Nested `fields` and `organizationIds` become ordinary arrays and maps.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Reads a string field, coercing numbers and defaulting to empty
pub(crate) fn string_field(object: &Value, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Reads an integer from a number or a numeric string
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn int_field(object: &Value, key: &str) -> i64 {
    object.get(key).and_then(as_i64).unwrap_or_default()
}

fn date_field(object: &Value, key: &str) -> Option<DateValue> {
    object.get(key).and_then(dates::parse_date_value)
}

fn law_field(raw: &Value) -> Option<LawField> {
    if !raw.is_object() {
        return None;
    }
    Some(LawField {
        field_id: int_field(raw, "Field_ID"),
        field_url: string_field(raw, "LawFieldUrl"),
        field_value: int_field(raw, "Field_Value"),
        field_name: string_field(raw, "Field_Name"),
    })
}

fn organization_ids(raw: &Value) -> OrganizationIds {
    match raw {
        Value::Array(items) => OrganizationIds::Ids(items.iter().filter_map(as_i64).collect()),
        Value::Number(_) => OrganizationIds::Ids(as_i64(raw).into_iter().collect()),
        Value::String(s) => {
            let parts: Vec<&str> = s
                .split([',', ';'])
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            let ids: Option<Vec<i64>> = parts.iter().map(|p| p.parse().ok()).collect();
            match ids {
                Some(ids) => OrganizationIds::Ids(ids),
                None => OrganizationIds::Raw(s.clone()),
            }
        }
        _ => OrganizationIds::default(),
    }
}
