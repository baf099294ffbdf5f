//! Date parsing for upstream payloads
//!
//! The API is not consistent about date formatting: the same field shows up as
//! a `/Date(ms)/` literal, an ISO date or date-time, a `dd/mm/yyyy` string or an
//! epoch number. Anything recognisable becomes a [`NaiveDate`], anything else is
//! kept verbatim as [`DateValue::Raw`].

use crate::record::DateValue;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;

/// Converts a raw JSON date field into a [`DateValue`]
///
/// `null`, missing and empty strings yield `None`.
pub fn parse_date_value(value: &Value) -> Option<DateValue> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(match parse_date_str(trimmed) {
                Some(date) => DateValue::Date(date),
                None => DateValue::Raw(s.clone()),
            })
        }
        Value::Number(n) => Some(match n.as_i64().and_then(|ms| from_millis(ms, None)) {
            Some(date) => DateValue::Date(date),
            None => DateValue::Raw(n.to_string()),
        }),
        _ => None,
    }
}

/// Parses the textual date forms the upstream is known to emit
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Some(inner) = s.strip_prefix("/Date(").and_then(|r| r.strip_suffix(")/")) {
        return parse_ms_literal(inner);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    // Date-times: only the calendar part matters
    if s.len() > 10 && s.is_char_boundary(10) {
        let (head, tail) = s.split_at(10);
        if tail.starts_with('T') || tail.starts_with(' ') {
            if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// Parses the inside of `/Date(1577811600000+0700)/`
fn parse_ms_literal(inner: &str) -> Option<NaiveDate> {
    let sign_at = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i);

    let (millis, offset) = match sign_at {
        Some(i) => (&inner[..i], parse_offset(&inner[i..])),
        None => (inner, None),
    };

    from_millis(millis.parse().ok()?, offset)
}

/// Parses `+0700` / `-0130` style offsets
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, digits) = s.split_at(1);
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    match sign {
        "+" => FixedOffset::east_opt(seconds),
        "-" => FixedOffset::west_opt(seconds),
        _ => None,
    }
}

fn from_millis(ms: i64, offset: Option<FixedOffset>) -> Option<NaiveDate> {
    let utc = DateTime::from_timestamp_millis(ms)?;
    Some(match offset {
        Some(offset) => utc.with_timezone(&offset).date_naive(),
        None => utc.date_naive(),
    })
}
