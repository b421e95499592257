//! Raw input records and processed output rows
//!
//! Records come from an external data-access layer as JSON objects; fields
//! are addressed purely by name.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

/// A raw domain record (transaction, account, budget or goal)
pub type Record = Map<String, Value>;

/// Column title -> formatted value, in output column order
pub type ProcessedRow = Map<String, Value>;

/// Read a field as text; numbers and booleans are rendered, null is absent
pub fn field_text(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a field as a number; numeric strings are accepted
pub fn field_number(record: &Record, key: &str) -> Option<f64> {
    value_as_number(record.get(key)?)
}

/// Read a field as a calendar date
pub fn field_date(record: &Record, key: &str) -> Option<NaiveDate> {
    match record.get(key)? {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Read a field as a list of strings (a lone string counts as one element)
pub fn field_list(record: &Record, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Interpret a JSON value as a number
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse `YYYY-MM-DD`, RFC 3339 timestamps, or naive `YYYY-MM-DDTHH:MM:SS`
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_datetime(s).map(|dt| dt.date())
}

/// Like [`parse_date`], keeping the time of day; a bare date is midnight
///
/// RFC 3339 timestamps keep the wall-clock time of their own offset.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Some(datetime.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
