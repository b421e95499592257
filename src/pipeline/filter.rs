//! Filter engine
//!
//! Narrows raw records with the predicates configured on an export. Each
//! configured dimension must match (AND); within a multi-value dimension any
//! listed value matches (OR). Unconfigured dimensions let everything through.

use serde_json::Value;

use crate::models::record::{field_date, field_list, field_number, field_text};
use crate::models::{ExportFilters, FilterValue, Record};

/// Field names the built-in dimensions read
pub mod fields {
    pub const DATE: &str = "date";
    pub const CATEGORY: &str = "category";
    pub const ACCOUNT: &str = "account";
    pub const TAGS: &str = "tags";
    pub const STATUS: &str = "status";
    pub const AMOUNT: &str = "amount";
}

/// Keep the records that satisfy every configured filter, in input order
pub fn apply_filters<'a>(records: &'a [Record], filters: &ExportFilters) -> Vec<&'a Record> {
    records.iter().filter(|r| matches_filters(r, filters)).collect()
}

/// Check a single record against the filters
pub fn matches_filters(record: &Record, filters: &ExportFilters) -> bool {
    if let Some(range) = &filters.date_range {
        match field_date(record, fields::DATE) {
            Some(date) if range.contains(date) => {}
            _ => return false,
        }
    }

    if !matches_any(record, fields::CATEGORY, filters.categories.as_deref()) {
        return false;
    }
    if !matches_any(record, fields::ACCOUNT, filters.accounts.as_deref()) {
        return false;
    }
    if !matches_any(record, fields::STATUS, filters.status.as_deref()) {
        return false;
    }

    if let Some(tags) = filters.tags.as_deref().filter(|t| !t.is_empty()) {
        let record_tags = field_list(record, fields::TAGS);
        if !record_tags.iter().any(|t| tags.contains(t)) {
            return false;
        }
    }

    if let Some(range) = &filters.amount_range {
        match field_number(record, fields::AMOUNT) {
            Some(amount) if range.contains(amount) => {}
            _ => return false,
        }
    }

    filters
        .custom
        .iter()
        .filter(|(_, value)| !value.is_blank())
        .all(|(key, value)| matches_custom(record, key, value))
}

fn matches_any(record: &Record, key: &str, allowed: Option<&[String]>) -> bool {
    match allowed {
        None | Some([]) => true,
        Some(allowed) => field_text(record, key).is_some_and(|v| allowed.contains(&v)),
    }
}

fn matches_custom(record: &Record, key: &str, expected: &FilterValue) -> bool {
    match expected {
        FilterValue::Text(text) => field_text(record, key).as_deref() == Some(text.as_str()),
        FilterValue::Number(n) => field_number(record, key) == Some(*n),
        FilterValue::Bool(b) => match record.get(key) {
            Some(Value::Bool(actual)) => actual == b,
            Some(Value::String(s)) => s.parse::<bool>().ok() == Some(*b),
            _ => false,
        },
        FilterValue::OneOf(options) => {
            field_text(record, key).is_some_and(|v| options.contains(&v))
        }
    }
}
