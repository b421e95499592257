//! Filter model
//!
//! Describes which raw records take part in an export. Every dimension is
//! optional and all present dimensions combine with AND.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Check whether a date falls inside the range (both bounds inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Inclusive bounds on the absolute value of a record's amount
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmountRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AmountRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Check an amount against the range, comparing its absolute value
    pub fn contains(&self, amount: f64) -> bool {
        let magnitude = amount.abs();
        self.min.map_or(true, |min| magnitude >= min)
            && self.max.map_or(true, |max| magnitude <= max)
    }
}

/// Value of a custom exact-match filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    /// Field must equal this string
    Text(String),
    /// Field must equal this number
    Number(f64),
    /// Field must equal this boolean
    Bool(bool),
    /// Field must equal one of these strings
    OneOf(Vec<String>),
}

impl FilterValue {
    /// Empty text and empty option lists do not constrain anything
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::OneOf(options) => options.is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

/// Set of optional filter predicates applied before projection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_range: Option<AmountRange>,

    /// Arbitrary field -> value exact matches
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, FilterValue>,
}

impl ExportFilters {
    /// Filters that let every record through
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if no dimension is configured
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
