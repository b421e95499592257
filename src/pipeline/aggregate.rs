//! Summary row aggregation
//!
//! Statistics are computed from the already-formatted cell values, not from
//! the raw record fields: numbers are used directly and strings are parsed
//! back by stripping currency symbols and grouping. This reproduces how
//! summaries have always been computed, and it means a locale change can
//! change a total. Raw-value aggregation would be a behavior change.

use serde_json::{Number, Value};

use crate::config::LocaleSettings;
use crate::models::{Aggregation, ExportColumn, ProcessedRow};

use super::locale::parse_formatted;

/// Label written into the first visible column of the summary row
pub const SUMMARY_LABEL: &str = "TOTAL";

/// Build the summary row, or `None` when no visible column aggregates
///
/// Empty input yields 0 for `sum` and `count` and null for `avg`, `min`
/// and `max`.
pub fn summarize(
    rows: &[ProcessedRow],
    columns: &[ExportColumn],
    locale: &LocaleSettings,
) -> Option<ProcessedRow> {
    let visible: Vec<&ExportColumn> = columns.iter().filter(|c| c.visible).collect();
    if !visible.iter().any(|c| c.aggregation.is_some()) {
        return None;
    }

    let mut summary = ProcessedRow::new();
    for (index, column) in visible.iter().enumerate() {
        let cell = match column.aggregation {
            Some(aggregation) => aggregate_column(rows, &column.title, aggregation, locale),
            None if index == 0 => Value::String(SUMMARY_LABEL.to_string()),
            None => Value::String(String::new()),
        };
        summary.insert(column.title.clone(), cell);
    }

    Some(summary)
}

fn aggregate_column(
    rows: &[ProcessedRow],
    title: &str,
    aggregation: Aggregation,
    locale: &LocaleSettings,
) -> Value {
    let cells: Vec<&Value> = rows
        .iter()
        .filter_map(|row| row.get(title))
        .filter(|v| !v.is_null())
        .collect();
    let numbers: Vec<f64> = cells
        .iter()
        .filter_map(|v| numeric_value(v, locale))
        .collect();

    let statistic = match aggregation {
        Aggregation::Count => return Value::from(cells.len()),
        Aggregation::Sum => Some(numbers.iter().sum()),
        Aggregation::Avg if numbers.is_empty() => None,
        Aggregation::Avg => Some(numbers.iter().sum::<f64>() / numbers.len() as f64),
        Aggregation::Min => numbers.iter().copied().reduce(f64::min),
        Aggregation::Max => numbers.iter().copied().reduce(f64::max),
    };

    statistic
        .map(round_statistic)
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn numeric_value(value: &Value, locale: &LocaleSettings) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_formatted(s, locale),
        _ => None,
    }
}

/// Trim float noise such as 0.30000000000000004
fn round_statistic(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
