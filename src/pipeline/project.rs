//! Column projector and formatter
//!
//! Turns filtered records into processed rows: one entry per visible
//! column, keyed by column title, in column order, holding the value
//! rendered for the column's type.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use serde_json::Value;

use crate::config::LocaleSettings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::record::{parse_datetime, value_as_number};
use crate::models::{ColumnType, ExportColumn, ExportFormatting, ProcessedRow, Record};

use super::locale::{format_percentage, NumberPattern};

/// Per-column rendering rule, prepared once per run
#[derive(Debug, Clone)]
enum CellFormat {
    Text,
    Number(NumberPattern),
    Currency(NumberPattern),
    Date(String),
    Boolean,
    Percentage,
}

impl CellFormat {
    fn for_column(column: &ExportColumn, formatting: &ExportFormatting) -> LedgerResult<Self> {
        let pattern = column.format.as_deref();
        Ok(match column.column_type {
            ColumnType::Text => Self::Text,
            ColumnType::Number => {
                Self::Number(NumberPattern::parse(pattern.unwrap_or(&formatting.number_format)))
            }
            ColumnType::Currency => Self::Currency(NumberPattern::parse(
                pattern.unwrap_or(&formatting.currency_format),
            )),
            ColumnType::Date => {
                let pattern = pattern.unwrap_or(&formatting.date_format);
                let mut sample = String::new();
                let renders = !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
                    && write!(sample, "{}", NaiveDateTime::default().format(pattern)).is_ok();
                if !renders {
                    return Err(LedgerError::Validation(format!(
                        "Invalid date format '{}' for column '{}'",
                        pattern, column.key
                    )));
                }
                Self::Date(pattern.to_string())
            }
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Percentage => Self::Percentage,
        })
    }

    /// Render one source value
    ///
    /// Missing values become `""` for dates and stay null otherwise. Values
    /// that don't fit the column type are passed through unchanged.
    fn render(&self, value: Option<&Value>, locale: &LocaleSettings) -> LedgerResult<Value> {
        let value = match value {
            None | Some(Value::Null) => {
                return Ok(match self {
                    Self::Date(_) => Value::String(String::new()),
                    _ => Value::Null,
                });
            }
            Some(value) => value,
        };

        let rendered = match self {
            Self::Text => None,
            Self::Number(pattern) | Self::Currency(pattern) => {
                value_as_number(value).map(|n| pattern.format(n, locale))
            }
            Self::Percentage => value_as_number(value).map(|n| format_percentage(n, locale)),
            Self::Boolean => truthiness(value).map(|b| {
                if b {
                    locale.yes_label.clone()
                } else {
                    locale.no_label.clone()
                }
            }),
            Self::Date(pattern) => match value {
                Value::String(s) => match parse_datetime(s) {
                    Some(datetime) => {
                        let mut out = String::new();
                        write!(out, "{}", datetime.format(pattern)).map_err(|_| {
                            LedgerError::Validation(format!("Invalid date format '{}'", pattern))
                        })?;
                        Some(out)
                    }
                    None => None,
                },
                _ => None,
            },
        };

        Ok(rendered.map(Value::String).unwrap_or_else(|| value.clone()))
    }
}

fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => s.trim().to_lowercase().parse::<bool>().ok(),
        _ => None,
    }
}

/// Project records onto the visible columns, formatting each value
///
/// Rows are keyed by column title, so visible titles must be unique.
pub fn project(
    records: &[&Record],
    columns: &[ExportColumn],
    formatting: &ExportFormatting,
    locale: &LocaleSettings,
) -> LedgerResult<Vec<ProcessedRow>> {
    let prepared = columns
        .iter()
        .filter(|c| c.visible)
        .map(|c| CellFormat::for_column(c, formatting).map(|f| (c, f)))
        .collect::<LedgerResult<Vec<_>>>()?;

    let mut titles = HashSet::new();
    if let Some((column, _)) = prepared.iter().find(|(c, _)| !titles.insert(c.title.as_str())) {
        return Err(LedgerError::Validation(format!(
            "Duplicate column title '{}' (key '{}')",
            column.title, column.key
        )));
    }

    records
        .iter()
        .map(|record| {
            let mut row = ProcessedRow::new();
            for (column, format) in &prepared {
                let value = format.render(record.get(&column.key), locale)?;
                row.insert(column.title.clone(), value);
            }
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn project_default(
        records: &[&Record],
        columns: &[ExportColumn],
    ) -> LedgerResult<Vec<ProcessedRow>> {
        project(
            records,
            columns,
            &ExportFormatting::default(),
            &LocaleSettings::default(),
        )
    }

    fn columns() -> Vec<ExportColumn> {
        vec![
            ExportColumn::new("date", "Date", ColumnType::Date),
            ExportColumn::new("description", "Description", ColumnType::Text),
            ExportColumn::new("amount", "Amount", ColumnType::Currency),
            ExportColumn::new("qty", "Quantity", ColumnType::Number),
            ExportColumn::new("share", "Share", ColumnType::Percentage),
            ExportColumn::new("cleared", "Cleared", ColumnType::Boolean),
            ExportColumn::new("secret", "Secret", ColumnType::Text).hidden(),
        ]
    }

    #[test]
    fn test_formats_each_type() {
        let r = record(json!({
            "date": "2025-01-15", "description": "Coffee", "amount": -1234.5,
            "qty": 12345.678, "share": 0.125, "cleared": true, "secret": "x"
        }));
        let rows = project_default(&[&r], &columns()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["Date"], json!("2025-01-15"));
        assert_eq!(row["Description"], json!("Coffee"));
        assert_eq!(row["Amount"], json!("-$1,234.50"));
        assert_eq!(row["Quantity"], json!("12,345.68"));
        assert_eq!(row["Share"], json!("12.50%"));
        assert_eq!(row["Cleared"], json!("Yes"));
    }

    #[test]
    fn test_only_visible_columns_in_order() {
        let r = record(json!({"secret": "x"}));
        let rows = project_default(&[&r], &columns()).unwrap();
        let titles: Vec<_> = rows[0].keys().cloned().collect();
        assert_eq!(
            titles,
            vec!["Date", "Description", "Amount", "Quantity", "Share", "Cleared"]
        );
    }

    #[test]
    fn test_missing_values() {
        let r = record(json!({"description": null}));
        let rows = project_default(&[&r], &columns()).unwrap();
        let row = &rows[0];
        assert_eq!(row["Date"], json!(""));
        assert_eq!(row["Description"], Value::Null);
        assert_eq!(row["Amount"], Value::Null);
        assert_eq!(row["Cleared"], Value::Null);
    }

    #[test]
    fn test_mismatched_values_pass_through() {
        let r = record(json!({"date": "someday", "amount": "n/a", "description": 42}));
        let rows = project_default(&[&r], &columns()).unwrap();
        assert_eq!(rows[0]["Date"], json!("someday"));
        assert_eq!(rows[0]["Amount"], json!("n/a"));
        assert_eq!(rows[0]["Description"], json!(42));
    }

    #[test]
    fn test_formatting_patterns_and_locale() {
        let formatting = ExportFormatting {
            date_format: "%d/%m/%Y".into(),
            currency_format: "R$ #,##0.00".into(),
            ..ExportFormatting::default()
        };
        let locale = LocaleSettings {
            decimal_separator: ',',
            thousands_separator: '.',
            yes_label: "Sim".into(),
            no_label: "Não".into(),
        };
        let r = record(json!({
            "date": "2025-01-15T08:00:00Z", "amount": 1234.5, "cleared": false
        }));
        let rows = project(&[&r], &columns(), &formatting, &locale).unwrap();
        assert_eq!(rows[0]["Date"], json!("15/01/2025"));
        assert_eq!(rows[0]["Amount"], json!("R$ 1.234,50"));
        assert_eq!(rows[0]["Cleared"], json!("Não"));
    }

    #[test]
    fn test_column_format_overrides_default() {
        let columns =
            vec![ExportColumn::new("date", "Date", ColumnType::Date).with_format("%b %Y")];
        let r = record(json!({"date": "2025-03-02"}));
        let rows = project_default(&[&r], &columns).unwrap();
        assert_eq!(rows[0]["Date"], json!("Mar 2025"));
    }

    #[test]
    fn test_invalid_date_pattern_is_rejected() {
        let columns =
            vec![ExportColumn::new("date", "Date", ColumnType::Date).with_format("%Q")];
        let r = record(json!({"date": "2025-03-02"}));
        let err = project_default(&[&r], &columns).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_timezone_pattern_is_rejected_up_front() {
        let columns =
            vec![ExportColumn::new("date", "Date", ColumnType::Date).with_format("%Y %z")];
        let err = project_default(&[], &columns).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_date_pattern_with_time_of_day() {
        let columns = vec![
            ExportColumn::new("date", "Date", ColumnType::Date).with_format("%d/%m/%Y %H:%M")
        ];
        let timestamp = record(json!({"date": "2025-01-15T08:30:00Z"}));
        let bare = record(json!({"date": "2025-01-16"}));

        let rows = project_default(&[&timestamp, &bare], &columns).unwrap();
        assert_eq!(rows[0]["Date"], json!("15/01/2025 08:30"));
        assert_eq!(rows[1]["Date"], json!("16/01/2025 00:00"));
    }

    #[test]
    fn test_duplicate_titles_are_rejected() {
        let columns = vec![
            ExportColumn::new("amount", "Amount", ColumnType::Currency),
            ExportColumn::new("fee", "Amount", ColumnType::Currency),
        ];
        let r = record(json!({"amount": 1.0, "fee": 2.0}));
        let err = project_default(&[&r], &columns).unwrap_err();
        assert!(err.is_validation());

        let hidden = vec![columns[0].clone(), columns[1].clone().hidden()];
        assert!(project_default(&[&r], &hidden).is_ok());
    }
}
