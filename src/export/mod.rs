//! Export codecs for ledger-export
//!
//! Four independent serializers share one input shape, the processed rows:
//! - Excel: spreadsheet workbook (.xlsx)
//! - CSV: delimited text, every field quoted
//! - JSON: rows as a pretty-printed array
//! - XML: one element per row, fields named by column key
//!
//! The `bundle` module handles the separate concern of exchanging export
//! configurations themselves as JSON or YAML.

pub mod bundle;
pub mod csv;
pub mod json;
pub mod xlsx;
pub mod xml;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{ExportColumn, ExportFormat, ExportFormatting, Payload, ProcessedRow};

pub use bundle::{read_bundle, write_bundle, BundleFormat, ConfigBundle};

/// Everything a codec needs to encode one run
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    /// Name of the configuration being exported
    pub config_name: &'a str,
    /// Visible columns in output order
    pub columns: &'a [ExportColumn],
    pub rows: &'a [ProcessedRow],
    pub summary: Option<&'a ProcessedRow>,
    pub formatting: &'a ExportFormatting,
    pub generated_at: DateTime<Utc>,
}

/// Codec output
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub payload: Payload,
    pub filename: String,
}

/// Encode with the codec matching `format`
pub fn encode(format: &ExportFormat, request: &EncodeRequest<'_>) -> LedgerResult<Encoded> {
    let payload = match format {
        ExportFormat::Excel => xlsx::encode_xlsx(request)?,
        ExportFormat::Csv => csv::encode_csv(request)?,
        ExportFormat::Json => json::encode_json(request)?,
        ExportFormat::Xml => xml::encode_xml(request)?,
        ExportFormat::Unknown(name) => return Err(LedgerError::UnsupportedFormat(name.clone())),
    };

    Ok(Encoded {
        payload,
        filename: export_filename(request.config_name, format, request.generated_at),
    })
}

/// `<name>_<YYYYMMDD_HHMMSS>.<ext>` with the name reduced to safe characters
pub fn export_filename(config_name: &str, format: &ExportFormat, at: DateTime<Utc>) -> String {
    let stem: String = config_name
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    let stem = if stem.is_empty() { "export".to_string() } else { stem };

    format!(
        "{}_{}.{}",
        stem,
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Plain-text rendering of a cell for the text codecs
pub(crate) fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Footer line shared by the tabular codecs
pub(crate) fn footer_text(request: &EncodeRequest<'_>) -> String {
    format!(
        "{} rows exported on {}",
        request.rows.len(),
        request.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
