//! Excel codec
//!
//! Writes a single worksheet into an in-memory .xlsx workbook.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::Value;

use crate::error::LedgerResult;
use crate::models::{Payload, ProcessedRow};

use super::{footer_text, EncodeRequest};

/// Longest sheet name Excel accepts
const MAX_SHEET_NAME: usize = 31;

/// Encode processed rows as an .xlsx workbook
pub fn encode_xlsx(request: &EncodeRequest<'_>) -> LedgerResult<Payload> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        let name = request
            .formatting
            .sheet_name
            .as_deref()
            .unwrap_or(request.config_name);
        worksheet.set_name(sheet_name(name))?;

        for (col, column) in request.columns.iter().enumerate() {
            if let Some(width) = column.width {
                worksheet.set_column_width(col as u16, f64::from(width))?;
            }
        }

        let mut row_num: u32 = 0;
        if request.formatting.include_headers {
            for (col, column) in request.columns.iter().enumerate() {
                worksheet.write_string_with_format(row_num, col as u16, &column.title, &bold)?;
            }
            row_num += 1;
        }

        for row in request.rows {
            write_row(worksheet, row_num, row, request, None)?;
            row_num += 1;
        }

        if let Some(summary) = request.summary {
            // Blank separator row
            row_num += 1;
            write_row(worksheet, row_num, summary, request, Some(&bold))?;
            row_num += 1;
        }

        if request.formatting.include_footer {
            worksheet.write_string(row_num + 1, 0, footer_text(request))?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    Ok(Payload::Binary(bytes))
}

fn write_row(
    worksheet: &mut Worksheet,
    row_num: u32,
    row: &ProcessedRow,
    request: &EncodeRequest<'_>,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    for (col, column) in request.columns.iter().enumerate() {
        let col = col as u16;
        match (row.get(&column.title), format) {
            (None, _) | (Some(Value::Null), _) => {}
            (Some(Value::Number(n)), Some(format)) => {
                let number = n.as_f64().unwrap_or_default();
                worksheet.write_number_with_format(row_num, col, number, format)?;
            }
            (Some(Value::Number(n)), None) => {
                worksheet.write_number(row_num, col, n.as_f64().unwrap_or_default())?;
            }
            (Some(Value::Bool(b)), _) => {
                worksheet.write_boolean(row_num, col, *b)?;
            }
            (Some(Value::String(s)), Some(format)) => {
                worksheet.write_string_with_format(row_num, col, s, format)?;
            }
            (Some(Value::String(s)), None) => {
                worksheet.write_string(row_num, col, s)?;
            }
            (Some(other), _) => {
                worksheet.write_string(row_num, col, other.to_string())?;
            }
        }
    }
    Ok(())
}

/// Reduce a name to something Excel accepts as a sheet name
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .collect();
    let truncated: String = cleaned
        .trim_start_matches(|c: char| c.is_whitespace() || c == '\'')
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();
    let trimmed = truncated.trim_end_matches(|c: char| c.is_whitespace() || c == '\'');

    if trimmed.is_empty() {
        "Export".to_string()
    } else {
        trimmed.to_string()
    }
}
