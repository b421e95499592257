//! XML codec
//!
//! Unlike the other codecs, field elements are named after the column
//! *key*, not its title. Consumers depend on this.

use std::fmt::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Payload, ProcessedRow};

use super::{cell_text, EncodeRequest};

/// Encode processed rows as an XML document
pub fn encode_xml(request: &EncodeRequest<'_>) -> LedgerResult<Payload> {
    let mut out = String::new();
    write_document(&mut out, request).map_err(|e| LedgerError::Serialization(e.to_string()))?;
    Ok(Payload::Text(out))
}

fn write_document(out: &mut String, request: &EncodeRequest<'_>) -> std::fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<export name="{}" generated="{}">"#,
        escape_xml(request.config_name),
        request.generated_at.to_rfc3339()
    )?;

    for row in request.rows {
        write_row(out, "row", row, request)?;
    }
    if let Some(summary) = request.summary {
        write_row(out, "summary", summary, request)?;
    }

    writeln!(out, "</export>")
}

fn write_row(
    out: &mut String,
    tag: &str,
    row: &ProcessedRow,
    request: &EncodeRequest<'_>,
) -> std::fmt::Result {
    writeln!(out, "  <{}>", tag)?;
    for column in request.columns {
        let name = element_name(&column.key);
        let text = cell_text(row.get(&column.title));
        if text.is_empty() {
            writeln!(out, "    <{}/>", name)?;
        } else {
            writeln!(out, "    <{}>{}</{}>", name, escape_xml(&text), name)?;
        }
    }
    writeln!(out, "  </{}>", tag)
}

/// Escape the five reserved XML characters
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Turn a column key into a valid element name
fn element_name(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    match name.chars().next() {
        None => name.push_str("field"),
        Some(first) if !(first.is_alphabetic() || first == '_') => name.insert(0, '_'),
        _ => {}
    }
    name
}
