//! CSV codec
//!
//! Every field is wrapped in double quotes with embedded quotes doubled.
//! The summary is separated from the data by an empty line.

use ::csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::error::{LedgerError, LedgerResult};
use crate::models::Payload;

use super::{cell_text, footer_text, EncodeRequest};

/// Encode processed rows as CSV text
pub fn encode_csv(request: &EncodeRequest<'_>) -> LedgerResult<Payload> {
    let mut writer = quoted_writer(Vec::new());

    if request.formatting.include_headers {
        writer.write_record(request.columns.iter().map(|c| c.title.as_str()))?;
    }

    for row in request.rows {
        writer.write_record(
            request
                .columns
                .iter()
                .map(|c| cell_text(row.get(&c.title))),
        )?;
    }

    if let Some(summary) = request.summary {
        // The csv writer can't emit a truly empty line, so append it to the
        // finished buffer and continue with a fresh writer
        let mut bytes = finish(writer)?;
        bytes.push(b'\n');
        writer = quoted_writer(bytes);
        writer.write_record(
            request
                .columns
                .iter()
                .map(|c| cell_text(summary.get(&c.title))),
        )?;
    }

    if request.formatting.include_footer {
        writer.write_record([footer_text(request)])?;
    }

    let text =
        String::from_utf8(finish(writer)?).map_err(|e| LedgerError::Serialization(e.to_string()))?;

    Ok(Payload::Text(text))
}

fn quoted_writer(buffer: Vec<u8>) -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(buffer)
}

fn finish(writer: Writer<Vec<u8>>) -> LedgerResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| LedgerError::Serialization(e.to_string()))
}
