//! JSON codec
//!
//! The processed rows, with the summary row appended when present, as a
//! pretty-printed array. No envelope around it.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Payload, ProcessedRow};

use super::EncodeRequest;

/// Encode processed rows as a JSON array
pub fn encode_json(request: &EncodeRequest<'_>) -> LedgerResult<Payload> {
    let items: Vec<&ProcessedRow> = request.rows.iter().chain(request.summary).collect();
    let text = serde_json::to_string_pretty(&items)
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;
    Ok(Payload::Text(text))
}

/// Parse a JSON export back into rows (summary included as the last element)
pub fn decode_json(text: &str) -> LedgerResult<Vec<ProcessedRow>> {
    Ok(serde_json::from_str(text)?)
}
