//! Export result model
//!
//! An `ExportResult` is the immutable outcome of one successful run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::ExportFormat;
use super::filters::ExportFilters;
use super::ids::{ConfigId, ResultId};

/// Encoded output of a codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Binary(Vec<u8>),
    Text(String),
}

impl Payload {
    /// Raw bytes of the payload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Binary(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text content, if this is a text payload
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// Counts and timing recorded for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Records supplied to the run
    pub original_count: usize,

    /// Records left after filtering
    pub filtered_count: usize,

    /// Wall-clock time of the pipeline in milliseconds
    pub elapsed_ms: u64,

    /// Number of visible columns
    pub column_count: usize,
}

/// Outcome of one successful export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResult {
    pub id: ResultId,
    pub config_id: ConfigId,
    pub filename: String,
    pub format: ExportFormat,
    pub payload: Payload,
    pub size: usize,
    /// Data rows written (the summary row is not counted)
    pub row_count: usize,
    pub exported_at: DateTime<Utc>,
    /// Filters as they were when the run happened
    pub filters: ExportFilters,
    pub metadata: ExportMetadata,
}

impl ExportResult {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
