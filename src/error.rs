//! Custom error types for ledger-export
//!
//! This module defines the error hierarchy for the export engine using
//! thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledger-export operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No export configuration with the given id exists
    #[error("Export configuration not found: {0}")]
    ConfigNotFound(String),

    /// The configuration names a format none of the codecs handle
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// A codec failed while encoding rows
    #[error("Serialization failure: {0}")]
    Serialization(String),

    /// Row guard tripped before encoding
    #[error("Export too large: {rows} rows exceeds the limit of {limit}")]
    SizeExceeded { rows: usize, limit: usize },

    /// Run was cancelled before the encode step
    #[error("Export cancelled")]
    Cancelled,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for input data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for an export configuration
    pub fn config_not_found(identifier: impl Into<String>) -> Self {
        Self::ConfigNotFound(identifier.into())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConfigNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for LedgerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for LedgerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for ledger-export operations
pub type LedgerResult<T> = Result<T, LedgerError>;
