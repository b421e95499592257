//! User settings for ledger-export
//!
//! Manages locale conventions used when formatting values, the row guard,
//! the history capacity, and logging preferences.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::ExportPaths;
use crate::error::LedgerError;

/// Locale conventions applied by the column formatter and aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleSettings {
    /// Decimal separator ("." for en-US, "," for pt-BR)
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    /// Digit grouping separator
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,

    /// Label rendered for `true` in boolean columns
    #[serde(default = "default_yes_label")]
    pub yes_label: String,

    /// Label rendered for `false` in boolean columns
    #[serde(default = "default_no_label")]
    pub no_label: String,
}

fn default_decimal_separator() -> char {
    '.'
}

fn default_thousands_separator() -> char {
    ','
}

fn default_yes_label() -> String {
    "Yes".to_string()
}

fn default_no_label() -> String {
    "No".to_string()
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
            thousands_separator: default_thousands_separator(),
            yes_label: default_yes_label(),
            no_label: default_no_label(),
        }
    }
}

/// User settings for ledger-export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Number and label conventions
    #[serde(default)]
    pub locale: LocaleSettings,

    /// Maximum number of filtered rows a single run may encode
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Number of past results kept in the history buffer
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Default log level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where produced files are written (defaults to the exports directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_max_rows() -> usize {
    100_000
}

fn default_history_capacity() -> usize {
    crate::services::history::HISTORY_CAPACITY
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            locale: LocaleSettings::default(),
            max_rows: default_max_rows(),
            history_capacity: default_history_capacity(),
            log_level: default_log_level(),
            output_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ExportPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ExportPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Directory produced files should be written to
    pub fn output_dir(&self, paths: &ExportPaths) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| paths.exports_dir())
    }
}
