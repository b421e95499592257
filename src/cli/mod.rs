//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the export engine.

pub mod config;
pub mod run;

pub use config::{handle_config_command, ConfigCommands};
pub use run::{handle_run_command, RunArgs};

use crate::engine::ExportEngine;
use crate::error::{LedgerError, LedgerResult};
use crate::models::ExportConfig;

/// Look up a configuration by id or case-insensitive name
pub fn resolve_config(engine: &ExportEngine, query: &str) -> LedgerResult<ExportConfig> {
    engine
        .configs()
        .find(query)?
        .ok_or_else(|| LedgerError::config_not_found(query))
}
