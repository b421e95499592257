//! Display formatting for terminal output
//!
//! Provides utilities for formatting export configurations and run results
//! for terminal display.

pub mod config;

pub use config::{format_config_details, format_config_list, format_export_result};
