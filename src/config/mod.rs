//! Configuration module for ledger-export
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence
//! - Locale conventions for value formatting

pub mod paths;
pub mod settings;

pub use paths::ExportPaths;
pub use settings::{LocaleSettings, Settings};
