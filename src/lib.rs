//! ledger-export - Configurable reporting and export engine for personal finance
//!
//! This library turns personal-finance records (transactions, accounts,
//! budgets, goals) into downloadable reports. Users keep named export
//! configurations describing what to export and how; running one filters
//! the supplied records, projects and formats the visible columns,
//! optionally appends a summary row and encodes the result as a
//! spreadsheet, CSV, JSON or XML document.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Export configurations, filters, records and results
//! - `storage`: Key-value persistence and the configuration store
//! - `pipeline`: Filtering, projection/formatting and aggregation
//! - `export`: Output codecs and configuration bundles
//! - `services`: Export runner and run history
//! - `engine`: The service instance tying the above together
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_export::config::ExportPaths;
//! use ledger_export::engine::ExportEngine;
//!
//! let paths = ExportPaths::new()?;
//! let engine = ExportEngine::open_at(&paths)?;
//! let ledger = engine.configs().find("Full Transaction Ledger")?.unwrap();
//! let result = engine.run(ledger.id, &records)?;
//! engine.shutdown()?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;

pub use engine::ExportEngine;
pub use error::{LedgerError, LedgerResult};
