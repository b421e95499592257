//! Service layer for ledger-export
//!
//! The service layer runs exports on top of the configuration store and
//! keeps the bounded history of completed runs.

pub mod history;
pub mod runner;

pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use runner::ExportRunner;
