//! Record processing pipeline
//!
//! Filter -> project/format -> aggregate. Every stage is a pure function
//! over its inputs; the runner in `services` strings them together.

pub mod aggregate;
pub mod filter;
pub mod locale;
pub mod project;

pub use aggregate::{summarize, SUMMARY_LABEL};
pub use filter::{apply_filters, matches_filters};
pub use locale::{format_percentage, parse_formatted, NumberPattern};
pub use project::project;
