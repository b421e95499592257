//! Core data models for ledger-export
//!
//! This module contains the data structures that describe an export: the
//! persisted configuration, its filters and schedule, raw input records,
//! processed rows, and the result of a run.

pub mod config;
pub mod filters;
pub mod ids;
pub mod record;
pub mod result;
pub mod schedule;

pub use config::{
    default_configs, Aggregation, ColumnType, ConfigPatch, DataSource, ExportColumn, ExportConfig,
    ExportFormat, ExportFormatting, NewExportConfig,
};
pub use filters::{AmountRange, DateRange, ExportFilters, FilterValue};
pub use ids::{ConfigId, ResultId};
pub use record::{ProcessedRow, Record};
pub use result::{ExportMetadata, ExportResult, Payload};
pub use schedule::{ExportSchedule, ScheduleFrequency};
