//! Export runner
//!
//! Drives one export: filter the supplied records, project them onto the
//! visible columns, optionally summarize, encode, then record the outcome.
//! A run either fully succeeds (result returned, `last_exported` written,
//! history updated) or leaves no trace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{encode, EncodeRequest};
use crate::models::{ConfigId, ExportMetadata, ExportResult, Record, ResultId};
use crate::pipeline::{apply_filters, project, summarize};
use crate::storage::ConfigStore;

use super::history::HistoryBuffer;

/// Runs exports against a configuration store
pub struct ExportRunner<'a> {
    store: &'a ConfigStore,
    history: &'a RwLock<HistoryBuffer>,
    settings: &'a Settings,
}

impl<'a> ExportRunner<'a> {
    pub fn new(
        store: &'a ConfigStore,
        history: &'a RwLock<HistoryBuffer>,
        settings: &'a Settings,
    ) -> Self {
        Self {
            store,
            history,
            settings,
        }
    }

    /// Run the export described by `config_id` over `records`
    pub fn run(&self, config_id: ConfigId, records: &[Record]) -> LedgerResult<ExportResult> {
        self.run_cancellable(config_id, records, &AtomicBool::new(false))
    }

    /// Run an export that can be abandoned before encoding starts
    pub fn run_cancellable(
        &self,
        config_id: ConfigId,
        records: &[Record],
        cancel: &AtomicBool,
    ) -> LedgerResult<ExportResult> {
        let started = Instant::now();

        let config = self.store.get(config_id).inspect_err(|e| {
            warn!("Export {} rejected: {}", config_id, e);
        })?;

        let filtered = apply_filters(records, &config.filters);
        debug!(
            "Filtered {} of {} records for '{}'",
            filtered.len(),
            records.len(),
            config.name
        );

        if filtered.len() > self.settings.max_rows {
            warn!(
                "Export '{}' rejected: {} rows over limit of {}",
                config.name,
                filtered.len(),
                self.settings.max_rows
            );
            return Err(LedgerError::SizeExceeded {
                rows: filtered.len(),
                limit: self.settings.max_rows,
            });
        }

        let columns = config.visible_columns();
        let rows = project(&filtered, &columns, &config.formatting, &self.settings.locale)?;
        debug!("Projected {} rows onto {} columns", rows.len(), columns.len());

        let summary = if config.formatting.include_summary {
            summarize(&rows, &columns, &self.settings.locale)
        } else {
            None
        };

        if cancel.load(Ordering::SeqCst) {
            warn!("Export '{}' cancelled before encoding", config.name);
            return Err(LedgerError::Cancelled);
        }

        let exported_at = Utc::now();
        let encoded = encode(
            &config.format,
            &EncodeRequest {
                config_name: &config.name,
                columns: &columns,
                rows: &rows,
                summary: summary.as_ref(),
                formatting: &config.formatting,
                generated_at: exported_at,
            },
        )
        .inspect_err(|e| warn!("Export '{}' failed to encode: {}", config.name, e))?;

        let result = ExportResult {
            id: ResultId::new(),
            config_id: config.id,
            filename: encoded.filename,
            format: config.format.clone(),
            size: encoded.payload.len(),
            payload: encoded.payload,
            row_count: rows.len(),
            exported_at,
            filters: config.filters.clone(),
            metadata: ExportMetadata {
                original_count: records.len(),
                filtered_count: filtered.len(),
                elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                column_count: columns.len(),
            },
        };

        // History lock first, then the store's config lock
        let mut history = self
            .history
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire history lock: {}", e)))?;
        self.store.mark_exported(config.id, exported_at)?;
        history.push(result.clone());

        info!(
            "Exported '{}' as {} ({} rows, {} bytes)",
            config.name, result.filename, result.row_count, result.size
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Aggregation, AmountRange, ColumnType, ConfigPatch, ExportColumn, ExportFilters,
        ExportFormat, ExportFormatting, NewExportConfig,
    };
    use crate::storage::{KeyValueStore, MemoryKeyValueStore};
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        store: ConfigStore,
        history: RwLock<HistoryBuffer>,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_backend(Arc::new(MemoryKeyValueStore::new()))
        }

        fn with_backend(backend: Arc<dyn KeyValueStore>) -> Self {
            Self {
                store: ConfigStore::open(backend).unwrap(),
                history: RwLock::new(HistoryBuffer::new()),
                settings: Settings::default(),
            }
        }

        fn runner(&self) -> ExportRunner<'_> {
            ExportRunner::new(&self.store, &self.history, &self.settings)
        }

        fn history_len(&self) -> usize {
            self.history.read().unwrap().len()
        }
    }

    fn records() -> Vec<Record> {
        vec![
            json!({"date": "2025-01-03", "description": "Salary", "amount": 10.50}),
            json!({"date": "2025-01-04", "description": "Coffee", "amount": -5.25}),
            json!({"date": "2025-01-05", "description": "Groceries", "amount": 100.00}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
    }

    fn scenario_config(format: ExportFormat) -> NewExportConfig {
        let mut draft = NewExportConfig::new(
            "Scenario",
            format,
            vec![
                ExportColumn::new("date", "Date", ColumnType::Date),
                ExportColumn::new("description", "Description", ColumnType::Text),
                ExportColumn::new("amount", "Amount", ColumnType::Currency)
                    .with_aggregation(Aggregation::Sum),
            ],
        );
        draft.filters = ExportFilters {
            amount_range: Some(AmountRange {
                min: Some(0.0),
                max: Some(1_000_000.0),
            }),
            ..ExportFilters::default()
        };
        draft.formatting = ExportFormatting {
            include_summary: true,
            ..ExportFormatting::default()
        };
        draft
    }

    #[test]
    fn test_amount_range_run_with_summary() {
        let fixture = Fixture::new();
        let config = fixture.store.create(scenario_config(ExportFormat::Json)).unwrap();

        let result = fixture.runner().run(config.id, &records()).unwrap();

        assert_eq!(result.metadata.original_count, 3);
        assert_eq!(result.metadata.filtered_count, 3);
        assert_eq!(result.row_count, 3);
        assert_eq!(result.metadata.column_count, 3);

        let rows: Vec<serde_json::Value> =
            serde_json::from_str(result.payload.as_text().unwrap()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1]["Amount"], json!("-$5.25"));
        assert_eq!(rows[3]["Date"], json!("TOTAL"));
        assert_eq!(rows[3]["Description"], json!(""));
        assert_eq!(rows[3]["Amount"], json!(105.25));
    }

    #[test]
    fn test_success_updates_store_and_history() {
        let fixture = Fixture::new();
        let config = fixture.store.create(scenario_config(ExportFormat::Csv)).unwrap();

        let result = fixture.runner().run(config.id, &records()).unwrap();

        assert_eq!(
            fixture.store.get(config.id).unwrap().last_exported,
            Some(result.exported_at)
        );
        let history = fixture.history.read().unwrap();
        assert_eq!(history.latest().map(|r| r.id), Some(result.id));
        assert_eq!(result.size, result.payload.len());
        assert!(result.filename.starts_with("Scenario_"));
        assert!(result.filename.ends_with(".csv"));
        assert_eq!(result.content_type(), "text/csv");
    }

    #[test]
    fn test_deleted_config_is_not_found() {
        let fixture = Fixture::new();
        let config = fixture.store.create(scenario_config(ExportFormat::Csv)).unwrap();
        fixture.store.delete(config.id).unwrap();

        let err = fixture.runner().run(config.id, &records()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fixture.history_len(), 0);
    }

    #[test]
    fn test_unknown_format_leaves_no_trace() {
        let fixture = Fixture::new();
        let config = fixture.store.create(scenario_config(ExportFormat::Csv)).unwrap();
        fixture
            .store
            .update(
                config.id,
                ConfigPatch {
                    format: Some(ExportFormat::parse("pdf")),
                    ..ConfigPatch::default()
                },
            )
            .unwrap();

        let err = fixture.runner().run(config.id, &records()).unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedFormat(_)));
        assert!(fixture.store.get(config.id).unwrap().last_exported.is_none());
        assert_eq!(fixture.history_len(), 0);
    }

    #[test]
    fn test_same_input_same_payload() {
        let fixture = Fixture::new();
        let config = fixture.store.create(scenario_config(ExportFormat::Json)).unwrap();

        let first = fixture.runner().run(config.id, &records()).unwrap();
        let second = fixture.runner().run(config.id, &records()).unwrap();

        assert_eq!(first.payload, second.payload);
        assert_ne!(first.id, second.id);
        assert_eq!(fixture.history_len(), 2);
    }

    #[test]
    fn test_row_guard() {
        let mut fixture = Fixture::new();
        fixture.settings.max_rows = 2;
        let config = fixture.store.create(scenario_config(ExportFormat::Csv)).unwrap();

        let err = fixture.runner().run(config.id, &records()).unwrap_err();
        assert!(matches!(err, LedgerError::SizeExceeded { rows: 3, limit: 2 }));
        assert_eq!(fixture.history_len(), 0);
    }

    #[test]
    fn test_cancelled_before_encoding() {
        let fixture = Fixture::new();
        let config = fixture.store.create(scenario_config(ExportFormat::Csv)).unwrap();
        let cancel = AtomicBool::new(true);

        let err = fixture
            .runner()
            .run_cancellable(config.id, &records(), &cancel)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Cancelled));
        assert!(fixture.store.get(config.id).unwrap().last_exported.is_none());
    }

    #[test]
    fn test_summary_omitted_unless_requested() {
        let fixture = Fixture::new();
        let mut draft = scenario_config(ExportFormat::Json);
        draft.formatting.include_summary = false;
        let config = fixture.store.create(draft).unwrap();

        let result = fixture.runner().run(config.id, &records()).unwrap();
        let rows: Vec<serde_json::Value> =
            serde_json::from_str(result.payload.as_text().unwrap()).unwrap();
        assert_eq!(rows.len(), 3);
    }

    /// Backend whose writes can be switched off
    struct FailingStore {
        inner: MemoryKeyValueStore,
        fail: AtomicBool,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> LedgerResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> LedgerResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(LedgerError::Storage("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> LedgerResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_metadata_write_skips_history() {
        let backend = Arc::new(FailingStore {
            inner: MemoryKeyValueStore::new(),
            fail: AtomicBool::new(false),
        });
        let fixture = Fixture::with_backend(backend.clone());
        let config = fixture.store.create(scenario_config(ExportFormat::Csv)).unwrap();
        backend.fail.store(true, Ordering::SeqCst);

        assert!(fixture.runner().run(config.id, &records()).is_err());
        assert_eq!(fixture.history_len(), 0);
        assert!(fixture.store.get(config.id).unwrap().last_exported.is_none());
    }
}
