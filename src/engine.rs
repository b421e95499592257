//! Export engine
//!
//! The explicitly constructed owner of everything an export needs: the
//! configuration store, the run history and the settings. Callers create
//! one with [`ExportEngine::open`] and end it with [`ExportEngine::shutdown`].

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::config::{ExportPaths, Settings};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{ConfigId, ExportResult, Record, ResultId};
use crate::services::{ExportRunner, HistoryBuffer};
use crate::storage::{ConfigStore, FileKeyValueStore, KeyValueStore};

pub struct ExportEngine {
    store: ConfigStore,
    history: RwLock<HistoryBuffer>,
    settings: Settings,
}

impl ExportEngine {
    /// Open an engine over any key-value backend
    pub fn open(backend: Arc<dyn KeyValueStore>, settings: Settings) -> LedgerResult<Self> {
        let store = ConfigStore::open(backend)?;
        let history = RwLock::new(HistoryBuffer::with_capacity(settings.history_capacity));
        debug!("Export engine opened with {} configurations", store.count()?);

        Ok(Self {
            store,
            history,
            settings,
        })
    }

    /// Open an engine backed by files under `paths`
    pub fn open_at(paths: &ExportPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;
        let settings = Settings::load_or_create(paths)?;
        let backend = Arc::new(FileKeyValueStore::new(paths.data_dir()));
        Self::open(backend, settings)
    }

    pub fn configs(&self) -> &ConfigStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn runner(&self) -> ExportRunner<'_> {
        ExportRunner::new(&self.store, &self.history, &self.settings)
    }

    pub fn run(&self, config_id: ConfigId, records: &[Record]) -> LedgerResult<ExportResult> {
        self.runner().run(config_id, records)
    }

    pub fn run_cancellable(
        &self,
        config_id: ConfigId,
        records: &[Record],
        cancel: &AtomicBool,
    ) -> LedgerResult<ExportResult> {
        self.runner().run_cancellable(config_id, records, cancel)
    }

    /// Past results, most recent first
    pub fn history(&self) -> LedgerResult<Vec<ExportResult>> {
        Ok(self.read_history()?.list())
    }

    pub fn history_entry(&self, id: ResultId) -> LedgerResult<Option<ExportResult>> {
        Ok(self.read_history()?.get(id).cloned())
    }

    pub fn latest_export(&self) -> LedgerResult<Option<ExportResult>> {
        Ok(self.read_history()?.latest().cloned())
    }

    pub fn clear_history(&self) -> LedgerResult<()> {
        self.history
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire history lock: {}", e)))?
            .clear();
        Ok(())
    }

    /// Flush the store and release the engine
    pub fn shutdown(self) -> LedgerResult<()> {
        self.store.flush()?;
        debug!("Export engine shut down");
        Ok(())
    }

    fn read_history(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, HistoryBuffer>> {
        self.history
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire history lock: {}", e)))
    }
}
