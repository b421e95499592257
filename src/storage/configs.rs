//! Export configuration store
//!
//! Owns the list of named export configurations and persists the full list
//! into a single key-value slot after every mutation.

use std::io::Write;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::export::bundle::{read_bundle, write_bundle, BundleFormat};
use crate::models::{default_configs, ConfigId, ConfigPatch, ExportConfig, NewExportConfig};

use super::kv::KeyValueStore;

/// Slot holding the serialized configuration list
pub const CONFIGS_SLOT: &str = "export_configs";

/// Store for export configurations
pub struct ConfigStore {
    backend: Arc<dyn KeyValueStore>,
    configs: RwLock<Vec<ExportConfig>>,
}

impl ConfigStore {
    /// Load configurations from the backend
    ///
    /// A backend that has never held a configuration list is seeded with
    /// the two built-in configurations, which are persisted immediately.
    pub fn open(backend: Arc<dyn KeyValueStore>) -> LedgerResult<Self> {
        let configs = match backend.get(CONFIGS_SLOT)? {
            Some(raw) => serde_json::from_str::<Vec<ExportConfig>>(&raw).map_err(|e| {
                LedgerError::Storage(format!("Failed to parse {}: {}", CONFIGS_SLOT, e))
            })?,
            None => {
                let seeded = default_configs(Utc::now());
                persist(backend.as_ref(), &seeded)?;
                debug!("Seeded {} default export configurations", seeded.len());
                seeded
            }
        };

        Ok(Self {
            backend,
            configs: RwLock::new(configs),
        })
    }

    /// Create a configuration, assigning its id and creation time
    pub fn create(&self, draft: NewExportConfig) -> LedgerResult<ExportConfig> {
        let config = draft.into_config(Utc::now());
        let created = config.clone();
        self.mutate(move |configs| {
            configs.push(config);
            Ok(())
        })?;
        debug!("Created export configuration {} ({})", created.id, created.name);
        Ok(created)
    }

    /// Merge a partial update into a configuration
    ///
    /// No validation happens here; a malformed result fails on its next run.
    pub fn update(&self, id: ConfigId, patch: ConfigPatch) -> LedgerResult<ExportConfig> {
        let schedule_changed = patch.schedule.is_some();
        self.mutate(|configs| {
            let config = find_mut(configs, id)?;
            config.apply_patch(patch);
            if schedule_changed {
                if let Some(schedule) = config.schedule.as_mut() {
                    schedule.refresh_next_run(Utc::now());
                }
            }
            Ok(config.clone())
        })
    }

    /// Delete a configuration, returning it
    pub fn delete(&self, id: ConfigId) -> LedgerResult<ExportConfig> {
        self.mutate(|configs| {
            let index = configs
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| LedgerError::config_not_found(id.to_string()))?;
            Ok(configs.remove(index))
        })
    }

    /// Get a configuration by id
    pub fn get(&self, id: ConfigId) -> LedgerResult<ExportConfig> {
        let configs = self.read()?;
        configs
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::config_not_found(id.to_string()))
    }

    /// All configurations in creation order
    pub fn list(&self) -> LedgerResult<Vec<ExportConfig>> {
        Ok(self.read()?.clone())
    }

    /// Find a configuration by id (full or short form) or by name
    pub fn find(&self, query: &str) -> LedgerResult<Option<ExportConfig>> {
        let configs = self.read()?;
        if let Some(config) = configs.iter().find(|c| c.id.matches(query)) {
            return Ok(Some(config.clone()));
        }
        let wanted = query.trim().to_lowercase();
        Ok(configs
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .cloned())
    }

    /// Copy a configuration under a new id and name
    pub fn duplicate(&self, id: ConfigId) -> LedgerResult<ExportConfig> {
        let mut draft = NewExportConfig::from(self.get(id)?);
        draft.name = format!("{} (copy)", draft.name);
        self.create(draft)
    }

    /// Toggle whether a configuration is offered for export
    pub fn set_active(&self, id: ConfigId, active: bool) -> LedgerResult<ExportConfig> {
        self.update(
            id,
            ConfigPatch {
                is_active: Some(active),
                ..ConfigPatch::default()
            },
        )
    }

    /// Record a successful export
    pub fn mark_exported(&self, id: ConfigId, at: DateTime<Utc>) -> LedgerResult<()> {
        self.mutate(|configs| {
            find_mut(configs, id)?.last_exported = Some(at);
            Ok(())
        })
    }

    /// Add several configurations at once with fresh ids
    pub fn import(&self, drafts: Vec<NewExportConfig>) -> LedgerResult<Vec<ExportConfig>> {
        let now = Utc::now();
        let imported: Vec<ExportConfig> = drafts.into_iter().map(|d| d.into_config(now)).collect();
        let added = imported.clone();
        self.mutate(move |configs| {
            configs.extend(imported);
            Ok(())
        })?;
        Ok(added)
    }

    /// Write every configuration as a bundle, returning how many were written
    pub fn export_bundle<W: Write>(
        &self,
        format: BundleFormat,
        writer: &mut W,
    ) -> LedgerResult<usize> {
        let configs = self.list()?;
        write_bundle(&configs, format, writer)?;
        Ok(configs.len())
    }

    /// Parse a bundle and import its configurations
    pub fn import_bundle(
        &self,
        text: &str,
        format: BundleFormat,
    ) -> LedgerResult<Vec<ExportConfig>> {
        let bundle = read_bundle(text, format)?;
        self.import(bundle.configs)
    }

    /// Number of stored configurations
    pub fn count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.len())
    }

    /// Write the current list to the backend
    pub fn flush(&self) -> LedgerResult<()> {
        let configs = self.read()?;
        persist(self.backend.as_ref(), &configs)
    }

    fn read(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, Vec<ExportConfig>>> {
        self.configs
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    /// Apply a change to a copy of the list, persist it, then commit it
    ///
    /// If persisting fails the in-memory list is left untouched.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Vec<ExportConfig>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut configs = self
            .configs
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let mut working = configs.clone();
        let output = change(&mut working)?;
        persist(self.backend.as_ref(), &working)?;
        *configs = working;
        Ok(output)
    }
}

fn find_mut(configs: &mut [ExportConfig], id: ConfigId) -> LedgerResult<&mut ExportConfig> {
    configs
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| LedgerError::config_not_found(id.to_string()))
}

fn persist(backend: &dyn KeyValueStore, configs: &[ExportConfig]) -> LedgerResult<()> {
    let raw = serde_json::to_string_pretty(configs)?;
    backend.set(CONFIGS_SLOT, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnType, ExportColumn, ExportFormat};
    use crate::storage::kv::{FileKeyValueStore, MemoryKeyValueStore};
    use tempfile::TempDir;

    fn memory_store() -> (Arc<MemoryKeyValueStore>, ConfigStore) {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = ConfigStore::open(backend.clone()).unwrap();
        (backend, store)
    }

    fn draft(name: &str) -> NewExportConfig {
        NewExportConfig::new(
            name,
            ExportFormat::Csv,
            vec![ExportColumn::new("amount", "Amount", ColumnType::Currency)],
        )
    }

    /// Backend whose writes can be switched off
    struct FailingStore {
        inner: MemoryKeyValueStore,
        fail: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> LedgerResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> LedgerResult<()> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(LedgerError::Storage("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> LedgerResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_seeds_defaults_on_empty_backend() {
        let (backend, store) = memory_store();
        let configs = store.list().unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name, "Full Transaction Ledger");
        assert_eq!(configs[1].name, "Monthly Category Summary");
        assert!(backend.get(CONFIGS_SLOT).unwrap().is_some());
    }

    #[test]
    fn test_does_not_reseed_existing_list() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend.set(CONFIGS_SLOT, "[]").unwrap();
        let store = ConfigStore::open(backend).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_create_and_get() {
        let (_backend, store) = memory_store();
        let created = store.create(draft("Quarterly")).unwrap();

        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.name, "Quarterly");
        assert!(fetched.last_exported.is_none());
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_backend, store) = memory_store();
        for i in 0..10 {
            store.create(draft(&format!("Config {}", i))).unwrap();
        }
        let configs = store.list().unwrap();
        let ids: std::collections::HashSet<_> = configs.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), configs.len());
    }

    #[test]
    fn test_update_merges_fields() {
        let (_backend, store) = memory_store();
        let created = store.create(draft("Before")).unwrap();

        let updated = store
            .update(
                created.id,
                ConfigPatch {
                    name: Some("After".into()),
                    ..ConfigPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "After");
        assert_eq!(updated.format, ExportFormat::Csv);
        assert_eq!(store.get(created.id).unwrap().name, "After");
    }

    #[test]
    fn test_unknown_id_fails_with_not_found() {
        let (_backend, store) = memory_store();
        let missing = ConfigId::new();

        assert!(store.get(missing).unwrap_err().is_not_found());
        assert!(store
            .update(missing, ConfigPatch::default())
            .unwrap_err()
            .is_not_found());
        assert!(store.delete(missing).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete() {
        let (_backend, store) = memory_store();
        let created = store.create(draft("Temp")).unwrap();

        let removed = store.delete(created.id).unwrap();
        assert_eq!(removed.id, created.id);
        assert!(store.get(created.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_find_by_name_and_short_id() {
        let (_backend, store) = memory_store();
        let created = store.create(draft("Tax Year")).unwrap();

        assert_eq!(store.find("tax year").unwrap().unwrap().id, created.id);
        assert_eq!(
            store.find(&created.id.to_string()).unwrap().unwrap().id,
            created.id
        );
        assert!(store.find("nothing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_and_set_active() {
        let (_backend, store) = memory_store();
        let created = store.create(draft("Base")).unwrap();

        let copy = store.duplicate(created.id).unwrap();
        assert_ne!(copy.id, created.id);
        assert_eq!(copy.name, "Base (copy)");
        assert_eq!(copy.columns, created.columns);

        let inactive = store.set_active(created.id, false).unwrap();
        assert!(!inactive.is_active);
    }

    #[test]
    fn test_mark_exported() {
        let (_backend, store) = memory_store();
        let created = store.create(draft("Base")).unwrap();
        let at = Utc::now();

        store.mark_exported(created.id, at).unwrap();
        assert_eq!(store.get(created.id).unwrap().last_exported, Some(at));
    }

    #[test]
    fn test_persists_after_every_mutation() {
        let temp_dir = TempDir::new().unwrap();
        let backend = Arc::new(FileKeyValueStore::new(temp_dir.path().to_path_buf()));
        let store = ConfigStore::open(backend.clone()).unwrap();

        let created = store.create(draft("Durable")).unwrap();
        let reopened = ConfigStore::open(backend.clone()).unwrap();
        assert_eq!(reopened.get(created.id).unwrap().name, "Durable");

        store.delete(created.id).unwrap();
        let reopened = ConfigStore::open(backend).unwrap();
        assert!(reopened.get(created.id).is_err());
        assert_eq!(reopened.count().unwrap(), 2);
    }

    #[test]
    fn test_failed_persist_leaves_list_unchanged() {
        let backend = Arc::new(FailingStore {
            inner: MemoryKeyValueStore::new(),
            fail: std::sync::atomic::AtomicBool::new(false),
        });
        let store = ConfigStore::open(backend.clone()).unwrap();
        backend.fail.store(true, std::sync::atomic::Ordering::SeqCst);

        assert!(store.create(draft("Lost")).is_err());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_import_assigns_fresh_ids() {
        let (_backend, store) = memory_store();
        let existing = store.list().unwrap();
        let drafts: Vec<NewExportConfig> = existing.iter().cloned().map(Into::into).collect();

        let imported = store.import(drafts).unwrap();
        assert_eq!(imported.len(), 2);
        assert!(imported.iter().all(|c| existing.iter().all(|e| e.id != c.id)));
        assert_eq!(store.count().unwrap(), 4);
    }

    #[test]
    fn test_bundle_between_stores() {
        let (_backend, source) = memory_store();
        source.create(draft("Shared")).unwrap();

        let mut out = Vec::new();
        assert_eq!(source.export_bundle(BundleFormat::Yaml, &mut out).unwrap(), 3);

        let target_backend = Arc::new(MemoryKeyValueStore::new());
        target_backend.set(CONFIGS_SLOT, "[]").unwrap();
        let target = ConfigStore::open(target_backend).unwrap();

        let imported = target
            .import_bundle(std::str::from_utf8(&out).unwrap(), BundleFormat::Yaml)
            .unwrap();
        assert_eq!(imported.len(), 3);
        assert!(target.find("shared").unwrap().is_some());
    }

    #[test]
    fn test_invalid_bundle_imports_nothing() {
        let (_backend, store) = memory_store();
        assert!(store.import_bundle("not json", BundleFormat::Json).is_err());
        assert_eq!(store.count().unwrap(), 2);
    }
}
