//! Saved-configuration store.

use chrono::Utc;
use kpi_core::{ConfigId, SavedConfiguration, TaskMetricsInput};
use kpi_storage::Storage;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::StoreConfig;
use crate::error::{ConfigError, Result};

/// Owns the ordered collection of saved configurations.
///
/// The collection is read from the medium once, in [`ConfigurationStore::open`],
/// and kept in memory. Every mutation serializes the whole next collection and
/// writes it in one call; the in-memory list only changes after that write
/// succeeds. A single lock covers the read-modify-write-persist sequence, so
/// concurrent callers never lose updates.
pub struct ConfigurationStore<S: Storage> {
    inner: Mutex<Inner<S>>,
    config: StoreConfig,
}

struct Inner<S> {
    storage: S,
    records: Vec<SavedConfiguration>,
}

impl<S: Storage> Inner<S> {
    async fn persist(&mut self, key: &str, next: Vec<SavedConfiguration>) -> Result<()> {
        let blob = serde_json::to_string(&next)?;
        if let Err(e) = self.storage.write(key, &blob).await {
            error!(key, error = %e, "Failed to persist configurations");
            return Err(e.into());
        }
        self.records = next;
        Ok(())
    }

    fn position(&self, id: &ConfigId) -> Result<usize> {
        self.records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| ConfigError::NotFound(id.clone()))
    }
}

impl<S: Storage> ConfigurationStore<S> {
    /// Open a store on the default slot.
    pub async fn open(storage: S) -> Self {
        Self::open_with_config(storage, StoreConfig::default()).await
    }

    /// Open a store, loading the collection from `config.key`.
    ///
    /// An unreadable medium or a corrupt payload is logged and yields an empty
    /// collection.
    pub async fn open_with_config(storage: S, config: StoreConfig) -> Self {
        let records = match storage.read(&config.key).await {
            Ok(None) => Vec::new(),
            Ok(Some(blob)) => match decode(&blob) {
                Ok(records) => records,
                Err(e) => {
                    warn!(key = %config.key, error = %e, "Discarding stored configurations");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(key = %config.key, error = %e, "Could not read stored configurations");
                Vec::new()
            }
        };

        info!(count = records.len(), "Loaded saved configurations");

        Self {
            inner: Mutex::new(Inner { storage, records }),
            config,
        }
    }

    /// Store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// All records, most recently updated first.
    pub async fn list(&self) -> Vec<SavedConfiguration> {
        self.inner.lock().await.records.clone()
    }

    /// Look up one record.
    pub async fn get(&self, id: &ConfigId) -> Option<SavedConfiguration> {
        self.inner
            .lock()
            .await
            .records
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    /// Number of records.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Whether there are no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether `input` holds anything worth offering to save.
    ///
    /// Advisory only; [`ConfigurationStore::save`] does not consult it.
    pub fn has_unsaved_meaningful_data(&self, input: &TaskMetricsInput) -> bool {
        input.has_meaningful_data()
    }

    /// Save a new snapshot of `input` under `name`.
    ///
    /// Names are trimmed and must not be blank. Duplicate names are allowed.
    pub async fn save(&self, input: &TaskMetricsInput, name: &str) -> Result<SavedConfiguration> {
        let name = validate_name(name)?;
        let mut inner = self.inner.lock().await;

        let record = SavedConfiguration::new(name, input.clone(), Utc::now());
        let mut next = Vec::with_capacity(inner.records.len() + 1);
        next.push(record.clone());
        next.extend(inner.records.iter().cloned());
        sort_recent_first(&mut next);

        inner.persist(&self.config.key, next).await?;
        debug!(id = %record.id, name = %record.name, "Saved configuration");
        Ok(record)
    }

    /// Replace the name and data of an existing record.
    pub async fn update(
        &self,
        id: &ConfigId,
        input: &TaskMetricsInput,
        name: &str,
    ) -> Result<SavedConfiguration> {
        let mut inner = self.inner.lock().await;
        let pos = inner.position(id)?;
        let name = validate_name(name)?;

        let mut next = inner.records.clone();
        let mut record = next.remove(pos);
        record.apply_update(name, input.clone(), Utc::now());
        next.insert(0, record.clone());
        sort_recent_first(&mut next);

        inner.persist(&self.config.key, next).await?;
        debug!(id = %record.id, "Updated configuration");
        Ok(record)
    }

    /// Remove a record. Deleting an unknown id is an error.
    pub async fn delete(&self, id: &ConfigId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let pos = inner.position(id)?;

        let mut next = inner.records.clone();
        next.remove(pos);

        inner.persist(&self.config.key, next).await?;
        debug!(%id, "Deleted configuration");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidName);
    }
    Ok(trimmed)
}

fn decode(blob: &str) -> Result<Vec<SavedConfiguration>> {
    let mut records: Vec<SavedConfiguration> =
        serde_json::from_str(blob).map_err(|e| ConfigError::CorruptData(e.to_string()))?;
    sort_recent_first(&mut records);
    Ok(records)
}

/// Stable, so among equal timestamps the record placed first stays first.
fn sort_recent_first(records: &mut [SavedConfiguration]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STORAGE_KEY;
    use kpi_storage::{JsonFileStorage, MemoryStorage, StorageError};
    use std::sync::Arc;

    fn sample(total: u64) -> TaskMetricsInput {
        TaskMetricsInput::new(total, 3, 1, 4).with_sast_iteration("S1")
    }

    fn assert_recent_first(records: &[SavedConfiguration]) {
        assert!(records.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));
    }

    /// Log sink shared with a test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Medium that can neither be read nor written.
    struct UnavailableStorage;

    #[async_trait::async_trait]
    impl Storage for UnavailableStorage {
        async fn read(&self, _key: &str) -> kpi_storage::Result<Option<String>> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
        async fn write(&mut self, _key: &str, _value: &str) -> kpi_storage::Result<()> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    #[tokio::test]
    async fn test_open_empty() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        assert!(store.is_empty().await);
        assert!(store.list().await.is_empty());
        assert_eq!(store.config().key, STORAGE_KEY);
    }

    #[tokio::test]
    async fn test_save_then_list() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        let input = sample(10);

        let saved = store.save(&input, "X").await.unwrap();
        assert_eq!(saved.created_at, saved.updated_at);

        let list = store.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, saved.id);
        assert_eq!(list[0].name, "X");
        assert_eq!(list[0].data, input);
    }

    #[tokio::test]
    async fn test_save_trims_name() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        let saved = store.save(&sample(1), "  Sprint 9 ").await.unwrap();
        assert_eq!(saved.name, "Sprint 9");
    }

    #[tokio::test]
    async fn test_save_rejects_blank_names() {
        let storage = MemoryStorage::new();
        let store = ConfigurationStore::open(storage.clone()).await;
        store.save(&sample(1), "keep").await.unwrap();

        for name in ["", "   ", "\t\n"] {
            assert!(matches!(
                store.save(&sample(2), name).await,
                Err(ConfigError::InvalidName)
            ));
        }
        assert_eq!(store.len().await, 1);

        let reopened = ConfigurationStore::open(storage).await;
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        let a = store.save(&sample(1), "Same").await.unwrap();
        let b = store.save(&sample(2), "Same").await.unwrap();

        assert_ne!(a.id, b.id);
        let list = store.list().await;
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|r| r.name == "Same"));
    }

    #[tokio::test]
    async fn test_save_prepends() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        let a = store.save(&sample(1), "a").await.unwrap();
        let b = store.save(&sample(2), "b").await.unwrap();
        let c = store.save(&sample(3), "c").await.unwrap();

        let ids: Vec<_> = store.list().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_saved_data_is_a_snapshot() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        let mut input = sample(10);
        let saved = store.save(&input, "snap").await.unwrap();

        input.total_tasks = 99;
        input.sast_iteration.push_str("-changed");

        let stored = store.get(&saved.id).await.unwrap();
        assert_eq!(stored.data, sample(10));
    }

    #[tokio::test]
    async fn test_update() {
        let storage = MemoryStorage::new();
        let store = ConfigurationStore::open(storage.clone()).await;
        let first = store.save(&sample(1), "first").await.unwrap();
        let _second = store.save(&sample(2), "second").await.unwrap();

        let updated = store
            .update(&first.id, &sample(50), "first v2")
            .await
            .unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.created_at, first.created_at);
        assert!(updated.updated_at >= first.updated_at);
        assert_eq!(updated.name, "first v2");
        assert_eq!(updated.data.total_tasks, 50);

        let list = store.list().await;
        assert_eq!(list[0].id, first.id);
        assert_recent_first(&list);

        let reopened = ConfigurationStore::open(storage).await;
        assert_eq!(reopened.get(&first.id).await.unwrap().name, "first v2");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        store.save(&sample(1), "a").await.unwrap();
        let before = store.list().await;

        let missing = ConfigId::new();
        let err = store.update(&missing, &sample(2), "Y").await.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(id) if id == missing));
        assert_eq!(store.list().await, before);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        let saved = store.save(&sample(1), "a").await.unwrap();

        let err = store.update(&saved.id, &sample(2), " ").await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName));
        assert_eq!(store.get(&saved.id).await.unwrap().data, sample(1));
    }

    #[tokio::test]
    async fn test_delete_middle_of_three() {
        let storage = MemoryStorage::new();
        let store = ConfigurationStore::open(storage.clone()).await;
        let a = store.save(&sample(1), "a").await.unwrap();
        let b = store.save(&sample(2), "b").await.unwrap();
        let c = store.save(&sample(3), "c").await.unwrap();

        store.delete(&b.id).await.unwrap();

        let list = store.list().await;
        assert_eq!(list.len(), 2);
        assert_recent_first(&list);
        assert!(list.iter().all(|r| r.id != b.id));
        assert_eq!(list[0].id, c.id);
        assert_eq!(list[1].id, a.id);

        let reopened = ConfigurationStore::open(storage).await;
        assert_eq!(reopened.len().await, 2);
        assert!(reopened.get(&b.id).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;
        let saved = store.save(&sample(1), "a").await.unwrap();
        store.delete(&saved.id).await.unwrap();

        assert!(matches!(
            store.delete(&saved.id).await,
            Err(ConfigError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_payload_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.write(STORAGE_KEY, "{not json").await.unwrap();

        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = ConfigurationStore::open(storage.clone()).await;
        assert!(store.list().await.is_empty());

        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains("Discarding stored configurations"));
        assert!(output.contains(STORAGE_KEY));

        // the next save replaces the corrupt blob
        store.save(&sample(1), "fresh").await.unwrap();
        let reopened = ConfigurationStore::open(storage).await;
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test]
    async fn test_large_counts_survive_reopen() {
        let storage = MemoryStorage::new();
        let store = ConfigurationStore::open(storage.clone()).await;
        let input = TaskMetricsInput::new(u64::MAX, (1 << 53) + 1, 0, 9007199254740993);
        let saved = store.save(&input, "big").await.unwrap();
        drop(store);

        let reopened = ConfigurationStore::open(storage).await;
        let loaded = reopened.get(&saved.id).await.unwrap();
        assert_eq!(loaded.data, input);
        assert_eq!(loaded.data.total_tasks, u64::MAX);
        assert_eq!(loaded.data.completed, 9007199254740993);
    }

    #[tokio::test]
    async fn test_wrong_shape_counts_as_corrupt() {
        let mut storage = MemoryStorage::new();
        storage
            .write(STORAGE_KEY, r#"[{"id": "x", "name": "no data"}]"#)
            .await
            .unwrap();

        let store = ConfigurationStore::open(storage).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_sorts_by_updated_at() {
        let blob = r#"[
            {"id": "old", "name": "old", "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-02T00:00:00.000Z",
             "data": {"totalTasks": 1, "inProgress": 0, "blocked": 0, "completed": 0, "sastIteration": ""}},
            {"id": "new", "name": "new", "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-03-01T00:00:00.000Z",
             "data": {"totalTasks": 2, "inProgress": 0, "blocked": 0, "completed": 0, "sastIteration": ""}},
            {"id": "mid", "name": "mid", "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-02-01T00:00:00.000Z",
             "data": {"totalTasks": 3, "inProgress": 0, "blocked": 0, "completed": 0, "sastIteration": "S"}}
        ]"#;
        let mut storage = MemoryStorage::new();
        storage.write(STORAGE_KEY, blob).await.unwrap();

        let store = ConfigurationStore::open(storage).await;
        let ids: Vec<_> = store
            .list()
            .await
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_write_failure_leaves_list_unchanged() {
        let storage = MemoryStorage::new().with_quota(600);
        let store = ConfigurationStore::open(storage.clone()).await;
        let kept = store.save(&sample(1), "kept").await.unwrap();
        let before = store.list().await;

        let long_name = "n".repeat(1024);
        let err = store.save(&sample(2), &long_name).await.unwrap_err();
        assert!(matches!(err, ConfigError::Persistence(_)));
        assert_eq!(store.list().await, before);

        let err = store.update(&kept.id, &sample(3), &long_name).await.unwrap_err();
        assert!(matches!(err, ConfigError::Persistence(_)));
        assert_eq!(store.list().await, before);

        let reopened = ConfigurationStore::open(storage).await;
        assert_eq!(reopened.list().await, before);
    }

    #[tokio::test]
    async fn test_unavailable_medium() {
        let store = ConfigurationStore::open(UnavailableStorage).await;
        assert!(store.is_empty().await);

        let err = store.save(&sample(1), "a").await.unwrap_err();
        assert!(matches!(err, ConfigError::Persistence(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_custom_key() {
        let storage = MemoryStorage::new();
        let config = StoreConfig::default().with_key("team-b");
        let store = ConfigurationStore::open_with_config(storage.clone(), config.clone()).await;
        store.save(&sample(1), "b").await.unwrap();

        assert!(storage.read(STORAGE_KEY).await.unwrap().is_none());
        assert!(storage.read("team-b").await.unwrap().is_some());

        let default_store = ConfigurationStore::open(storage.clone()).await;
        assert!(default_store.is_empty().await);
        let reopened = ConfigurationStore::open_with_config(storage, config).await;
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_saves_are_not_lost() {
        let storage = MemoryStorage::new();
        let store = Arc::new(ConfigurationStore::open(storage.clone()).await);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save(&sample(i), &format!("cfg {}", i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 16);
        let reopened = ConfigurationStore::open(storage).await;
        assert_eq!(reopened.len().await, 16);
    }

    #[tokio::test]
    async fn test_file_backed_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).await.unwrap();
        let store = ConfigurationStore::open(storage).await;
        let saved = store.save(&sample(8), "on disk").await.unwrap();
        drop(store);

        let path = dir.path().join(format!("{}.json", STORAGE_KEY));
        let raw = std::fs::read_to_string(path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["name"], "on disk");
        assert_eq!(json[0]["data"]["totalTasks"], 8);

        let storage = JsonFileStorage::new(dir.path()).await.unwrap();
        let store = ConfigurationStore::open(storage).await;
        assert_eq!(store.get(&saved.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_has_unsaved_meaningful_data() {
        let store = ConfigurationStore::open(MemoryStorage::new()).await;

        assert!(!store.has_unsaved_meaningful_data(&TaskMetricsInput::default()));
        assert!(store.has_unsaved_meaningful_data(&TaskMetricsInput::new(1, 0, 0, 0)));
        assert!(store.has_unsaved_meaningful_data(
            &TaskMetricsInput::default().with_sast_iteration("S1")
        ));
        assert!(!store.has_unsaved_meaningful_data(
            &TaskMetricsInput::default().with_sast_iteration("  ")
        ));
    }
}
