//! In-memory storage.
//!
//! Clones share the same slots, so a store can be reopened over the same data.
//! An optional byte quota mimics browser storage limits.

use std::collections::HashMap;
use std::sync::Arc;
use super::{Storage, StorageError, Result};
use tokio::sync::Mutex;

/// Shared in-memory storage backend.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total bytes held across all slots.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Total bytes currently stored.
    pub async fn used_bytes(&self) -> usize {
        self.slots.lock().await.values().map(String::len).sum()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().await;

        if let Some(quota) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let size = others + value.len();
            if size > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    quota,
                });
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
