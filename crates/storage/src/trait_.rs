//! Storage trait abstraction.

use async_trait::async_trait;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be used as a slot name
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Writing would exceed the medium's capacity
    #[error("Quota exceeded writing {key}: {size} bytes over a {quota} byte quota")]
    QuotaExceeded {
        /// Slot being written
        key: String,
        /// Total bytes after the write
        size: usize,
        /// Capacity of the medium
        quota: usize,
    },

    /// Medium cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A durable key-value medium holding opaque string blobs.
///
/// Each key addresses one slot. Writes replace the whole slot; there are no
/// partial or delta updates.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the blob stored under `key`, or `None` if the slot is empty.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    async fn write(&mut self, key: &str, value: &str) -> Result<()>;
}
