//! Errors returned by the configuration store.

use kpi_core::ConfigId;
use kpi_storage::StorageError;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Why a store operation failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Name is empty after trimming
    #[error("Configuration name cannot be empty")]
    InvalidName,

    /// No record with this id
    #[error("Configuration not found: {0}")]
    NotFound(ConfigId),

    /// Medium unavailable, over quota, or the collection failed to serialize
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Stored payload could not be parsed
    #[error("Corrupt stored data: {0}")]
    CorruptData(String),
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Persistence(e.to_string())
    }
}
