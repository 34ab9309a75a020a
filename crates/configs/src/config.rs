//! Store configuration.

/// Slot key the dashboard has always used.
pub const STORAGE_KEY: &str = "kpi-dashboard-data";

/// Configuration for a [`crate::ConfigurationStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage slot holding the serialized collection
    pub key: String,
}

impl StoreConfig {
    /// Use a different storage slot.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: STORAGE_KEY.to_string(),
        }
    }
}
