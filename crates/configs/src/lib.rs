//! Saved-configuration management.
//!
//! CRUD over named snapshots of the dashboard inputs, persisted as a single
//! JSON array in one storage slot.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod store;

pub use config::{StoreConfig, STORAGE_KEY};
pub use error::{ConfigError, Result};
pub use store::ConfigurationStore;
