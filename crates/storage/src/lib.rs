//! Storage abstraction and implementations for the KPI dashboard.
//!
//! This crate provides a trait-based key-value medium with a JSON-file
//! implementation for on-device persistence and an in-memory one.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonFileStorage;
pub use memory::MemoryStorage;
