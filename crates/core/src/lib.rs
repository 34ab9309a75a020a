//! KPI dashboard core data models.
//!
//! This crate defines the task-count inputs the dashboard collects and the
//! saved-configuration records persisted between sessions.

#![warn(missing_docs)]

// Core identities
mod id;

// Form inputs
mod input;

// Persisted snapshots
mod config;

// Re-exports
pub use id::ConfigId;
pub use input::{parse_count, Field, FieldEdit, TaskMetricsInput, UnknownField};
pub use config::{ConfigSummary, SavedConfiguration};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
