//! Saved configuration - a named snapshot of the form inputs.

use serde::{Deserialize, Serialize};
use crate::id::ConfigId;
use crate::input::TaskMetricsInput;
use crate::Time;

/// A named, timestamped snapshot of a [`TaskMetricsInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    /// Unique identifier
    pub id: ConfigId,

    /// Display name (never blank)
    pub name: String,

    /// Snapshot of the inputs at save/update time
    pub data: TaskMetricsInput,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

impl SavedConfiguration {
    /// Create a new record stamped with `now` for both timestamps.
    pub fn new(name: impl Into<String>, data: TaskMetricsInput, now: Time) -> Self {
        Self {
            id: ConfigId::new(),
            name: name.into(),
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace name and data, refreshing `updated_at`.
    pub fn apply_update(&mut self, name: impl Into<String>, data: TaskMetricsInput, now: Time) {
        self.name = name.into();
        self.data = data;
        self.updated_at = now;
    }

    /// Compact summary shown in the saved-configurations list.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            total: self.data.total_tasks,
            completed: self.data.completed,
            in_progress: self.data.in_progress,
            blocked: self.data.blocked,
            has_sast: self.data.has_sast_iteration(),
        }
    }
}

/// Counts shown next to each saved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    /// Total tasks
    pub total: u64,
    /// Completed tasks
    pub completed: u64,
    /// Tasks in progress
    pub in_progress: u64,
    /// Blocked tasks
    pub blocked: u64,
    /// Whether a SAST iteration label is set
    pub has_sast: bool,
}
