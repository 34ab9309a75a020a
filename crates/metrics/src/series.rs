//! Chart-ready series.
//!
//! The distribution series feeds the bar and pie charts. The trend series
//! feeds the weekly area chart and is synthetic: it is interpolated backwards
//! from the current counts to draw a plausible line, not read from any
//! historical log.

use kpi_core::TaskMetricsInput;
use serde::Serialize;
use crate::derived::pending_tasks;

/// Task state bucket shown in the distribution charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskCategory {
    /// Not started
    Pending,
    /// In progress
    InProgress,
    /// Blocked
    Blocked,
    /// Completed
    Completed,
}

impl TaskCategory {
    /// Chart order.
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Pending,
        TaskCategory::InProgress,
        TaskCategory::Blocked,
        TaskCategory::Completed,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::Pending => "Por Hacer",
            TaskCategory::InProgress => "En Progreso",
            TaskCategory::Blocked => "Bloqueadas",
            TaskCategory::Completed => "Completadas",
        }
    }

    /// Fixed fill color.
    pub fn color(&self) -> &'static str {
        match self {
            TaskCategory::Pending => "#6366f1",
            TaskCategory::InProgress => "#f59e0b",
            TaskCategory::Blocked => "#ef4444",
            TaskCategory::Completed => "#10b981",
        }
    }

    fn count(&self, input: &TaskMetricsInput) -> u64 {
        match self {
            TaskCategory::Pending => pending_tasks(input),
            TaskCategory::InProgress => input.in_progress,
            TaskCategory::Blocked => input.blocked,
            TaskCategory::Completed => input.completed,
        }
    }
}

/// One bar/slice of the distribution charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionSlice {
    /// Bucket
    pub category: TaskCategory,
    /// Display label
    pub label: &'static str,
    /// Number of tasks in the bucket
    pub count: u64,
    /// Fill color
    pub color: &'static str,
}

/// One day of the synthetic weekly trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Weekday label
    pub day: &'static str,
    /// Completed tasks for the day
    pub completed: u64,
    /// In-progress tasks for the day
    pub in_progress: u64,
}

/// Weekday labels, Monday to Friday.
pub const WEEKDAYS: [&str; 5] = ["Lun", "Mar", "Mié", "Jue", "Vie"];

/// Distance back from "today" for Monday to Thursday.
const TREND_OFFSETS: [u64; 4] = [3, 2, 1, 0];

/// Days at or below this offset show the current in-progress count.
const STEADY_IN_PROGRESS_OFFSET: u64 = 1;

/// Four buckets in fixed order: pending, in progress, blocked, completed.
pub fn build_distribution_series(input: &TaskMetricsInput) -> Vec<DistributionSlice> {
    TaskCategory::ALL
        .iter()
        .map(|category| DistributionSlice {
            category: *category,
            label: category.label(),
            count: category.count(input),
            color: category.color(),
        })
        .collect()
}

/// Five synthetic points, Monday to Friday.
///
/// Monday to Thursday step `completed` back by 3, 2, 1, 0. `in_progress` is
/// one lower on Monday, Tuesday and Friday and unchanged on Wednesday and
/// Thursday. Friday projects one more completed task.
pub fn build_trend_series(input: &TaskMetricsInput) -> Vec<TrendPoint> {
    let lowered_in_progress = input.in_progress.saturating_sub(1);

    let mut points: Vec<TrendPoint> = WEEKDAYS
        .iter()
        .zip(TREND_OFFSETS)
        .map(|(day, offset)| TrendPoint {
            day: *day,
            completed: input.completed.saturating_sub(offset),
            in_progress: if offset <= STEADY_IN_PROGRESS_OFFSET {
                input.in_progress
            } else {
                lowered_in_progress
            },
        })
        .collect();

    points.push(TrendPoint {
        day: WEEKDAYS[4],
        completed: input.completed.saturating_add(1),
        in_progress: lowered_in_progress,
    });

    points
}
