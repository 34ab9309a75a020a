//! KPI metrics engine.
//!
//! Pure derivation of dashboard KPIs and chart series from raw task counts.
//! Nothing here fails: every division is guarded and counts are unsigned.

#![warn(missing_docs)]

pub mod derived;
pub mod series;
pub mod engine;

pub use derived::{
    derive_metrics, pending_tasks, to_fixed_1, DerivedMetrics, ProductivityStatus, RiskLevel,
};
pub use series::{
    build_distribution_series, build_trend_series, DistributionSlice, TaskCategory, TrendPoint,
    WEEKDAYS,
};
pub use engine::{DashboardView, MetricsEngine};
