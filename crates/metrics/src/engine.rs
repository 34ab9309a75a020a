//! Metrics engine facade.

use kpi_core::TaskMetricsInput;
use serde::Serialize;
use crate::derived::{derive_metrics, DerivedMetrics};
use crate::series::{build_distribution_series, build_trend_series, DistributionSlice, TrendPoint};

/// Everything the dashboard renders for one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// The input the view was derived from
    pub input: TaskMetricsInput,
    /// Card and summary values
    pub metrics: DerivedMetrics,
    /// Bar/pie chart data
    pub distribution: Vec<DistributionSlice>,
    /// Weekly area chart data (synthetic)
    pub trend: Vec<TrendPoint>,
}

/// Stateless metrics engine.
///
/// Every call recomputes from the input; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine;

impl MetricsEngine {
    /// Create an engine.
    pub fn new() -> Self {
        Self
    }

    /// Derive card and summary values.
    pub fn derive(&self, input: &TaskMetricsInput) -> DerivedMetrics {
        derive_metrics(input)
    }

    /// Distribution chart data.
    pub fn distribution(&self, input: &TaskMetricsInput) -> Vec<DistributionSlice> {
        build_distribution_series(input)
    }

    /// Synthetic weekly trend.
    pub fn trend(&self, input: &TaskMetricsInput) -> Vec<TrendPoint> {
        build_trend_series(input)
    }

    /// Full view model for one input.
    pub fn summarize(&self, input: &TaskMetricsInput) -> DashboardView {
        DashboardView {
            input: input.clone(),
            metrics: self.derive(input),
            distribution: self.distribution(input),
            trend: self.trend(input),
        }
    }
}
