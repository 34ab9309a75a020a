//! KPI derivation from raw task counts.

use kpi_core::TaskMetricsInput;
use serde::{Deserialize, Serialize};

/// Rate shown when there are no tasks at all.
const ZERO_RATE: &str = "0";

/// Everything the dashboard cards and summary display.
///
/// All fields are always present; degenerate inputs produce zeros and
/// [`RiskLevel::NotApplicable`] rather than missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Tasks not yet started, never negative
    pub pending_tasks: u64,

    /// Completed share of total, one decimal ("0" when there are no tasks)
    pub completion_rate: String,

    /// In-progress share of total, one decimal
    pub progress_rate: String,

    /// Blocked share of total, one decimal
    pub blocked_rate: String,

    /// Pending share of total, one decimal
    pub pending_rate: String,

    /// Completed over all touched tasks, whole percent
    pub efficiency_rate: u64,

    /// Completed per in-progress task, one decimal
    pub velocity: f64,

    /// Risk classification from blocked vs completed
    pub risk_level: RiskLevel,

    /// Productivity tier from the completion rate
    pub productivity_status: ProductivityStatus,

    /// Whether a SAST iteration label is set
    pub has_sast_iteration: bool,
}

impl DerivedMetrics {
    /// Numeric value of the completion rate as displayed.
    pub fn completion_rate_value(&self) -> f64 {
        parse_rate(&self.completion_rate)
    }
}

/// Risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No tasks to assess
    #[serde(rename = "N/A")]
    NotApplicable,
    /// Nothing blocked
    #[serde(rename = "Bajo")]
    Low,
    /// Some blocked, but within tolerance
    #[serde(rename = "Medio")]
    Medium,
    /// Blocked exceeds a fifth of completed
    #[serde(rename = "Alto")]
    High,
}

impl RiskLevel {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::NotApplicable => "N/A",
            RiskLevel::Low => "Bajo",
            RiskLevel::Medium => "Medio",
            RiskLevel::High => "Alto",
        }
    }

    /// Classify a set of counts.
    pub fn classify(input: &TaskMetricsInput) -> Self {
        if input.total_tasks == 0 {
            RiskLevel::NotApplicable
        } else if (input.blocked as f64) > (input.completed as f64) * 0.2 {
            RiskLevel::High
        } else if input.blocked > 0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Productivity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductivityStatus {
    /// Completion rate of at least 80
    #[serde(rename = "Excelente")]
    Excellent,
    /// At least 60
    #[serde(rename = "Bueno")]
    Good,
    /// At least 40
    #[serde(rename = "Regular")]
    Fair,
    /// Below 40
    #[serde(rename = "Necesita atención")]
    NeedsAttention,
}

impl ProductivityStatus {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ProductivityStatus::Excellent => "Excelente",
            ProductivityStatus::Good => "Bueno",
            ProductivityStatus::Fair => "Regular",
            ProductivityStatus::NeedsAttention => "Necesita atención",
        }
    }

    /// Tier for a completion rate in percent.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 80.0 {
            ProductivityStatus::Excellent
        } else if rate >= 60.0 {
            ProductivityStatus::Good
        } else if rate >= 40.0 {
            ProductivityStatus::Fair
        } else {
            ProductivityStatus::NeedsAttention
        }
    }
}

impl std::fmt::Display for ProductivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive all KPIs for one input. Pure and total.
pub fn derive_metrics(input: &TaskMetricsInput) -> DerivedMetrics {
    let pending_tasks = pending_tasks(input);

    let completion_rate = share_of_total(input.completed, input.total_tasks);
    let productivity_status = ProductivityStatus::from_rate(parse_rate(&completion_rate));

    DerivedMetrics {
        pending_tasks,
        progress_rate: share_of_total(input.in_progress, input.total_tasks),
        blocked_rate: share_of_total(input.blocked, input.total_tasks),
        pending_rate: share_of_total(pending_tasks, input.total_tasks),
        completion_rate,
        efficiency_rate: efficiency_rate(input),
        velocity: velocity(input),
        risk_level: RiskLevel::classify(input),
        productivity_status,
        has_sast_iteration: input.has_sast_iteration(),
    }
}

/// `max(0, total - in_progress - blocked - completed)`.
pub fn pending_tasks(input: &TaskMetricsInput) -> u64 {
    input
        .total_tasks
        .saturating_sub(input.in_progress)
        .saturating_sub(input.blocked)
        .saturating_sub(input.completed)
}

fn efficiency_rate(input: &TaskMetricsInput) -> u64 {
    let touched = input.completed as f64 + input.blocked as f64 + input.in_progress as f64;
    if touched == 0.0 {
        return 0;
    }
    (input.completed as f64 / touched * 100.0).round() as u64
}

fn velocity(input: &TaskMetricsInput) -> f64 {
    if input.in_progress == 0 {
        return 0.0;
    }
    (input.completed as f64 / input.in_progress as f64 * 10.0).round() / 10.0
}

fn share_of_total(part: u64, total: u64) -> String {
    if total == 0 {
        return ZERO_RATE.to_string();
    }
    to_fixed_1(part as f64 / total as f64 * 100.0)
}

fn parse_rate(rate: &str) -> f64 {
    rate.parse().unwrap_or(0.0)
}

/// Format a non-negative value with exactly one decimal.
///
/// The exact binary value is rounded to the nearest tenth and exact ties
/// round up, so `0.25` renders as `"0.3"`. A tie at the hundredths digit is
/// only representable when `value * 4` is an odd integer.
pub fn to_fixed_1(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters.rem_euclid(2.0) == 1.0 {
        let tenths = (value * 10.0 + 0.5).floor() as u64;
        return format!("{}.{}", tenths / 10, tenths % 10);
    }
    format!("{:.1}", value)
}
