//! Task metrics input - the raw values the dashboard form collects.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw task counts plus the SAST iteration label.
///
/// Counts are unsigned, so anything negative coming from the UI or from a
/// stored payload is clamped to zero before it reaches this type. The counts
/// are not cross-checked: `in_progress + blocked + completed` may exceed
/// `total_tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetricsInput {
    /// Total number of tasks
    #[serde(deserialize_with = "clamped_count")]
    pub total_tasks: u64,

    /// Tasks currently in progress
    #[serde(deserialize_with = "clamped_count")]
    pub in_progress: u64,

    /// Blocked tasks
    #[serde(deserialize_with = "clamped_count")]
    pub blocked: u64,

    /// Completed tasks
    #[serde(deserialize_with = "clamped_count")]
    pub completed: u64,

    /// Free-text SAST iteration label, stored verbatim
    #[serde(default)]
    pub sast_iteration: String,
}

impl TaskMetricsInput {
    /// Create an input from the four counts, with an empty SAST label.
    pub fn new(total_tasks: u64, in_progress: u64, blocked: u64, completed: u64) -> Self {
        Self {
            total_tasks,
            in_progress,
            blocked,
            completed,
            sast_iteration: String::new(),
        }
    }

    /// Set the SAST iteration label.
    pub fn with_sast_iteration(mut self, label: impl Into<String>) -> Self {
        self.sast_iteration = label.into();
        self
    }

    /// Build an input from signed counts, clamping negatives to zero.
    pub fn from_signed(total_tasks: i64, in_progress: i64, blocked: i64, completed: i64) -> Self {
        Self::new(
            clamp_signed(total_tasks),
            clamp_signed(in_progress),
            clamp_signed(blocked),
            clamp_signed(completed),
        )
    }

    /// Whether the SAST iteration label has any non-whitespace content.
    pub fn has_sast_iteration(&self) -> bool {
        !self.sast_iteration.trim().is_empty()
    }

    /// True if any count is positive or the SAST label is non-blank.
    ///
    /// The UI uses this to decide whether offering a save makes sense.
    pub fn has_meaningful_data(&self) -> bool {
        self.total_tasks > 0
            || self.in_progress > 0
            || self.blocked > 0
            || self.completed > 0
            || self.has_sast_iteration()
    }

    /// Apply a raw form edit.
    ///
    /// Numeric fields are coerced with [`parse_count`]; the SAST label is
    /// taken verbatim.
    pub fn apply_edit(&mut self, field: Field, value: &str) {
        match field {
            Field::TotalTasks => self.total_tasks = parse_count(value),
            Field::InProgress => self.in_progress = parse_count(value),
            Field::Blocked => self.blocked = parse_count(value),
            Field::Completed => self.completed = parse_count(value),
            Field::SastIteration => self.sast_iteration = value.to_string(),
        }
    }

    /// Apply a batch of edits in order.
    pub fn apply_edits<'a>(&mut self, edits: impl IntoIterator<Item = &'a FieldEdit>) {
        for edit in edits {
            self.apply_edit(edit.field, &edit.value);
        }
    }
}

/// An editable field of the metrics form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// `totalTasks`
    TotalTasks,
    /// `inProgress`
    InProgress,
    /// `blocked`
    Blocked,
    /// `completed`
    Completed,
    /// `sastIteration`
    SastIteration,
}

impl Field {
    /// All fields, in form order.
    pub const ALL: [Field; 5] = [
        Field::TotalTasks,
        Field::InProgress,
        Field::Blocked,
        Field::Completed,
        Field::SastIteration,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::TotalTasks => "totalTasks",
            Field::InProgress => "inProgress",
            Field::Blocked => "blocked",
            Field::Completed => "completed",
            Field::SastIteration => "sastIteration",
        }
    }

    /// Whether edits to this field are coerced to a count.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Field::SastIteration)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field: {0}")]
pub struct UnknownField(pub String);

impl std::str::FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "totalTasks" | "total_tasks" => Ok(Field::TotalTasks),
            "inProgress" | "in_progress" => Ok(Field::InProgress),
            "blocked" => Ok(Field::Blocked),
            "completed" => Ok(Field::Completed),
            "sastIteration" | "sast_iteration" => Ok(Field::SastIteration),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// A raw field-edit event from the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdit {
    /// Edited field
    pub field: Field,
    /// Raw text the user entered
    pub value: String,
}

impl FieldEdit {
    /// Create a new edit.
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Coerce raw form text to a count.
///
/// Follows `parseInt` prefix semantics: leading whitespace is skipped, an
/// optional sign is read, then the longest run of digits (hex after a `0x`
/// prefix). Text with no leading digits yields 0, negative values clamp to 0,
/// and values beyond `u64::MAX` saturate.
pub fn parse_count(value: &str) -> u64 {
    let s = value.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if s.starts_with("0x") || s.starts_with("0X") {
        (16, &s[2..])
    } else {
        (10, s)
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() || negative {
        return 0;
    }

    digits.chars().fold(0u64, |acc, c| {
        let d = c.to_digit(radix).unwrap_or(0) as u64;
        acc.saturating_mul(radix as u64).saturating_add(d)
    })
}

fn clamp_signed(value: i64) -> u64 {
    value.max(0) as u64
}

/// Accept any JSON number for a count: unsigned values are kept exactly,
/// negatives and NaN become 0 and fractional values are truncated.
fn clamped_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CountVisitor)
}

struct CountVisitor;

impl<'de> Visitor<'de> for CountVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a task count")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
        Ok(clamp_signed(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<u64, E> {
        if value.is_finite() && value > 0.0 {
            // float-to-int casts saturate at u64::MAX
            Ok(value.trunc() as u64)
        } else {
            Ok(0)
        }
    }
}
