//! Domain model for projects, calendar events, tasks and planner entries.
//!
//! # Responsibility
//! - Define canonical record shapes persisted by the repository layer.
//! - Enforce record invariants through `validate()` before persistence.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - Projects are referenced weakly by id; they never own other records.
//! - `CalendarEntry` is a derived read-only projection and is never persisted.

pub mod entry;
pub mod event;
pub mod project;
pub mod task;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Work/personal classification shared by events and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Work,
    Personal,
}

impl Category {
    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Personal => "PERSONAL",
        }
    }

    /// Parses the storage/wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "WORK" => Some(Self::Work),
            "PERSONAL" => Some(Self::Personal),
            _ => None,
        }
    }
}

/// Invariant violations detected on domain records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is blank after trimming.
    EmptyText(&'static str),
    /// Project key does not match the project-key grammar.
    InvalidProjectKey(String),
    /// Event end is not after its start.
    EndNotAfterStart,
    /// Minute-of-day value outside `0..=1439`.
    MinuteOutOfRange(u32),
    /// Recurring start minute is not before its end minute.
    InvertedMinuteRange { start_min: u32, end_min: u32 },
    /// Recurring event without any weekday.
    EmptyDays,
    /// Weekday number outside `0..=6`.
    InvalidWeekday(u8),
    /// `completed_at` disagrees with the `done` flag.
    CompletionMismatch,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText(field) => write!(f, "{field} must not be blank"),
            Self::InvalidProjectKey(key) => write!(f, "invalid project key `{key}`"),
            Self::EndNotAfterStart => write!(f, "end must be after start"),
            Self::MinuteOutOfRange(value) => {
                write!(f, "minute of day {value} is outside 0..=1439")
            }
            Self::InvertedMinuteRange { start_min, end_min } => write!(
                f,
                "start minute {start_min} must be before end minute {end_min}"
            ),
            Self::EmptyDays => write!(f, "recurring event needs at least one weekday"),
            Self::InvalidWeekday(day) => write!(f, "weekday number {day} is outside 0..=6"),
            Self::CompletionMismatch => {
                write!(f, "completed_at must be set exactly when task is done")
            }
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::EmptyText(field));
    }
    Ok(())
}
