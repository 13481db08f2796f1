//! One-off and recurring calendar events.
//!
//! # Invariants
//! - `Event::end_at > Event::start_at`.
//! - `RecurringEvent`: `0 <= start_min < end_min <= 1439` and `days` is a
//!   non-empty set of weekday numbers (`0 = Sunday .. 6 = Saturday`).
//! - A recurring event owns its weekday set.

use super::project::ProjectId;
use super::{require_text, Category, ModelValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type EventId = Uuid;
pub type RecurringEventId = Uuid;

/// Last valid minute of a day.
pub const MAX_MINUTE_OF_DAY: u32 = 1439;

/// Compact set of weekday numbers (`0 = Sunday`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DaySet(u8);

impl DaySet {
    pub const WEEKDAYS: DaySet = DaySet(0b0011_1110);
    pub const MON_TO_THU: DaySet = DaySet(0b0001_1110);
    pub const EVERY_DAY: DaySet = DaySet(0b0111_1111);

    /// Builds a set from weekday numbers, rejecting values above 6.
    pub fn from_days(days: &[u8]) -> Result<Self, ModelValidationError> {
        let mut bits = 0u8;
        for &day in days {
            if day > 6 {
                return Err(ModelValidationError::InvalidWeekday(day));
            }
            bits |= 1 << day;
        }
        Ok(Self(bits))
    }

    pub fn contains(self, day: u8) -> bool {
        day <= 6 && self.0 & (1 << day) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Weekday numbers in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0u8..=6).filter(move |day| self.contains(*day))
    }
}

impl TryFrom<Vec<u8>> for DaySet {
    type Error = ModelValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_days(&value)
    }
}

impl From<DaySet> for Vec<u8> {
    fn from(value: DaySet) -> Self {
        value.iter().collect()
    }
}

impl Display for DaySet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let days = self
            .iter()
            .map(|day| day.to_string())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&days)
    }
}

/// One-off timed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub category: Category,
    pub project_id: Option<ProjectId>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        category: Category,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category,
            project_id: None,
            start_at,
            end_at,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("event title", &self.title)?;
        if self.end_at <= self.start_at {
            return Err(ModelValidationError::EndNotAfterStart);
        }
        Ok(())
    }
}

/// Weekly recurring event expanded into occurrences on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringEvent {
    pub id: RecurringEventId,
    pub title: String,
    pub category: Category,
    pub project_id: Option<ProjectId>,
    /// First local calendar day that may carry an occurrence.
    pub start_date: NaiveDate,
    /// Minutes since local midnight.
    pub start_min: u32,
    /// Minutes since local midnight.
    pub end_min: u32,
    pub days: DaySet,
}

impl RecurringEvent {
    pub fn new(
        title: impl Into<String>,
        category: Category,
        start_date: NaiveDate,
        start_min: u32,
        end_min: u32,
        days: DaySet,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category,
            project_id: None,
            start_date,
            start_min,
            end_min,
            days,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("recurring event title", &self.title)?;
        for minute in [self.start_min, self.end_min] {
            if minute > MAX_MINUTE_OF_DAY {
                return Err(ModelValidationError::MinuteOutOfRange(minute));
            }
        }
        if self.start_min >= self.end_min {
            return Err(ModelValidationError::InvertedMinuteRange {
                start_min: self.start_min,
                end_min: self.end_min,
            });
        }
        if self.days.is_empty() {
            return Err(ModelValidationError::EmptyDays);
        }
        Ok(())
    }
}
