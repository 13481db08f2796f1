//! Recurring event occurrence expansion.
//!
//! # Invariants
//! - An occurrence on day `d` exists only if `d >= start_date` and the
//!   weekday of `d` is in the definition's day set.
//! - Returned occurrences intersect the requested `[from, to)` window.
//! - Expansion is window-additive: adjacent windows together yield the same
//!   occurrences as their union.

use crate::localtime::{add_days, local_date, local_instant, start_of_day, weekday_number};
use crate::model::entry::format_instant;
use crate::model::event::{RecurringEvent, RecurringEventId};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// One concrete instance of a recurring event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Occurrence {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl Occurrence {
    /// Stable render key `<recurring id>:<start instant>`.
    pub fn key(&self, recurring_id: RecurringEventId) -> String {
        format!("{recurring_id}:{}", format_instant(self.start_at))
    }
}

/// Expands `event` over `[from, to)` in `tz`, in chronological order.
///
/// Every local day whose midnight falls before `to` is visited, starting at
/// the day containing `from` (or `start_date`, whichever is later).
pub fn expand_occurrences(
    event: &RecurringEvent,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    tz: &Tz,
) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    if from >= to || event.days.is_empty() {
        return occurrences;
    }

    let mut day = local_date(tz, from).max(event.start_date);
    while start_of_day(tz, day) < to {
        if event.days.contains(weekday_number(day)) {
            let start_at = local_instant(tz, day, event.start_min);
            let end_at = local_instant(tz, day, event.end_min);
            if end_at > start_at && start_at < to && end_at > from {
                occurrences.push(Occurrence { start_at, end_at });
            }
        }
        let next = add_days(day, 1);
        if next == day {
            break;
        }
        day = next;
    }
    occurrences
}
