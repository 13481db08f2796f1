//! "before/by <weekday>" due clauses for ingested tasks.
//!
//! - `before friday` ⇒ due at 17:00 local on the next Friday (today counts).
//! - `by friday` ⇒ due all day on that Friday.

use crate::localtime::{local_instant, next_weekday_on_or_after};
use crate::model::task::TaskDue;
use crate::parse::normalize_text;
use chrono::NaiveDate;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

/// Local wall-clock minute used for `before <day>` deadlines.
pub const BEFORE_DEADLINE_MIN: u32 = 17 * 60;

static DUE_CLAUSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(before|by)\s+(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun)\b",
    )
    .expect("valid due clause regex")
});

const WEEKDAY_NAMES: &[(&str, u8)] = &[
    ("sun", 0),
    ("sunday", 0),
    ("mon", 1),
    ("monday", 1),
    ("tue", 2),
    ("tues", 2),
    ("tuesday", 2),
    ("wed", 3),
    ("wednesday", 3),
    ("thu", 4),
    ("thur", 4),
    ("thurs", 4),
    ("thursday", 4),
    ("fri", 5),
    ("friday", 5),
    ("sat", 6),
    ("saturday", 6),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDue {
    /// Task text with the due clause removed.
    pub text: String,
    pub due: Option<TaskDue>,
}

/// Weekday number (`0 = Sunday`) for a full or abbreviated day name.
pub fn weekday_from_name(name: &str) -> Option<u8> {
    let lower = name.to_lowercase();
    WEEKDAY_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == lower)
        .map(|(_, day)| *day)
}

/// Extracts a due clause from `body`, resolving weekdays from `today`.
///
/// When the clause resolves, it and everything after it is cut from the
/// text; if that leaves nothing, the original body is kept.
pub fn parse_due(body: &str, today: NaiveDate, tz: &Tz) -> ParsedDue {
    let unmatched = || ParsedDue {
        text: normalize_text(body),
        due: None,
    };

    let Some(caps) = DUE_CLAUSE_RE.captures(body) else {
        return unmatched();
    };
    let (Some(clause), Some(word), Some(day_name)) = (caps.get(0), caps.get(1), caps.get(2))
    else {
        return unmatched();
    };
    let Some(day) = weekday_from_name(day_name.as_str())
        .and_then(|target| next_weekday_on_or_after(today, target))
    else {
        return unmatched();
    };

    let due = if word.as_str().eq_ignore_ascii_case("before") {
        TaskDue::At(local_instant(tz, day, BEFORE_DEADLINE_MIN))
    } else {
        TaskDue::Date(day)
    };

    let stripped = normalize_text(&body[..clause.start()]);
    let text = if stripped.is_empty() {
        normalize_text(body)
    } else {
        stripped
    };

    ParsedDue {
        text,
        due: Some(due),
    }
}
