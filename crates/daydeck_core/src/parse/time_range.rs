//! Clock range extraction (`9-930am`, `2 to 3pm`, `9:00–9:30am`).
//!
//! # Invariants
//! - Both minutes are present or both are absent.
//! - An inverted range with an explicit meridiem (`9pm-9am`) is returned as
//!   parsed; ordering is the caller's concern.
//! - An inverted range with no meridiem at all (`9-5`) is not a range.

use crate::localtime::MINUTES_PER_DAY;
use crate::parse::normalize_text;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(.*?)(\b\d{1,2}(?::\d{2})?\s*(?:am|pm)?\b)\s*(?:-|–|to)\s*(\b\d{1,4}(?::\d{2})?\s*(?:am|pm)?\b)(.*)",
    )
    .expect("valid time range regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Clock token split into digits and an optional am/pm suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClockToken {
    digits: String,
    meridiem: Option<Meridiem>,
}

impl ClockToken {
    fn parse(raw: &str) -> Self {
        let compact: String = raw
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if let Some(digits) = compact.strip_suffix("am") {
            return Self {
                digits: digits.to_string(),
                meridiem: Some(Meridiem::Am),
            };
        }
        if let Some(digits) = compact.strip_suffix("pm") {
            return Self {
                digits: digits.to_string(),
                meridiem: Some(Meridiem::Pm),
            };
        }
        Self {
            digits: compact,
            meridiem: None,
        }
    }

    /// Hour and minute; `930` reads as 9:30.
    fn hour_minute(&self) -> Option<(u32, u32)> {
        if let Some((hour, minute)) = self.digits.split_once(':') {
            return Some((hour.parse().ok()?, minute.parse().ok()?));
        }
        match self.digits.len() {
            1 | 2 => Some((self.digits.parse().ok()?, 0)),
            3 | 4 => {
                let (hour, minute) = self.digits.split_at(self.digits.len() - 2);
                Some((hour.parse().ok()?, minute.parse().ok()?))
            }
            _ => None,
        }
    }

    /// Minutes since midnight under the resolved meridiem.
    ///
    /// With a meridiem the hour must be 1..=12; without one the token is
    /// read on a 24-hour clock.
    fn minutes(&self, meridiem: Option<Meridiem>) -> Option<u32> {
        let (hour, minute) = self.hour_minute()?;
        if minute >= 60 {
            return None;
        }
        let hour24 = match meridiem {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                let base = hour % 12;
                match meridiem {
                    Meridiem::Am => base,
                    Meridiem::Pm => base + 12,
                }
            }
            None => {
                if hour > 23 {
                    return None;
                }
                hour
            }
        };
        let total = hour24 * 60 + minute;
        (total < MINUTES_PER_DAY).then_some(total)
    }
}

/// Start/end minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteSpan {
    pub start_min: u32,
    pub end_min: u32,
}

impl MinuteSpan {
    pub fn is_inverted(&self) -> bool {
        self.end_min <= self.start_min
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTimeRange {
    /// Text around the range with whitespace collapsed; may be empty.
    pub title: String,
    pub span: Option<MinuteSpan>,
}

/// Extracts one clock range and the residual title from `text`.
///
/// On a miss the title is the whole (normalized) input.
pub fn parse_time_range(text: &str) -> ParsedTimeRange {
    let miss = || ParsedTimeRange {
        title: normalize_text(text),
        span: None,
    };

    let Some(caps) = TIME_RANGE_RE.captures(text) else {
        return miss();
    };
    let part = |index: usize| caps.get(index).map_or("", |m| m.as_str());

    let start = ClockToken::parse(part(2));
    let end = ClockToken::parse(part(3));

    let end_meridiem = end.meridiem.or(start.meridiem);
    let start_meridiem = start.meridiem.or(end_meridiem).or(Some(Meridiem::Am));

    let (Some(start_min), Some(end_min)) =
        (start.minutes(start_meridiem), end.minutes(end_meridiem))
    else {
        return miss();
    };

    let span = MinuteSpan { start_min, end_min };
    // Without any am/pm the end is only trusted when it reads forward
    // ("9-17"); "9-5" is left to the caller as plain text.
    if start.meridiem.is_none() && end.meridiem.is_none() && span.is_inverted() {
        return miss();
    }

    let title = normalize_text(&format!("{} {}", part(1), part(4)));
    ParsedTimeRange {
        title,
        span: Some(span),
    }
}
