//! Local calendar arithmetic in the configured timezone.
//!
//! # Responsibility
//! - Map instants to local calendar days and back.
//! - Compute anchor dates ("tomorrow", "next business day") and weekday
//!   lookups used by ingestion and planning.
//!
//! # Invariants
//! - Weekday numbers are `0 = Sunday .. 6 = Saturday`.
//! - Local wall-clock times that fall into a DST gap are shifted forward by
//!   one hour.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Returns the local calendar day containing `instant`.
pub fn local_date(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Returns the instant of local midnight for `date`.
pub fn start_of_day(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_instant(tz, date, 0)
}

/// Resolves `date` plus `minutes` since local midnight to an instant.
///
/// Ambiguous local times (DST fall-back) use the earlier instant.
pub fn local_instant(tz: &Tz, date: NaiveDate, minutes: u32) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minutes));
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    // Spring-forward gaps are at most one hour in every zone we care about.
    let shifted: NaiveDateTime = naive + Duration::hours(1);
    if let Some(dt) = tz.from_local_datetime(&shifted).earliest() {
        warn!(
            "event=dst_gap module=localtime status=ok date={} minutes={} tz={}",
            date, minutes, tz
        );
        return dt.with_timezone(&Utc);
    }

    warn!(
        "event=dst_gap module=localtime status=error date={} minutes={} tz={} fallback=utc",
        date, minutes, tz
    );
    Utc.from_utc_datetime(&naive)
}

/// Weekday number with Sunday as `0`.
pub fn weekday_number(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always within 0..=6.
    date.weekday().num_days_from_sunday() as u8
}

/// Whether `date` falls on Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(weekday_number(date), 0 | 6)
}

/// Adds whole calendar days, saturating at the calendar bounds.
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Local calendar day after the one containing `now`.
pub fn tomorrow(tz: &Tz, now: DateTime<Utc>) -> NaiveDate {
    add_days(local_date(tz, now), 1)
}

/// First Monday-to-Friday day strictly after the day containing `now`.
pub fn next_business_day(tz: &Tz, now: DateTime<Utc>) -> NaiveDate {
    let mut day = tomorrow(tz, now);
    while is_weekend(day) {
        day = add_days(day, 1);
    }
    day
}

/// First day on or after `from` whose weekday number equals `target`.
///
/// Returns `None` when `target` is not a weekday number.
pub fn next_weekday_on_or_after(from: NaiveDate, target: u8) -> Option<NaiveDate> {
    if target > 6 {
        return None;
    }
    let mut day = from;
    while weekday_number(day) != target {
        day = add_days(day, 1);
    }
    Some(day)
}
