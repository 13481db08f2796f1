//! Overlap layout for a single day's timed entries.
//!
//! # Responsibility
//! - Map entries onto a fixed slot grid (`SlotGrid`).
//! - Cluster transitively overlapping entries and assign each one a column
//!   index plus the cluster's column count.
//!
//! # Invariants
//! - Two entries of one cluster whose slot intervals intersect never share a
//!   column.
//! - `cols` of every entry equals the peak concurrency of its cluster, and
//!   `col < cols`.
//! - An entry disjoint from every other entry gets `col = 0, cols = 1`.

use crate::localtime::local_date;
use crate::model::entry::CalendarEntry;
use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

/// Half-open slot interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpan {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnAssignment {
    pub col: usize,
    pub cols: usize,
}

/// Visible day grid: `slot_minutes`-wide rows from `day_start_hour:00` up to
/// `(last_row_hour + 1):00`, so the default grid covers 06:00 to 21:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub day_start_hour: u32,
    pub last_row_hour: u32,
    pub slot_minutes: u32,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            day_start_hour: 6,
            last_row_hour: 20,
            slot_minutes: 30,
        }
    }
}

impl SlotGrid {
    pub fn slot_count(&self) -> u32 {
        let hours = self.last_row_hour.saturating_sub(self.day_start_hour) + 1;
        (hours * 60) / self.slot_minutes.max(1)
    }

    /// Clamped slot interval of `entry` on `day`, or `None` when the entry
    /// falls entirely outside the visible grid.
    ///
    /// Start is floored and end ceiled to slot boundaries using local
    /// wall-clock time; a zero-width result is widened to one slot.
    pub fn slot_span(&self, entry: &CalendarEntry, day: NaiveDate, tz: &Tz) -> Option<SlotSpan> {
        let count = i64::from(self.slot_count());
        let slot = i64::from(self.slot_minutes.max(1));
        let offset = i64::from(self.day_start_hour) * 60;

        let start_local = entry.start_at.with_timezone(tz);
        let end_local = entry.end_at.with_timezone(tz);
        let start_min = wall_minutes(start_local.hour(), start_local.minute()) - offset;
        // An entry running past midnight ends at the bottom of this day's grid.
        let end_min = if end_local.date_naive() > day {
            count * slot
        } else {
            wall_minutes(end_local.hour(), end_local.minute()) - offset
        };

        let start = start_min.div_euclid(slot).clamp(0, count);
        let mut end = (-(-end_min).div_euclid(slot)).clamp(0, count);
        if end <= start {
            end = (start + 1).min(count);
        }
        if start >= count || end <= 0 {
            return None;
        }

        Some(SlotSpan {
            start: u32::try_from(start).ok()?,
            end: u32::try_from(end).ok()?,
        })
    }
}

fn wall_minutes(hour: u32, minute: u32) -> i64 {
    i64::from(hour * 60 + minute)
}

/// Timed entry with its grid geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedEntry {
    #[serde(flatten)]
    pub entry: CalendarEntry,
    pub start_slot: u32,
    pub end_slot: u32,
    pub col: usize,
    pub cols: usize,
}

/// Assigns render columns; the result is aligned with `spans`.
pub fn assign_columns(spans: &[SlotSpan]) -> Vec<ColumnAssignment> {
    let mut assignments = vec![ColumnAssignment { col: 0, cols: 1 }; spans.len()];

    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&index| (spans[index].start, spans[index].end));

    let mut cluster: Vec<usize> = Vec::new();
    let mut cluster_end = 0;
    for index in order {
        let span = spans[index];
        if !cluster.is_empty() && span.start >= cluster_end {
            assign_cluster(&cluster, spans, &mut assignments);
            cluster.clear();
        }
        cluster_end = if cluster.is_empty() {
            span.end
        } else {
            cluster_end.max(span.end)
        };
        cluster.push(index);
    }
    if !cluster.is_empty() {
        assign_cluster(&cluster, spans, &mut assignments);
    }

    assignments
}

fn assign_cluster(cluster: &[usize], spans: &[SlotSpan], assignments: &mut [ColumnAssignment]) {
    // (end slot, column) of entries still running.
    let mut active: Vec<(u32, usize)> = Vec::new();
    let mut peak = 0;

    for &index in cluster {
        let span = spans[index];
        active.retain(|(end, _)| *end > span.start);

        let col = (0..)
            .find(|candidate| !active.iter().any(|(_, used)| used == candidate))
            .unwrap_or(active.len());
        active.push((span.end, col));
        peak = peak.max(active.len());
        assignments[index].col = col;
    }

    let cols = peak.max(1);
    for &index in cluster {
        assignments[index].cols = cols;
    }
}

/// Lays out the timed entries that start on `day`.
///
/// Entries are returned in slot order (start, then end).
pub fn layout_day(
    entries: &[CalendarEntry],
    day: NaiveDate,
    tz: &Tz,
    grid: &SlotGrid,
) -> Vec<PositionedEntry> {
    let (timed, spans): (Vec<&CalendarEntry>, Vec<SlotSpan>) = entries
        .iter()
        .filter(|entry| entry.all_day != Some(true))
        .filter(|entry| local_date(tz, entry.start_at) == day)
        .filter_map(|entry| grid.slot_span(entry, day, tz).map(|span| (entry, span)))
        .unzip();

    let assignments = assign_columns(&spans);
    let mut positioned: Vec<PositionedEntry> = timed
        .into_iter()
        .zip(spans)
        .zip(assignments)
        .map(|((entry, span), assignment)| PositionedEntry {
            entry: entry.clone(),
            start_slot: span.start,
            end_slot: span.end,
            col: assignment.col,
            cols: assignment.cols,
        })
        .collect();
    positioned.sort_by_key(|item| (item.start_slot, item.end_slot));
    positioned
}

/// All-day entries whose start falls on `day`.
pub fn all_day_entries(entries: &[CalendarEntry], day: NaiveDate, tz: &Tz) -> Vec<CalendarEntry> {
    entries
        .iter()
        .filter(|entry| entry.all_day == Some(true))
        .filter(|entry| local_date(tz, entry.start_at) == day)
        .cloned()
        .collect()
}
