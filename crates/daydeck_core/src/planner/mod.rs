//! Pure planner algorithms.
//!
//! # Responsibility
//! - Expand recurring definitions into concrete occurrences for a window.
//! - Assign non-overlapping render columns to one day's timed entries.
//!
//! Storage access lives in `service::planner_service`; everything here is
//! side-effect free.

pub mod layout;
pub mod occurrence;

pub use layout::{
    all_day_entries, assign_columns, layout_day, ColumnAssignment, PositionedEntry, SlotGrid,
    SlotSpan,
};
pub use occurrence::{expand_occurrences, Occurrence};
