//! Planner projection shared by events, recurring occurrences and tasks.

use super::project::Project;
use super::Category;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Event,
    Task,
}

/// Read-only timeline entry produced by the planner.
///
/// `id` is the record UUID for events/tasks and
/// `<recurring id>:<occurrence start>` for recurring occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub kind: EntryKind,
    pub id: String,
    pub title: String,
    #[serde(serialize_with = "serialize_instant")]
    pub start_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_instant")]
    pub end_at: DateTime<Utc>,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_color: Option<String>,
}

impl CalendarEntry {
    /// Copies display fields from the associated project, if any.
    pub fn with_project(mut self, project: Option<&Project>) -> Self {
        if let Some(project) = project {
            self.project_key = Some(project.key.clone());
            self.project_label = Some(project.name.clone());
            self.project_color = Some(project.color.clone());
        }
        self
    }

    /// Whether the entry covers `[from, to)` at least partially.
    pub fn intersects(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start_at < to && self.end_at > from
    }
}

/// Fixed-width ISO-8601 form (`YYYY-MM-DDTHH:MM:SS.mmmZ`).
///
/// Lexicographic order of this form equals chronological order.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_instant<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_instant(*instant))
}
