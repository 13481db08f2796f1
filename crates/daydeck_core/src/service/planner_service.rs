//! Planner aggregation use-case.
//!
//! # Responsibility
//! - Gather one-off events, recurring occurrences and due tasks for a
//!   half-open window into one chronologically sorted timeline.
//! - Attach project display fields to every entry.
//!
//! # Invariants
//! - Every returned entry intersects `[from, to)`.
//! - Ties on `start_at` keep encounter order: recurring occurrences, then
//!   one-off events, then tasks.
//! - Nothing is cached; each call reads current storage state.

use crate::config::CoreConfig;
use crate::localtime::{add_days, local_date, start_of_day};
use crate::model::entry::{CalendarEntry, EntryKind};
use crate::model::event::{Event, RecurringEvent};
use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskDue};
use crate::planner::expand_occurrences;
use crate::repo::{PlannerRepository, RepoError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Span given to tasks that are due at a precise instant.
pub const TIMED_TASK_MINUTES: i64 = 30;

#[derive(Debug)]
pub enum PlannerError {
    /// `from` is not strictly before `to`.
    InvalidWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    Repo(RepoError),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWindow { from, to } => {
                write!(f, "invalid window: `{from}` is not before `{to}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidWindow { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for PlannerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Half-open instant window `[from, to)` with `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, PlannerError> {
        if from >= to {
            return Err(PlannerError::InvalidWindow { from, to });
        }
        Ok(Self { from, to })
    }

    /// Window covering the local calendar day `date`.
    pub fn local_day(tz: &Tz, date: NaiveDate) -> Result<Self, PlannerError> {
        Self::new(start_of_day(tz, date), start_of_day(tz, add_days(date, 1)))
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }
}

/// Planner service over an injected repository.
pub struct PlannerService<R: PlannerRepository> {
    repo: R,
    config: CoreConfig,
}

impl<R: PlannerRepository> PlannerService<R> {
    pub fn new(repo: R, config: CoreConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Sorted timeline for `window`.
    pub fn window_entries(&self, window: &TimeWindow) -> Result<Vec<CalendarEntry>, PlannerError> {
        self.window_entries_at(window, Utc::now())
    }

    /// Same as [`Self::window_entries`]; `now` anchors the fallback day of
    /// tasks without a due marker.
    pub fn window_entries_at(
        &self,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEntry>, PlannerError> {
        let started_at = Instant::now();
        match self.collect_entries(window, now) {
            Ok(entries) => {
                info!(
                    "event=planner_window module=planner status=ok entries={} duration_ms={}",
                    entries.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(entries)
            }
            Err(err) => {
                error!(
                    "event=planner_window module=planner status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(PlannerError::Repo(err))
            }
        }
    }

    /// Timeline for the local calendar day `date`.
    pub fn day_entries(&self, date: NaiveDate) -> Result<Vec<CalendarEntry>, PlannerError> {
        let window = TimeWindow::local_day(&self.config.timezone, date)?;
        self.window_entries(&window)
    }

    fn collect_entries(
        &self,
        window: &TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEntry>, RepoError> {
        let tz = &self.config.timezone;
        let (from, to) = (window.from, window.to);

        let events = self.repo.list_events_in_range(from, to)?;
        let recurring = self.repo.list_recurring_starting_by(local_date(tz, to))?;
        let tasks = self.repo.list_tasks_due_in(
            from,
            to,
            local_date(tz, from),
            local_date(tz, to),
        )?;
        let projects: HashMap<ProjectId, Project> = self
            .repo
            .list_projects()?
            .into_iter()
            .map(|project| (project.id, project))
            .collect();
        let project_of =
            |id: Option<ProjectId>| id.and_then(|project_id| projects.get(&project_id));

        let mut entries = Vec::new();
        for event in &recurring {
            entries.extend(
                recurring_entries(event, from, to, tz)
                    .map(|entry| entry.with_project(project_of(event.project_id))),
            );
        }
        entries.extend(
            events
                .iter()
                .map(|event| event_entry(event).with_project(project_of(event.project_id))),
        );
        entries.extend(tasks.iter().map(|task| {
            task_entry(task, tz, now).with_project(project_of(task.project_id))
        }));

        entries.sort_by_key(|entry| entry.start_at);
        Ok(entries)
    }
}

fn recurring_entries<'a>(
    event: &'a RecurringEvent,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    tz: &Tz,
) -> impl Iterator<Item = CalendarEntry> + 'a {
    expand_occurrences(event, from, to, tz)
        .into_iter()
        .map(move |occurrence| CalendarEntry {
            kind: EntryKind::Event,
            id: occurrence.key(event.id),
            title: event.title.clone(),
            start_at: occurrence.start_at,
            end_at: occurrence.end_at,
            category: event.category,
            all_day: None,
            done: None,
            project_key: None,
            project_label: None,
            project_color: None,
        })
}

fn event_entry(event: &Event) -> CalendarEntry {
    CalendarEntry {
        kind: EntryKind::Event,
        id: event.id.to_string(),
        title: event.title.clone(),
        start_at: event.start_at,
        end_at: event.end_at,
        category: event.category,
        all_day: None,
        done: None,
        project_key: None,
        project_label: None,
        project_color: None,
    }
}

/// Timed tasks span 30 minutes from `due_at`; all-day tasks span their due
/// day, falling back to the day containing `now`.
fn task_entry(task: &Task, tz: &Tz, now: DateTime<Utc>) -> CalendarEntry {
    let (start_at, end_at, all_day) = match task.due {
        Some(TaskDue::At(at)) => (at, at + Duration::minutes(TIMED_TASK_MINUTES), false),
        Some(TaskDue::Date(date)) => day_bounds(tz, date),
        None => day_bounds(tz, local_date(tz, now)),
    };
    CalendarEntry {
        kind: EntryKind::Task,
        id: task.id.to_string(),
        title: task.text.clone(),
        start_at,
        end_at,
        category: task.category,
        all_day: Some(all_day),
        done: Some(task.done),
        project_key: None,
        project_label: None,
        project_color: None,
    }
}

fn day_bounds(tz: &Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>, bool) {
    (
        start_of_day(tz, date),
        start_of_day(tz, add_days(date, 1)),
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::{task_entry, PlannerError, TimeWindow};
    use crate::model::task::{Task, TaskDue};
    use crate::model::Category;
    use chrono::{DateTime, NaiveDate, Utc};

    const NY: chrono_tz::Tz = chrono_tz::America::New_York;

    fn instant(value: &str) -> DateTime<Utc> {
        value.parse().unwrap()
    }

    #[test]
    fn window_requires_from_before_to() {
        let at = instant("2026-10-14T12:00:00Z");
        assert!(matches!(
            TimeWindow::new(at, at),
            Err(PlannerError::InvalidWindow { .. })
        ));
        assert!(TimeWindow::new(at, instant("2026-10-14T12:00:01Z")).is_ok());
    }

    #[test]
    fn local_day_window_spans_local_midnights() {
        let window = TimeWindow::local_day(&NY, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap())
            .unwrap();
        assert_eq!(window.from(), instant("2026-10-14T04:00:00Z"));
        assert_eq!(window.to(), instant("2026-10-15T04:00:00Z"));
    }

    #[test]
    fn timed_task_spans_thirty_minutes() {
        let now = instant("2026-10-14T15:00:00Z");
        let mut task = Task::new("send invoice", Category::Work, now);
        task.due = Some(TaskDue::At(instant("2026-10-15T21:00:00Z")));
        let entry = task_entry(&task, &NY, now);
        assert_eq!(entry.end_at, instant("2026-10-15T21:30:00Z"));
        assert_eq!(entry.all_day, Some(false));
        assert_eq!(entry.done, Some(false));
    }

    #[test]
    fn undated_task_falls_back_to_today() {
        let now = instant("2026-10-15T02:00:00Z");
        let task = Task::new("loose end", Category::Personal, now);
        let entry = task_entry(&task, &NY, now);
        // 22:00 EDT on the 14th is still the 14th locally.
        assert_eq!(entry.start_at, instant("2026-10-14T04:00:00Z"));
        assert_eq!(entry.end_at, instant("2026-10-15T04:00:00Z"));
        assert_eq!(entry.all_day, Some(true));
    }
}
