//! Manual event creation and deletion.
//!
//! # Invariants
//! - Category is WORK exactly when a project is attached.
//! - A non-empty weekday list creates a recurring definition whose first day
//!   and clock minutes come from `start_at` in the configured zone.

use crate::config::CoreConfig;
use crate::localtime::local_date;
use crate::model::event::{DaySet, Event, EventId, RecurringEvent, RecurringEventId};
use crate::model::project::ProjectId;
use crate::model::{Category, ModelValidationError};
use crate::repo::{PlannerRepository, RepoError};
use chrono::{DateTime, Timelike, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum EventServiceError {
    Invalid(ModelValidationError),
    ProjectNotFound(ProjectId),
    EventNotFound(Uuid),
    Repo(RepoError),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ProjectNotFound(_) | Self::EventNotFound(_) => None,
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::NotFound(id) => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ModelValidationError> for EventServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Record written by [`EventService::create_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedEvent {
    OneOff(Event),
    Recurring(RecurringEvent),
}

pub struct EventService<R: PlannerRepository> {
    repo: R,
    config: CoreConfig,
}

impl<R: PlannerRepository> EventService<R> {
    pub fn new(repo: R, config: CoreConfig) -> Self {
        Self { repo, config }
    }

    pub fn create_event(
        &self,
        title: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        project_id: Option<ProjectId>,
        recurrence_days: &[u8],
    ) -> Result<CreatedEvent, EventServiceError> {
        if end_at <= start_at {
            return Err(ModelValidationError::EndNotAfterStart.into());
        }
        if let Some(id) = project_id {
            if self.repo.get_project(id)?.is_none() {
                return Err(EventServiceError::ProjectNotFound(id));
            }
        }

        let title = title.trim();
        let category = if project_id.is_some() {
            Category::Work
        } else {
            Category::Personal
        };
        let days = DaySet::from_days(recurrence_days)?;

        if days.is_empty() {
            let mut event = Event::new(title, category, start_at, end_at);
            event.project_id = project_id;
            self.repo.create_event(&event)?;
            info!(
                "event=event_create module=service status=ok kind=event id={}",
                event.id
            );
            return Ok(CreatedEvent::OneOff(event));
        }

        let tz = &self.config.timezone;
        let start_local = start_at.with_timezone(tz);
        let end_local = end_at.with_timezone(tz);
        let mut event = RecurringEvent::new(
            title,
            category,
            local_date(tz, start_at),
            start_local.hour() * 60 + start_local.minute(),
            end_local.hour() * 60 + end_local.minute(),
            days,
        );
        event.project_id = project_id;
        self.repo.create_recurring_event(&event)?;
        info!(
            "event=event_create module=service status=ok kind=recurring id={} days={}",
            event.id, event.days
        );
        Ok(CreatedEvent::Recurring(event))
    }

    pub fn delete_event(&self, id: EventId) -> Result<(), EventServiceError> {
        self.repo.delete_event(id)?;
        Ok(())
    }

    /// Deletes a recurring definition together with its weekday set.
    pub fn delete_recurring(&self, id: RecurringEventId) -> Result<(), EventServiceError> {
        self.repo.delete_recurring_event(id)?;
        Ok(())
    }
}
