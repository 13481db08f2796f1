//! Free-text ingestion use-case.
//!
//! # Responsibility
//! - Split a message into fragments and turn each one into a task, a one-off
//!   event or a recurring event.
//! - Resolve optional project-key references against storage.
//!
//! # Invariants
//! - Fragments are processed strictly in order; each one's lookup and write
//!   completes before the next starts.
//! - No cross-fragment transaction: records created before a storage failure
//!   stay persisted and are reported in `IngestError::Storage`.
//! - A fragment rejected by record validation (empty title, inverted range)
//!   does not abort the message.
//! - Fragment text never reaches the log; only counts and ids do.

use crate::config::CoreConfig;
use crate::localtime::{local_date, local_instant, next_business_day, tomorrow};
use crate::model::event::{Event, RecurringEvent};
use crate::model::task::{Task, TaskDue};
use crate::model::Category;
use crate::parse::due_date::parse_due;
use crate::parse::mode::{classify, looks_work_related, IngestMode};
use crate::parse::normalize_text;
use crate::parse::project_key::split_project_key;
use crate::parse::recurrence::{parse_recurrence, strip_recurrence_keyword};
use crate::parse::split_fragments;
use crate::parse::time_range::parse_time_range;
use crate::repo::{PlannerRepository, RepoError};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Descriptor of one record created from a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreatedRecord {
    Task { id: Uuid, text: String },
    Event { id: Uuid, title: String },
    Recurring { id: Uuid, title: String },
}

impl CreatedRecord {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Task { id, .. } | Self::Event { id, .. } | Self::Recurring { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Task { .. } => "task",
            Self::Event { .. } => "event",
            Self::Recurring { .. } => "recurring",
        }
    }
}

/// Fragment that failed record validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedFragment {
    /// Zero-based position among the message's non-empty fragments.
    pub index: usize,
    pub reason: String,
}

/// Ingestion result echoed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub created: Vec<CreatedRecord>,
    pub rejected: Vec<RejectedFragment>,
    /// IANA id of the zone used for anchor dates.
    pub tz: String,
}

#[derive(Debug)]
pub enum IngestError {
    /// Message has no non-blank fragment.
    EmptyMessage,
    /// Storage failed on `fragment_index`; `created` holds what was written
    /// before it.
    Storage {
        created: Vec<CreatedRecord>,
        fragment_index: usize,
        source: RepoError,
    },
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "message is empty"),
            Self::Storage {
                created,
                fragment_index,
                source,
            } => write!(
                f,
                "storage failure on fragment {fragment_index} after {} created records: {source}",
                created.len()
            ),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyMessage => None,
            Self::Storage { source, .. } => Some(source),
        }
    }
}

/// Ingestion service over an injected repository.
pub struct IngestService<R: PlannerRepository> {
    repo: R,
    config: CoreConfig,
}

impl<R: PlannerRepository> IngestService<R> {
    pub fn new(repo: R, config: CoreConfig) -> Self {
        Self { repo, config }
    }

    /// Ingests `message` relative to the current clock.
    pub fn ingest(&self, message: &str) -> Result<IngestReport, IngestError> {
        self.ingest_at(message, Utc::now())
    }

    /// Ingests `message` with "today" taken from `now` in the configured zone.
    pub fn ingest_at(
        &self,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<IngestReport, IngestError> {
        let started_at = Instant::now();
        let fragments = split_fragments(message);
        if fragments.is_empty() {
            warn!("event=ingest module=ingest status=error error_code=empty_message");
            return Err(IngestError::EmptyMessage);
        }
        info!(
            "event=ingest module=ingest status=start fragments={}",
            fragments.len()
        );

        let mut created = Vec::with_capacity(fragments.len());
        let mut rejected = Vec::new();
        for (index, fragment) in fragments.iter().enumerate() {
            match self.ingest_fragment(fragment, now) {
                Ok(record) => {
                    info!(
                        "event=ingest_fragment module=ingest status=ok index={index} kind={} id={}",
                        record.kind(),
                        record.id()
                    );
                    created.push(record);
                }
                Err(RepoError::Validation(err)) => {
                    warn!(
                        "event=ingest_fragment module=ingest status=rejected index={index} reason={err}"
                    );
                    rejected.push(RejectedFragment {
                        index,
                        reason: err.to_string(),
                    });
                }
                Err(source) => {
                    error!(
                        "event=ingest module=ingest status=error index={index} created={} duration_ms={} error={source}",
                        created.len(),
                        started_at.elapsed().as_millis()
                    );
                    return Err(IngestError::Storage {
                        created,
                        fragment_index: index,
                        source,
                    });
                }
            }
        }

        info!(
            "event=ingest module=ingest status=ok created={} rejected={} duration_ms={}",
            created.len(),
            rejected.len(),
            started_at.elapsed().as_millis()
        );
        Ok(IngestReport {
            created,
            rejected,
            tz: self.config.timezone_id().to_string(),
        })
    }

    fn ingest_fragment(
        &self,
        fragment: &str,
        now: DateTime<Utc>,
    ) -> Result<CreatedRecord, RepoError> {
        let tz = &self.config.timezone;
        let classified = classify(fragment);
        let key_ref = split_project_key(classified.body);
        let project = match key_ref.key.as_deref() {
            Some(key) => self.repo.find_project_by_key(key)?,
            None => None,
        };
        let project_id = project.as_ref().map(|project| project.id);
        let rest = key_ref.rest;

        if classified.mode == IngestMode::Todo {
            let category = if looks_work_related(fragment) {
                Category::Work
            } else {
                Category::Personal
            };
            let parsed = parse_due(rest, local_date(tz, now), tz);
            let mut task = Task::new(parsed.text, category, now);
            task.project_id = project_id;
            task.due = parsed.due;
            return self.create_task(task);
        }

        let category = classified.mode.event_category();
        let recurrence = parse_recurrence(rest);
        let range = parse_time_range(rest);
        let title = if range.title.is_empty() {
            normalize_text(rest)
        } else {
            range.title
        };
        debug!(
            "event=ingest_classify module=ingest status=ok mode={} project_hit={} span={} recurrence={}",
            classified.mode.as_str(),
            project_id.is_some(),
            range.span.is_some(),
            recurrence.is_some()
        );

        let Some(span) = range.span else {
            let mut task = Task::new(title, category, now);
            task.project_id = project_id;
            task.due = Some(TaskDue::Date(tomorrow(tz, now)));
            return self.create_task(task);
        };

        let anchor = self.anchor_date(category, now);
        match recurrence {
            Some(recurrence) => {
                let stripped = strip_recurrence_keyword(&title, recurrence.keyword);
                let title = if stripped.is_empty() { title } else { stripped };
                let mut event = RecurringEvent::new(
                    title,
                    category,
                    anchor,
                    span.start_min,
                    span.end_min,
                    recurrence.days,
                );
                event.project_id = project_id;
                let id = self.repo.create_recurring_event(&event)?;
                Ok(CreatedRecord::Recurring {
                    id,
                    title: event.title,
                })
            }
            None => {
                let mut event = Event::new(
                    title,
                    category,
                    local_instant(tz, anchor, span.start_min),
                    local_instant(tz, anchor, span.end_min),
                );
                event.project_id = project_id;
                let id = self.repo.create_event(&event)?;
                Ok(CreatedRecord::Event {
                    id,
                    title: event.title,
                })
            }
        }
    }

    fn create_task(&self, task: Task) -> Result<CreatedRecord, RepoError> {
        let id = self.repo.create_task(&task)?;
        Ok(CreatedRecord::Task {
            id,
            text: task.text,
        })
    }

    /// Next business day for work, tomorrow otherwise.
    fn anchor_date(&self, category: Category, now: DateTime<Utc>) -> NaiveDate {
        let tz = &self.config.timezone;
        match category {
            Category::Work => next_business_day(tz, now),
            Category::Personal => tomorrow(tz, now),
        }
    }
}
