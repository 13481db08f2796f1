//! Core domain logic for daydeck.
//! This crate is the single source of truth for planner and ingestion
//! invariants.

pub mod config;
pub mod db;
pub mod localtime;
pub mod logging;
pub mod model;
pub mod parse;
pub mod planner;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::entry::{CalendarEntry, EntryKind};
pub use model::event::{DaySet, Event, RecurringEvent};
pub use model::project::Project;
pub use model::task::{Priority, SubTask, Task, TaskDue};
pub use model::{Category, ModelValidationError};
pub use planner::{
    all_day_entries, assign_columns, layout_day, ColumnAssignment, PositionedEntry, SlotGrid,
    SlotSpan,
};
pub use repo::{PlannerRepository, RepoError, RepoResult, SqliteCalendarRepository};
pub use service::event_service::{CreatedEvent, EventService, EventServiceError};
pub use service::ingest_service::{
    CreatedRecord, IngestError, IngestReport, IngestService, RejectedFragment,
};
pub use service::planner_service::{PlannerError, PlannerService, TimeWindow};
pub use service::project_service::{ProjectService, ProjectServiceError};
pub use service::task_service::{TaskGroup, TaskService, TaskServiceError, TaskUpdate};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
