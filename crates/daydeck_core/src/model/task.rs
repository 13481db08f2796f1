//! Task model with optional due marker and ordered sub-tasks.
//!
//! # Invariants
//! - A task has at most one due marker: an instant or an all-day date.
//! - `completed_at` is set exactly while `done` is true.
//! - Sub-tasks are owned by their task and ordered by `order`.

use super::project::ProjectId;
use super::{require_text, Category, ModelValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;
pub type SubTaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Due marker; the two variants are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskDue {
    /// Due at a precise instant.
    At(DateTime<Utc>),
    /// Due some time during a local calendar day.
    Date(NaiveDate),
}

impl TaskDue {
    pub fn due_at(self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(at) => Some(at),
            Self::Date(_) => None,
        }
    }

    pub fn due_date(self) -> Option<NaiveDate> {
        match self {
            Self::At(_) => None,
            Self::Date(date) => Some(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: SubTaskId,
    pub task_id: TaskId,
    pub text: String,
    pub done: bool,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub category: Category,
    pub project_id: Option<ProjectId>,
    pub priority: Option<Priority>,
    pub due: Option<TaskDue>,
    pub done: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub subtasks: Vec<SubTask>,
}

impl Task {
    /// Creates an open task stamped with `created_at = now`.
    pub fn new(text: impl Into<String>, category: Category, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            category,
            project_id: None,
            priority: None,
            due: None,
            done: false,
            completed_at: None,
            created_at: now,
            subtasks: Vec::new(),
        }
    }

    /// Marks the task done or reopens it, keeping `completed_at` in sync.
    pub fn set_done(&mut self, done: bool, now: DateTime<Utc>) {
        if done == self.done {
            return;
        }
        self.done = done;
        self.completed_at = if done { Some(now) } else { None };
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("task text", &self.text)?;
        if self.done != self.completed_at.is_some() {
            return Err(ModelValidationError::CompletionMismatch);
        }
        for subtask in &self.subtasks {
            require_text("subtask text", &subtask.text)?;
        }
        Ok(())
    }
}
