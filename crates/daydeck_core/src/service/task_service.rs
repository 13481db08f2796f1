//! Task board use-cases.
//!
//! # Responsibility
//! - Create, edit, complete and delete tasks and their sub-tasks.
//! - Build the project-grouped board of open and recently completed tasks.
//!
//! # Invariants
//! - `completed_at` is stamped when a task becomes done and cleared when it
//!   is reopened.
//! - Completed tasks leave the board `ARCHIVE_DAYS` after completion.
//! - Board groups: the no-project group first, then every project by name
//!   (empty groups included).

use crate::model::project::{Project, ProjectId};
use crate::model::task::{Priority, SubTask, SubTaskId, Task, TaskDue, TaskId};
use crate::model::{Category, ModelValidationError};
use crate::repo::{ProjectRepository, RepoError, TaskRepository};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Days a completed task stays visible on the board.
pub const ARCHIVE_DAYS: i64 = 7;

#[derive(Debug)]
pub enum TaskServiceError {
    Invalid(ModelValidationError),
    NotFound(Uuid),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task or subtask not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Tasks of one project, or of no project when `project` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub project: Option<Project>,
    pub tasks: Vec<Task>,
}

/// Partial task edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub text: Option<String>,
    pub priority: Option<Option<Priority>>,
    pub due_date: Option<Option<NaiveDate>>,
}

pub struct TaskService<R: TaskRepository + ProjectRepository> {
    repo: R,
}

impl<R: TaskRepository + ProjectRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_task(
        &self,
        text: &str,
        project_id: Option<ProjectId>,
        priority: Option<Priority>,
        due_date: Option<NaiveDate>,
    ) -> Result<Task, TaskServiceError> {
        self.create_task_at(text, project_id, priority, due_date, Utc::now())
    }

    /// Creates an open task; category is WORK exactly when a project is set.
    pub fn create_task_at(
        &self,
        text: &str,
        project_id: Option<ProjectId>,
        priority: Option<Priority>,
        due_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskServiceError> {
        let category = if project_id.is_some() {
            Category::Work
        } else {
            Category::Personal
        };
        let mut task = Task::new(text.trim(), category, now);
        task.project_id = project_id;
        task.priority = priority;
        task.due = due_date.map(TaskDue::Date);

        self.repo.create_task(&task)?;
        info!("event=task_create module=service status=ok task_id={}", task.id);
        Ok(task)
    }

    pub fn update_task(&self, id: TaskId, update: TaskUpdate) -> Result<Task, TaskServiceError> {
        let mut task = self.load_task(id)?;
        if let Some(text) = update.text {
            task.text = text.trim().to_string();
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            task.due = due_date.map(TaskDue::Date);
        }
        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Flips completion, stamping or clearing `completed_at` with `now`.
    pub fn toggle_task(&self, id: TaskId, now: DateTime<Utc>) -> Result<Task, TaskServiceError> {
        let mut task = self.load_task(id)?;
        let done = !task.done;
        task.set_done(done, now);
        self.repo.update_task(&task)?;
        info!("event=task_toggle module=service status=ok task_id={id} done={done}");
        Ok(task)
    }

    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        Ok(())
    }

    pub fn add_subtask(&self, task_id: TaskId, text: &str) -> Result<SubTask, TaskServiceError> {
        Ok(self.repo.add_subtask(task_id, text.trim())?)
    }

    pub fn toggle_subtask(&self, id: SubTaskId) -> Result<SubTask, TaskServiceError> {
        let mut subtask = self
            .repo
            .get_subtask(id)?
            .ok_or(TaskServiceError::NotFound(id))?;
        subtask.done = !subtask.done;
        self.repo.update_subtask(&subtask)?;
        Ok(subtask)
    }

    pub fn delete_subtask(&self, id: SubTaskId) -> Result<(), TaskServiceError> {
        self.repo.delete_subtask(id)?;
        Ok(())
    }

    /// Board groups as of `now`.
    ///
    /// Within a group, open tasks come first, then newest first.
    pub fn grouped_tasks(&self, now: DateTime<Utc>) -> Result<Vec<TaskGroup>, TaskServiceError> {
        let cutoff = now - Duration::days(ARCHIVE_DAYS);
        let tasks = self.repo.list_board_tasks(cutoff)?;
        let projects = self.repo.list_projects()?;

        let mut groups = Vec::with_capacity(projects.len() + 1);
        groups.push(TaskGroup {
            project: None,
            tasks: Vec::new(),
        });
        groups.extend(projects.into_iter().map(|project| TaskGroup {
            project: Some(project),
            tasks: Vec::new(),
        }));

        for task in tasks {
            let slot = task
                .project_id
                .and_then(|project_id| {
                    groups.iter().position(|group| {
                        group.project.as_ref().map(|project| project.id) == Some(project_id)
                    })
                })
                .unwrap_or(0);
            groups[slot].tasks.push(task);
        }
        Ok(groups)
    }

    fn load_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::NotFound(id))
    }
}
