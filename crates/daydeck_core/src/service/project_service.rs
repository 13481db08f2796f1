//! Project use-cases.
//!
//! # Invariants
//! - Keys are trimmed and upper-cased before validation and lookup.
//! - Deleting a project detaches, never deletes, its events and tasks.

use crate::model::project::{normalize_project_key, Project, ProjectId};
use crate::model::ModelValidationError;
use crate::repo::{ProjectRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ProjectServiceError {
    /// Empty name, empty key or a key outside the reference grammar.
    Invalid(ModelValidationError),
    KeyInUse(String),
    ProjectNotFound(ProjectId),
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::KeyInUse(key) => write!(f, "key `{key}` is already in use"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::KeyInUse(_) | Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_project(
        &self,
        key: &str,
        name: &str,
        color: &str,
    ) -> Result<Project, ProjectServiceError> {
        let project = Project::new(key, name.trim(), color.trim());
        project.validate().map_err(ProjectServiceError::Invalid)?;

        match self.repo.create_project(&project) {
            Ok(_) => {}
            Err(RepoError::Conflict(_)) => {
                return Err(ProjectServiceError::KeyInUse(project.key));
            }
            Err(err) => return Err(err.into()),
        }
        info!(
            "event=project_create module=service status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    /// Updates name and/or color; `None` leaves the field unchanged.
    pub fn update_project(
        &self,
        id: ProjectId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Project, ProjectServiceError> {
        let mut project = self
            .repo
            .get_project(id)?
            .ok_or(ProjectServiceError::ProjectNotFound(id))?;
        if let Some(name) = name {
            project.name = name.trim().to_string();
        }
        if let Some(color) = color {
            project.color = color.trim().to_string();
        }
        self.repo.update_project(&project)?;
        Ok(project)
    }

    pub fn delete_project(&self, id: ProjectId) -> Result<(), ProjectServiceError> {
        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id}");
        Ok(())
    }

    pub fn find_by_key(&self, key: &str) -> Result<Option<Project>, ProjectServiceError> {
        Ok(self.repo.find_project_by_key(&normalize_project_key(key))?)
    }

    /// All projects sorted by name.
    pub fn list_projects(&self) -> Result<Vec<Project>, ProjectServiceError> {
        Ok(self.repo.list_projects()?)
    }
}
