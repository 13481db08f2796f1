//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - Keys are stored upper-case; lookup by key is an exact match.
//! - Deleting a project detaches referencing records (`ON DELETE SET NULL`).

use super::{is_unique_violation, parse_uuid, RepoError, RepoResult, SqliteCalendarRepository};
use crate::model::project::{Project, ProjectId};
use rusqlite::{params, Row};

const PROJECT_SELECT_SQL: &str = "SELECT uuid, key, name, color FROM projects";

/// Repository interface for project records.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Exact, case-sensitive lookup on the stored upper-case key.
    fn find_project_by_key(&self, key: &str) -> RepoResult<Option<Project>>;
    /// All projects ordered by name.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
}

impl ProjectRepository for SqliteCalendarRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn
            .execute(
                "INSERT INTO projects (uuid, key, name, color) VALUES (?1, ?2, ?3, ?4);",
                params![
                    project.id.to_string(),
                    project.key.as_str(),
                    project.name.as_str(),
                    project.color.as_str(),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::Conflict(format!("project key `{}` already in use", project.key))
                } else {
                    err.into()
                }
            })?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE projects SET key = ?1, name = ?2, color = ?3 WHERE uuid = ?4;",
                params![
                    project.key.as_str(),
                    project.name.as_str(),
                    project.color.as_str(),
                    project.id.to_string(),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::Conflict(format!("project key `{}` already in use", project.key))
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn find_project_by_key(&self, key: &str) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE key = ?1;"))?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY name ASC, key ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let project = Project {
        id: parse_uuid(&uuid_text, "projects.uuid")?,
        key: row.get("key")?,
        name: row.get("name")?,
        color: row.get("color")?,
    };
    project.validate()?;
    Ok(project)
}
