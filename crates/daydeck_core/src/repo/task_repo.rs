//! Task and sub-task repository contract and SQLite implementation.
//!
//! # Invariants
//! - `due_at` and `due_date` columns are never both set (schema CHECK).
//! - Sub-tasks are returned in ascending `sort_order`.
//! - A new sub-task is appended after the current maximum order.

use super::{
    bool_from_db, bool_to_int, date_from_db, date_to_db, instant_from_db, instant_to_db,
    parse_optional_uuid, parse_uuid, RepoError, RepoResult, SqliteCalendarRepository,
};
use crate::model::task::{Priority, SubTask, SubTaskId, Task, TaskDue, TaskId};
use crate::model::{require_text, Category};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    text,
    category,
    project_uuid,
    priority,
    due_at,
    due_date,
    done,
    completed_at,
    created_at
FROM tasks";

/// Repository interface for tasks and their sub-tasks.
pub trait TaskRepository {
    /// Inserts the task together with any sub-tasks it carries.
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Updates task columns; sub-tasks are managed separately.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Tasks with `due_at ∈ [from, to)` or `due_date ∈ [from_day, to_day)`.
    fn list_tasks_due_in(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        from_day: NaiveDate,
        to_day: NaiveDate,
    ) -> RepoResult<Vec<Task>>;
    /// Open tasks plus tasks completed at or after `completed_since`,
    /// open first, newest first.
    fn list_board_tasks(&self, completed_since: DateTime<Utc>) -> RepoResult<Vec<Task>>;
    fn add_subtask(&self, task_id: TaskId, text: &str) -> RepoResult<SubTask>;
    fn get_subtask(&self, id: SubTaskId) -> RepoResult<Option<SubTask>>;
    fn update_subtask(&self, subtask: &SubTask) -> RepoResult<()>;
    fn delete_subtask(&self, id: SubTaskId) -> RepoResult<()>;
}

impl TaskRepository for SqliteCalendarRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let due = task.due;
        tx.execute(
            "INSERT INTO tasks (
                uuid,
                text,
                category,
                project_uuid,
                priority,
                due_at,
                due_date,
                done,
                completed_at,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                task.id.to_string(),
                task.text.as_str(),
                task.category.as_str(),
                task.project_id.map(|id| id.to_string()),
                task.priority.map(Priority::as_str),
                due.and_then(TaskDue::due_at).map(instant_to_db),
                due.and_then(TaskDue::due_date).map(date_to_db),
                bool_to_int(task.done),
                task.completed_at.map(instant_to_db),
                instant_to_db(task.created_at),
            ],
        )?;
        for subtask in &task.subtasks {
            insert_subtask(&tx, subtask)?;
        }
        tx.commit()?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let due = task.due;
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                text = ?1,
                category = ?2,
                project_uuid = ?3,
                priority = ?4,
                due_at = ?5,
                due_date = ?6,
                done = ?7,
                completed_at = ?8
             WHERE uuid = ?9;",
            params![
                task.text.as_str(),
                task.category.as_str(),
                task.project_id.map(|id| id.to_string()),
                task.priority.map(Priority::as_str),
                due.and_then(TaskDue::due_at).map(instant_to_db),
                due.and_then(TaskDue::due_date).map(date_to_db),
                bool_to_int(task.done),
                task.completed_at.map(instant_to_db),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_tasks_due_in(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        from_day: NaiveDate,
        to_day: NaiveDate,
    ) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE (due_at >= ?1 AND due_at < ?2)
                OR (due_date >= ?3 AND due_date < ?4)
             ORDER BY due_at ASC, due_date ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![
            instant_to_db(from),
            instant_to_db(to),
            date_to_db(from_day),
            date_to_db(to_day),
        ])?;
        collect_tasks(self.conn, &mut rows)
    }

    fn list_board_tasks(&self, completed_since: DateTime<Utc>) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE done = 0
                OR (done = 1 AND completed_at >= ?1)
             ORDER BY done ASC, created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([instant_to_db(completed_since)])?;
        collect_tasks(self.conn, &mut rows)
    }

    fn add_subtask(&self, task_id: TaskId, text: &str) -> RepoResult<SubTask> {
        require_text("subtask text", text)?;
        let parent_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE uuid = ?1);",
            [task_id.to_string()],
            |row| row.get(0),
        )?;
        if !parent_exists {
            return Err(RepoError::NotFound(task_id));
        }

        let max_order: Option<i64> = self.conn.query_row(
            "SELECT MAX(sort_order) FROM subtasks WHERE task_uuid = ?1;",
            [task_id.to_string()],
            |row| row.get(0),
        )?;
        let subtask = SubTask {
            id: Uuid::new_v4(),
            task_id,
            text: text.to_string(),
            done: false,
            order: max_order.unwrap_or(0) + 1,
        };
        insert_subtask(self.conn, &subtask)?;
        Ok(subtask)
    }

    fn get_subtask(&self, id: SubTaskId) -> RepoResult<Option<SubTask>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, task_uuid, text, done, sort_order FROM subtasks WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subtask_row(row)?));
        }
        Ok(None)
    }

    fn update_subtask(&self, subtask: &SubTask) -> RepoResult<()> {
        require_text("subtask text", &subtask.text)?;
        let changed = self.conn.execute(
            "UPDATE subtasks SET text = ?1, done = ?2, sort_order = ?3 WHERE uuid = ?4;",
            params![
                subtask.text.as_str(),
                bool_to_int(subtask.done),
                subtask.order,
                subtask.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(subtask.id));
        }
        Ok(())
    }

    fn delete_subtask(&self, id: SubTaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subtasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn insert_subtask(conn: &Connection, subtask: &SubTask) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO subtasks (uuid, task_uuid, text, done, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            subtask.id.to_string(),
            subtask.task_id.to_string(),
            subtask.text.as_str(),
            bool_to_int(subtask.done),
            subtask.order,
        ],
    )?;
    Ok(())
}

fn collect_tasks(conn: &Connection, rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Task>> {
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(conn, row)?);
    }
    Ok(tasks)
}

fn parse_task_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "tasks.uuid")?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid category `{category_text}` in tasks.category"))
    })?;

    let priority = match row.get::<_, Option<String>>("priority")? {
        Some(value) => Some(Priority::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid priority `{value}` in tasks.priority"))
        })?),
        None => None,
    };

    let due_at: Option<i64> = row.get("due_at")?;
    let due_date: Option<String> = row.get("due_date")?;
    let due = match (due_at, due_date) {
        (Some(at), None) => Some(TaskDue::At(instant_from_db(at, "tasks.due_at")?)),
        (None, Some(date)) => Some(TaskDue::Date(date_from_db(&date, "tasks.due_date")?)),
        (None, None) => None,
        (Some(_), Some(_)) => {
            return Err(RepoError::InvalidData(format!(
                "task {id} has both due_at and due_date"
            )));
        }
    };

    let completed_at = row
        .get::<_, Option<i64>>("completed_at")?
        .map(|value| instant_from_db(value, "tasks.completed_at"))
        .transpose()?;

    let task = Task {
        id,
        text: row.get("text")?,
        category,
        project_id: parse_optional_uuid(row.get("project_uuid")?, "tasks.project_uuid")?,
        priority,
        due,
        done: bool_from_db(row.get("done")?, "tasks.done")?,
        completed_at,
        created_at: instant_from_db(row.get("created_at")?, "tasks.created_at")?,
        subtasks: load_subtasks(conn, &uuid_text)?,
    };
    task.validate()?;
    Ok(task)
}

fn load_subtasks(conn: &Connection, task_uuid: &str) -> RepoResult<Vec<SubTask>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, task_uuid, text, done, sort_order
         FROM subtasks
         WHERE task_uuid = ?1
         ORDER BY sort_order ASC, uuid ASC;",
    )?;
    let mut rows = stmt.query([task_uuid])?;
    let mut subtasks = Vec::new();
    while let Some(row) = rows.next()? {
        subtasks.push(parse_subtask_row(row)?);
    }
    Ok(subtasks)
}

fn parse_subtask_row(row: &Row<'_>) -> RepoResult<SubTask> {
    let uuid_text: String = row.get("uuid")?;
    let task_text: String = row.get("task_uuid")?;
    Ok(SubTask {
        id: parse_uuid(&uuid_text, "subtasks.uuid")?,
        task_id: parse_uuid(&task_text, "subtasks.task_uuid")?,
        text: row.get("text")?,
        done: bool_from_db(row.get("done")?, "subtasks.done")?,
        order: row.get("sort_order")?,
    })
}
