//! One-off event repository contract and SQLite implementation.

use super::{
    instant_from_db, instant_to_db, parse_optional_uuid, parse_uuid, RepoError, RepoResult,
    SqliteCalendarRepository,
};
use crate::model::event::{Event, EventId};
use crate::model::Category;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    category,
    project_uuid,
    start_at,
    end_at
FROM events";

/// Repository interface for one-off events.
pub trait EventRepository {
    fn create_event(&self, event: &Event) -> RepoResult<EventId>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
    /// Events whose interval intersects `[from, to)`, ordered by start.
    fn list_events_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Event>>;
}

impl EventRepository for SqliteCalendarRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO events (
                uuid,
                title,
                category,
                project_uuid,
                start_at,
                end_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                event.category.as_str(),
                event.project_id.map(|id| id.to_string()),
                instant_to_db(event.start_at),
                instant_to_db(event.end_at),
            ],
        )?;

        Ok(event.id)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_events_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE start_at < ?1
               AND end_at > ?2
             ORDER BY start_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![instant_to_db(to), instant_to_db(from)])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid category `{category_text}` in events.category"))
    })?;

    let event = Event {
        id: parse_uuid(&uuid_text, "events.uuid")?,
        title: row.get("title")?,
        category,
        project_id: parse_optional_uuid(row.get("project_uuid")?, "events.project_uuid")?,
        start_at: instant_from_db(row.get("start_at")?, "events.start_at")?,
        end_at: instant_from_db(row.get("end_at")?, "events.end_at")?,
    };
    event.validate()?;
    Ok(event)
}
