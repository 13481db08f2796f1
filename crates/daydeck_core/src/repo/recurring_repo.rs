//! Recurring event repository contract and SQLite implementation.
//!
//! # Invariants
//! - A recurring event and its weekday rows are written in one transaction.
//! - Weekday rows are deleted with their parent (`ON DELETE CASCADE`).

use super::{
    date_from_db, date_to_db, parse_optional_uuid, parse_uuid, RepoError, RepoResult,
    SqliteCalendarRepository,
};
use crate::model::event::{DaySet, RecurringEvent, RecurringEventId};
use crate::model::Category;
use chrono::NaiveDate;
use rusqlite::{params, Row};

const RECURRING_SELECT_SQL: &str = "SELECT
    r.uuid AS uuid,
    r.title AS title,
    r.category AS category,
    r.project_uuid AS project_uuid,
    r.start_date AS start_date,
    r.start_min AS start_min,
    r.end_min AS end_min,
    (
        SELECT group_concat(d.day, ',')
        FROM recurring_event_days d
        WHERE d.recurring_uuid = r.uuid
    ) AS days
FROM recurring_events r";

/// Repository interface for recurring event definitions.
pub trait RecurringEventRepository {
    fn create_recurring_event(&self, event: &RecurringEvent) -> RepoResult<RecurringEventId>;
    fn get_recurring_event(&self, id: RecurringEventId) -> RepoResult<Option<RecurringEvent>>;
    fn delete_recurring_event(&self, id: RecurringEventId) -> RepoResult<()>;
    /// Definitions whose first day is on or before `last_day`.
    fn list_recurring_starting_by(&self, last_day: NaiveDate) -> RepoResult<Vec<RecurringEvent>>;
}

impl RecurringEventRepository for SqliteCalendarRepository<'_> {
    fn create_recurring_event(&self, event: &RecurringEvent) -> RepoResult<RecurringEventId> {
        event.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO recurring_events (
                uuid,
                title,
                category,
                project_uuid,
                start_date,
                start_min,
                end_min
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                event.category.as_str(),
                event.project_id.map(|id| id.to_string()),
                date_to_db(event.start_date),
                event.start_min,
                event.end_min,
            ],
        )?;
        for day in event.days.iter() {
            tx.execute(
                "INSERT INTO recurring_event_days (recurring_uuid, day) VALUES (?1, ?2);",
                params![event.id.to_string(), day],
            )?;
        }
        tx.commit()?;

        Ok(event.id)
    }

    fn get_recurring_event(&self, id: RecurringEventId) -> RepoResult<Option<RecurringEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECURRING_SELECT_SQL} WHERE r.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_recurring_row(row)?));
        }
        Ok(None)
    }

    fn delete_recurring_event(&self, id: RecurringEventId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM recurring_events WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_recurring_starting_by(&self, last_day: NaiveDate) -> RepoResult<Vec<RecurringEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECURRING_SELECT_SQL}
             WHERE r.start_date <= ?1
             ORDER BY r.start_date ASC, r.uuid ASC;"
        ))?;
        let mut rows = stmt.query([date_to_db(last_day)])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_recurring_row(row)?);
        }
        Ok(events)
    }
}

fn parse_recurring_row(row: &Row<'_>) -> RepoResult<RecurringEvent> {
    let uuid_text: String = row.get("uuid")?;
    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in recurring_events.category"
        ))
    })?;
    let start_date_text: String = row.get("start_date")?;
    let days_text: Option<String> = row.get("days")?;

    let event = RecurringEvent {
        id: parse_uuid(&uuid_text, "recurring_events.uuid")?,
        title: row.get("title")?,
        category,
        project_id: parse_optional_uuid(
            row.get("project_uuid")?,
            "recurring_events.project_uuid",
        )?,
        start_date: date_from_db(&start_date_text, "recurring_events.start_date")?,
        start_min: row.get("start_min")?,
        end_min: row.get("end_min")?,
        days: parse_days(days_text.as_deref().unwrap_or_default())?,
    };
    event.validate()?;
    Ok(event)
}

fn parse_days(value: &str) -> RepoResult<DaySet> {
    let mut days = Vec::new();
    for part in value.split(',').filter(|part| !part.is_empty()) {
        let day = part.trim().parse::<u8>().map_err(|_| {
            RepoError::InvalidData(format!("invalid weekday `{part}` in recurring_event_days.day"))
        })?;
        days.push(day);
    }
    Ok(DaySet::from_days(&days)?)
}
