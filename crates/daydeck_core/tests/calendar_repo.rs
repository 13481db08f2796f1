use chrono::{DateTime, NaiveDate, Utc};
use daydeck_core::db::open_db_in_memory;
use daydeck_core::repo::{
    EventRepository, ProjectRepository, RecurringEventRepository, TaskRepository,
};
use daydeck_core::{
    Category, DaySet, Event, ModelValidationError, Project, RecurringEvent, RepoError,
    SqliteCalendarRepository, Task, TaskDue,
};
use uuid::Uuid;

fn instant(value: &str) -> DateTime<Utc> {
    value.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn project_roundtrip_and_key_lookup() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    let project = Project::new("fe", "Frontend", "blue");
    repo.create_project(&project).unwrap();

    let loaded = repo.find_project_by_key("FE").unwrap().unwrap();
    assert_eq!(loaded, project);
    assert!(repo.find_project_by_key("fe").unwrap().is_none());
    assert_eq!(repo.get_project(project.id).unwrap(), Some(project));
}

#[test]
fn duplicate_project_key_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    repo.create_project(&Project::new("FE", "Frontend", "blue"))
        .unwrap();
    let err = repo
        .create_project(&Project::new("FE", "Other", "red"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn projects_list_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    for (key, name) in [("ZED", "Zeta"), ("AB", "Alpha"), ("MID", "Mu")] {
        repo.create_project(&Project::new(key, name, "gray")).unwrap();
    }
    let names: Vec<_> = repo
        .list_projects()
        .unwrap()
        .into_iter()
        .map(|project| project.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Mu", "Zeta"]);
}

#[test]
fn invalid_records_are_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    let event = Event::new(
        "backwards",
        Category::Personal,
        instant("2026-10-15T10:00:00Z"),
        instant("2026-10-15T09:00:00Z"),
    );
    assert!(matches!(
        repo.create_event(&event),
        Err(RepoError::Validation(ModelValidationError::EndNotAfterStart))
    ));

    let recurring = RecurringEvent::new(
        "late",
        Category::Personal,
        date(2026, 10, 15),
        1260,
        540,
        DaySet::EVERY_DAY,
    );
    assert!(matches!(
        repo.create_recurring_event(&recurring),
        Err(RepoError::Validation(
            ModelValidationError::InvertedMinuteRange { .. }
        ))
    ));

    let task = Task::new("   ", Category::Personal, instant("2026-10-14T15:00:00Z"));
    assert!(matches!(
        repo.create_task(&task),
        Err(RepoError::Validation(ModelValidationError::EmptyText(_)))
    ));
}

#[test]
fn events_in_range_use_half_open_intersection() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    let before = Event::new(
        "before",
        Category::Personal,
        instant("2026-10-14T08:00:00Z"),
        instant("2026-10-14T09:00:00Z"),
    );
    let straddle = Event::new(
        "straddle",
        Category::Work,
        instant("2026-10-14T08:30:00Z"),
        instant("2026-10-14T09:30:00Z"),
    );
    let inside = Event::new(
        "inside",
        Category::Work,
        instant("2026-10-14T10:00:00Z"),
        instant("2026-10-14T11:00:00Z"),
    );
    let at_end = Event::new(
        "at_end",
        Category::Personal,
        instant("2026-10-14T12:00:00Z"),
        instant("2026-10-14T13:00:00Z"),
    );
    for event in [&before, &straddle, &inside, &at_end] {
        repo.create_event(event).unwrap();
    }

    let titles: Vec<_> = repo
        .list_events_in_range(
            instant("2026-10-14T09:00:00Z"),
            instant("2026-10-14T12:00:00Z"),
        )
        .unwrap()
        .into_iter()
        .map(|event| event.title)
        .collect();
    assert_eq!(titles, vec!["straddle", "inside"]);
}

#[test]
fn recurring_event_roundtrip_and_cascade() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    let event = RecurringEvent::new(
        "standup",
        Category::Work,
        date(2026, 10, 15),
        540,
        570,
        DaySet::WEEKDAYS,
    );
    repo.create_recurring_event(&event).unwrap();
    assert_eq!(repo.get_recurring_event(event.id).unwrap(), Some(event.clone()));

    assert!(repo
        .list_recurring_starting_by(date(2026, 10, 14))
        .unwrap()
        .is_empty());
    assert_eq!(
        repo.list_recurring_starting_by(date(2026, 10, 15))
            .unwrap()
            .len(),
        1
    );

    repo.delete_recurring_event(event.id).unwrap();
    let day_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM recurring_event_days;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(day_rows, 0);
    assert!(matches!(
        repo.delete_recurring_event(event.id),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn task_due_markers_roundtrip_and_range_query() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);
    let now = instant("2026-10-14T15:00:00Z");

    let mut timed = Task::new("timed", Category::Work, now);
    timed.due = Some(TaskDue::At(instant("2026-10-15T21:00:00Z")));
    let mut all_day = Task::new("all day", Category::Personal, now);
    all_day.due = Some(TaskDue::Date(date(2026, 10, 16)));
    let mut later = Task::new("later", Category::Personal, now);
    later.due = Some(TaskDue::Date(date(2026, 10, 17)));
    let undated = Task::new("undated", Category::Personal, now);
    for task in [&timed, &all_day, &later, &undated] {
        repo.create_task(task).unwrap();
    }

    assert_eq!(repo.get_task(timed.id).unwrap(), Some(timed.clone()));
    assert_eq!(repo.get_task(all_day.id).unwrap(), Some(all_day.clone()));

    let texts: Vec<_> = repo
        .list_tasks_due_in(
            instant("2026-10-15T04:00:00Z"),
            instant("2026-10-17T04:00:00Z"),
            date(2026, 10, 15),
            date(2026, 10, 17),
        )
        .unwrap()
        .into_iter()
        .map(|task| task.text)
        .collect();
    assert_eq!(texts.len(), 2);
    assert!(texts.contains(&"timed".to_string()));
    assert!(texts.contains(&"all day".to_string()));
}

#[test]
fn subtasks_are_ordered_and_cascade_with_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    let task = Task::new("release", Category::Work, instant("2026-10-14T15:00:00Z"));
    repo.create_task(&task).unwrap();
    let first = repo.add_subtask(task.id, "tag build").unwrap();
    let second = repo.add_subtask(task.id, "write notes").unwrap();
    assert_eq!((first.order, second.order), (1, 2));

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    let texts: Vec<_> = loaded.subtasks.iter().map(|sub| sub.text.as_str()).collect();
    assert_eq!(texts, vec!["tag build", "write notes"]);

    assert!(matches!(
        repo.add_subtask(Uuid::new_v4(), "orphan"),
        Err(RepoError::NotFound(_))
    ));

    repo.delete_task(task.id).unwrap();
    assert!(repo.get_subtask(first.id).unwrap().is_none());
}

#[test]
fn deleting_project_detaches_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    let project = Project::new("FE", "Frontend", "blue");
    repo.create_project(&project).unwrap();
    let mut event = Event::new(
        "demo",
        Category::Work,
        instant("2026-10-15T18:00:00Z"),
        instant("2026-10-15T19:00:00Z"),
    );
    event.project_id = Some(project.id);
    repo.create_event(&event).unwrap();

    repo.delete_project(project.id).unwrap();
    let loaded = repo.get_event(event.id).unwrap().unwrap();
    assert_eq!(loaded.project_id, None);
}

#[test]
fn corrupt_rows_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);

    conn.execute(
        "INSERT INTO events (uuid, title, category, start_at, end_at)
         VALUES ('not-a-uuid', 'broken', 'WORK', 0, 60000);",
        [],
    )
    .unwrap();
    let err = repo
        .list_events_in_range(instant("1970-01-01T00:00:00Z"), instant("1970-01-02T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
