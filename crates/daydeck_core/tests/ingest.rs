use chrono::{DateTime, NaiveDate, Utc};
use daydeck_core::db::open_db_in_memory;
use daydeck_core::repo::{
    EventRepository, ProjectRepository, RecurringEventRepository, TaskRepository,
};
use daydeck_core::{
    Category, CoreConfig, CreatedRecord, DaySet, IngestError, IngestService, Project,
    SqliteCalendarRepository, TaskDue,
};
use rusqlite::Connection;

// Wednesday, 11:00 in New York.
const NOW: &str = "2026-10-14T15:00:00Z";

fn instant(value: &str) -> DateTime<Utc> {
    value.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service(conn: &Connection) -> IngestService<SqliteCalendarRepository<'_>> {
    IngestService::new(SqliteCalendarRepository::new(conn), CoreConfig::default())
}

#[test]
fn weekday_standup_becomes_recurring_event() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("work: standup 9-930am mon-fri", instant(NOW))
        .unwrap();

    assert_eq!(report.created.len(), 1);
    assert!(report.rejected.is_empty());
    let CreatedRecord::Recurring { id, title } = &report.created[0] else {
        panic!("expected recurring record, got {:?}", report.created[0]);
    };
    assert_eq!(title, "standup");

    let stored = SqliteCalendarRepository::new(&conn)
        .get_recurring_event(*id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.days, DaySet::WEEKDAYS);
    assert_eq!((stored.start_min, stored.end_min), (540, 570));
    assert_eq!(stored.category, Category::Work);
    assert_eq!(stored.start_date, date(2026, 10, 15));
}

#[test]
fn todo_with_by_weekday_gets_due_date() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("todo: finish report by Friday", instant(NOW))
        .unwrap();

    let CreatedRecord::Task { id, text } = &report.created[0] else {
        panic!("expected task record");
    };
    assert_eq!(text, "finish report");

    let task = SqliteCalendarRepository::new(&conn)
        .get_task(*id)
        .unwrap()
        .unwrap();
    assert_eq!(task.category, Category::Personal);
    assert_eq!(task.due, Some(TaskDue::Date(date(2026, 10, 16))));
}

#[test]
fn todo_with_before_weekday_is_due_at_five_pm() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("TODO sprint review before thu", instant(NOW))
        .unwrap();

    let task = SqliteCalendarRepository::new(&conn)
        .get_task(report.created[0].id())
        .unwrap()
        .unwrap();
    assert_eq!(task.text, "sprint review");
    // The keyword scan runs on the raw fragment, not on the mode.
    assert_eq!(task.category, Category::Work);
    assert_eq!(
        task.due,
        Some(TaskDue::At(instant("2026-10-15T21:00:00Z")))
    );
}

#[test]
fn project_key_links_event_on_next_business_day() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);
    let project = Project::new("FE", "Frontend", "blue");
    repo.create_project(&project).unwrap();

    let report = service(&conn)
        .ingest_at("FE: demo 2-3pm", instant(NOW))
        .unwrap();
    let CreatedRecord::Event { id, title } = &report.created[0] else {
        panic!("expected event record");
    };
    assert_eq!(title, "demo");

    let event = repo.get_event(*id).unwrap().unwrap();
    assert_eq!(event.project_id, Some(project.id));
    assert_eq!(event.category, Category::Work);
    assert_eq!(event.start_at, instant("2026-10-15T18:00:00Z"));
    assert_eq!(event.end_at, instant("2026-10-15T19:00:00Z"));
}

#[test]
fn unknown_project_key_is_stripped_without_link() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("ZZ: lunch 12-1pm", instant(NOW))
        .unwrap();
    let CreatedRecord::Event { id, title } = &report.created[0] else {
        panic!("expected event record");
    };
    assert_eq!(title, "lunch");

    let event = SqliteCalendarRepository::new(&conn)
        .get_event(*id)
        .unwrap()
        .unwrap();
    assert_eq!(event.project_id, None);
    assert_eq!(event.category, Category::Personal);
    assert_eq!(event.start_at, instant("2026-10-15T16:00:00Z"));
}

#[test]
fn friday_work_event_anchors_on_monday() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("work: sync 10-11am", instant("2026-10-16T15:00:00Z"))
        .unwrap();

    let event = SqliteCalendarRepository::new(&conn)
        .get_event(report.created[0].id())
        .unwrap()
        .unwrap();
    assert_eq!(event.start_at, instant("2026-10-19T14:00:00Z"));
    assert_eq!(event.end_at, instant("2026-10-19T15:00:00Z"));
}

#[test]
fn unparseable_fragment_becomes_task_due_tomorrow() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("just a note", instant(NOW))
        .unwrap();

    let CreatedRecord::Task { id, text } = &report.created[0] else {
        panic!("expected task record");
    };
    assert_eq!(text, "just a note");
    let task = SqliteCalendarRepository::new(&conn)
        .get_task(*id)
        .unwrap()
        .unwrap();
    assert_eq!(task.due, Some(TaskDue::Date(date(2026, 10, 15))));
    assert_eq!(task.category, Category::Personal);
}

#[test]
fn inverted_range_is_rejected_without_stopping_the_message() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("party 9pm-9am; call mom", instant(NOW))
        .unwrap();

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].index, 0);
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].kind(), "task");
}

#[test]
fn blank_message_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn).ingest_at(" ;\n ; ", instant(NOW)).unwrap_err();
    assert!(matches!(err, IngestError::EmptyMessage));
}

#[test]
fn report_echoes_timezone() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn).ingest_at("call mom", instant(NOW)).unwrap();
    assert_eq!(report.tz, "America/New_York");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["created"][0]["type"], "task");
    assert_eq!(json["tz"], "America/New_York");
}

#[test]
fn storage_failure_keeps_earlier_records() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE events;").unwrap();

    let err = service(&conn)
        .ingest_at("call mom; dentist 3-4pm; water plants", instant(NOW))
        .unwrap_err();
    let IngestError::Storage {
        created,
        fragment_index,
        ..
    } = err
    else {
        panic!("expected storage failure");
    };
    assert_eq!(fragment_index, 1);
    assert_eq!(created.len(), 1);

    let kept = SqliteCalendarRepository::new(&conn)
        .get_task(created[0].id())
        .unwrap();
    assert!(kept.is_some());
}

#[test]
fn bare_backwards_range_falls_back_to_task() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn).ingest_at("shift 9-5", instant(NOW)).unwrap();

    assert!(report.rejected.is_empty());
    let CreatedRecord::Task { id, text } = &report.created[0] else {
        panic!("expected task record, got {:?}", report.created[0]);
    };
    assert_eq!(text, "shift 9-5");
    let task = SqliteCalendarRepository::new(&conn)
        .get_task(*id)
        .unwrap()
        .unwrap();
    assert_eq!(task.due, Some(TaskDue::Date(date(2026, 10, 15))));
}

#[test]
fn recurrence_word_stays_in_text_without_time_range() {
    let conn = open_db_in_memory().unwrap();
    let report = service(&conn)
        .ingest_at("water plants daily", instant(NOW))
        .unwrap();

    assert_eq!(report.created.len(), 1);
    let CreatedRecord::Task { id, text } = &report.created[0] else {
        panic!("expected task record, got {:?}", report.created[0]);
    };
    assert_eq!(text, "water plants daily");
    let task = SqliteCalendarRepository::new(&conn)
        .get_task(*id)
        .unwrap()
        .unwrap();
    assert_eq!(task.text, "water plants daily");
}
