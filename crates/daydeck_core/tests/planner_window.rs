use chrono::{DateTime, Duration, NaiveDate, Utc};
use daydeck_core::db::open_db_in_memory;
use daydeck_core::repo::{
    EventRepository, ProjectRepository, RecurringEventRepository, TaskRepository,
};
use daydeck_core::{
    layout_day, Category, CoreConfig, DaySet, EntryKind, Event, PlannerError, PlannerService,
    Project, RecurringEvent, SlotGrid, SqliteCalendarRepository, Task, TaskDue, TimeWindow,
};
use rusqlite::Connection;

const NOW: &str = "2026-10-14T15:00:00Z";

fn instant(value: &str) -> DateTime<Utc> {
    value.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn planner(conn: &Connection) -> PlannerService<SqliteCalendarRepository<'_>> {
    PlannerService::new(SqliteCalendarRepository::new(conn), CoreConfig::default())
}

struct Seeded {
    project: Project,
    pairing: RecurringEvent,
}

/// Thursday 2026-10-15 in New York: one all-day task plus three entries
/// starting at 09:00 local (13:00Z).
fn seed(conn: &Connection) -> Seeded {
    let repo = SqliteCalendarRepository::new(conn);
    let now = instant(NOW);

    let project = Project::new("FE", "Frontend", "blue");
    repo.create_project(&project).unwrap();

    let mut chores = Task::new("chores", Category::Personal, now);
    chores.due = Some(TaskDue::Date(date(2026, 10, 15)));
    repo.create_task(&chores).unwrap();

    let mut review = Task::new("review", Category::Work, now);
    review.due = Some(TaskDue::At(instant("2026-10-15T13:00:00Z")));
    review.project_id = Some(project.id);
    repo.create_task(&review).unwrap();

    let mut design = Event::new(
        "design sync",
        Category::Work,
        instant("2026-10-15T13:00:00Z"),
        instant("2026-10-15T14:00:00Z"),
    );
    design.project_id = Some(project.id);
    repo.create_event(&design).unwrap();

    let pairing = RecurringEvent::new(
        "pairing",
        Category::Work,
        date(2026, 10, 1),
        540,
        600,
        DaySet::EVERY_DAY,
    );
    repo.create_recurring_event(&pairing).unwrap();

    Seeded { project, pairing }
}

#[test]
fn day_window_is_sorted_with_stable_ties() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let window = TimeWindow::local_day(&chrono_tz::America::New_York, date(2026, 10, 15)).unwrap();

    let entries = planner(&conn)
        .window_entries_at(&window, instant(NOW))
        .unwrap();
    let titles: Vec<_> = entries.iter().map(|entry| entry.title.as_str()).collect();
    assert_eq!(titles, vec!["chores", "pairing", "design sync", "review"]);

    let chores = &entries[0];
    assert_eq!(chores.kind, EntryKind::Task);
    assert_eq!(chores.all_day, Some(true));
    assert_eq!(chores.start_at, instant("2026-10-15T04:00:00Z"));
    assert_eq!(chores.end_at, instant("2026-10-16T04:00:00Z"));

    let review = &entries[3];
    assert_eq!(review.all_day, Some(false));
    assert_eq!(review.done, Some(false));
    assert_eq!(review.end_at, instant("2026-10-15T13:30:00Z"));
}

#[test]
fn recurring_occurrence_ids_carry_start_instant() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let window = TimeWindow::local_day(&chrono_tz::America::New_York, date(2026, 10, 15)).unwrap();

    let entries = planner(&conn)
        .window_entries_at(&window, instant(NOW))
        .unwrap();
    let pairing = entries
        .iter()
        .find(|entry| entry.title == "pairing")
        .unwrap();
    assert_eq!(
        pairing.id,
        format!("{}:2026-10-15T13:00:00.000Z", seeded.pairing.id)
    );
    assert_eq!(pairing.kind, EntryKind::Event);
    assert_eq!(pairing.all_day, None);
}

#[test]
fn project_display_fields_are_joined() {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let window = TimeWindow::local_day(&chrono_tz::America::New_York, date(2026, 10, 15)).unwrap();

    let entries = planner(&conn)
        .window_entries_at(&window, instant(NOW))
        .unwrap();
    for entry in &entries {
        let linked = entry.title == "design sync" || entry.title == "review";
        assert_eq!(entry.project_key.is_some(), linked, "{}", entry.title);
    }
    let design = entries
        .iter()
        .find(|entry| entry.title == "design sync")
        .unwrap();
    assert_eq!(design.project_key.as_deref(), Some(seeded.project.key.as_str()));
    assert_eq!(design.project_label.as_deref(), Some("Frontend"));
    assert_eq!(design.project_color.as_deref(), Some("blue"));
}

#[test]
fn empty_or_inverted_window_is_rejected() {
    let at = instant(NOW);
    assert!(matches!(
        TimeWindow::new(at, at),
        Err(PlannerError::InvalidWindow { .. })
    ));
    assert!(matches!(
        TimeWindow::new(at, at - Duration::hours(1)),
        Err(PlannerError::InvalidWindow { .. })
    ));
}

#[test]
fn every_entry_intersects_its_window() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = planner(&conn);

    let base = instant("2026-10-14T00:00:00Z");
    for start_hour in (0..72).step_by(5) {
        for length_hours in [1, 3, 7, 24] {
            let from = base + Duration::hours(start_hour);
            let to = from + Duration::hours(length_hours);
            let window = TimeWindow::new(from, to).unwrap();
            for entry in service.window_entries_at(&window, instant(NOW)).unwrap() {
                assert!(
                    entry.start_at < to && entry.end_at > from,
                    "{} outside [{from}, {to})",
                    entry.title
                );
            }
        }
    }
}

#[test]
fn recurring_event_before_start_date_is_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCalendarRepository::new(&conn);
    let later = RecurringEvent::new(
        "gym",
        Category::Personal,
        date(2026, 10, 20),
        1080,
        1140,
        DaySet::EVERY_DAY,
    );
    repo.create_recurring_event(&later).unwrap();

    let window = TimeWindow::new(
        instant("2026-10-14T04:00:00Z"),
        instant("2026-10-21T04:00:00Z"),
    )
    .unwrap();
    let entries = planner(&conn)
        .window_entries_at(&window, instant(NOW))
        .unwrap();
    let starts: Vec<_> = entries.iter().map(|entry| entry.start_at).collect();
    assert_eq!(starts, vec![instant("2026-10-20T22:00:00Z")]);
}

#[test]
fn day_entries_feed_layout_columns() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let tz = chrono_tz::America::New_York;
    let day = date(2026, 10, 15);

    let entries = planner(&conn).day_entries(day).unwrap();
    assert_eq!(entries.len(), 4);

    let positioned = layout_day(&entries, day, &tz, &SlotGrid::default());
    assert_eq!(positioned.len(), 3);
    let mut cols: Vec<_> = positioned.iter().map(|entry| entry.col).collect();
    cols.sort_unstable();
    assert_eq!(cols, vec![0, 1, 2]);
    assert!(positioned.iter().all(|entry| entry.cols == 3));
    assert!(positioned.iter().all(|entry| entry.start_slot == 6));
}
