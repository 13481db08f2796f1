use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use daydeck_core::localtime::local_date;
use daydeck_core::{
    all_day_entries, default_log_level, init_logging, layout_day, open_db, CoreConfig,
    IngestError, IngestService, PlannerService, ProjectService, SlotGrid,
    SqliteCalendarRepository, TaskService, TimeWindow,
};
use log::info;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "daydeck", about = "Free-text planner: ingest messages, inspect the timeline")]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// SQLite database file
    #[arg(long, global = true, default_value = "daydeck.sqlite3")]
    db: PathBuf,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rotating log files; stderr when omitted
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// IANA timezone, overrides DAYDECK_TIMEZONE
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Turn a message into tasks and events; reads stdin when no text is given
    Ingest(IngestArgs),
    /// Sorted timeline for a half-open instant window
    Window(WindowArgs),
    /// Day view: all-day entries plus column layout of timed entries
    Day(DayArgs),
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Debug, Args)]
struct IngestArgs {
    #[arg(value_name = "TEXT")]
    text: Vec<String>,
}

#[derive(Debug, Args)]
struct WindowArgs {
    /// RFC 3339 instant, inclusive
    #[arg(long)]
    from: DateTime<Utc>,
    /// RFC 3339 instant, exclusive
    #[arg(long)]
    to: DateTime<Utc>,
}

#[derive(Debug, Args)]
struct DayArgs {
    /// Local date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
enum ProjectCommand {
    /// Create a project referenced as `KEY: ...` in messages
    Add {
        key: String,
        name: String,
        #[arg(long, default_value = "gray")]
        color: String,
    },
    /// List projects by name
    List,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Toggle completion of a task
    Done { id: Uuid },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let level = self
            .global
            .log_level
            .as_deref()
            .unwrap_or_else(|| default_log_level());
        init_logging(level, self.global.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

        let config = match self.global.timezone.as_deref() {
            Some(id) => CoreConfig::from_timezone_id(id)?,
            None => CoreConfig::from_env()?,
        };
        let conn = open_db(&self.global.db)
            .with_context(|| format!("failed to open `{}`", self.global.db.display()))?;
        info!(
            "event=cli_start module=cli status=ok tz={}",
            config.timezone_id()
        );

        match self.command {
            Command::Ingest(args) => {
                let message = if args.text.is_empty() {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("failed to read message from stdin")?;
                    buffer
                } else {
                    args.text.join(" ")
                };
                let service = IngestService::new(SqliteCalendarRepository::new(&conn), config);
                match service.ingest(&message) {
                    Ok(report) => print_json(&report),
                    Err(IngestError::Storage {
                        created,
                        fragment_index,
                        source,
                    }) => {
                        print_json(&json!({ "created": created }))?;
                        Err(anyhow::Error::new(source)
                            .context(format!("ingest stopped at fragment {fragment_index}")))
                    }
                    Err(err) => Err(err.into()),
                }
            }
            Command::Window(args) => {
                let window = TimeWindow::new(args.from, args.to)?;
                let service = PlannerService::new(SqliteCalendarRepository::new(&conn), config);
                let entries = service.window_entries(&window)?;
                print_json(&json!({ "entries": entries }))
            }
            Command::Day(args) => {
                let tz = config.timezone;
                let date = args.date.unwrap_or_else(|| local_date(&tz, Utc::now()));
                let service = PlannerService::new(SqliteCalendarRepository::new(&conn), config);
                let entries = service.day_entries(date)?;
                let grid = SlotGrid::default();
                print_json(&json!({
                    "date": date,
                    "slotCount": grid.slot_count(),
                    "allDay": all_day_entries(&entries, date, &tz),
                    "entries": layout_day(&entries, date, &tz, &grid),
                }))
            }
            Command::Project(ProjectCommand::Add { key, name, color }) => {
                let service = ProjectService::new(SqliteCalendarRepository::new(&conn));
                let project = service.create_project(&key, &name, &color)?;
                print_json(&project)
            }
            Command::Project(ProjectCommand::List) => {
                let service = ProjectService::new(SqliteCalendarRepository::new(&conn));
                print_json(&service.list_projects()?)
            }
            Command::Task(TaskCommand::Done { id }) => {
                let service = TaskService::new(SqliteCalendarRepository::new(&conn));
                let task = service.toggle_task(id, Utc::now())?;
                print_json(&task)
            }
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
