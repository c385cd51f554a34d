use crate::app::App;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::grid::SlotGrid;
use crate::model::{format_slot_range, format_time_range, slot_index, NewTask, TaskId};
use crate::storage::{SqliteStore, TaskStore};
use crate::ui;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write as _;
use std::path::Path;

pub fn tui(config: &Config, db_path: &Path) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let mut app = App::new(store, SystemClock, config);
    ui::run(&mut app, config.tick_interval())
}

pub fn add(
    config: &Config,
    db_path: &Path,
    title: String,
    date: Option<String>,
    at: Option<String>,
    duration: Option<String>,
) -> Result<()> {
    let mut store = SqliteStore::open(db_path)?;
    let now = SystemClock.now();
    let task = build_task(
        now,
        &title,
        date.as_deref(),
        at.as_deref(),
        duration.as_deref(),
        config.default_duration,
    )?;
    let id = store
        .save(&task)
        .with_context(|| format!("saving task {:?}", task.title))?;
    println!(
        "Added task {} on {} at {}",
        id,
        task.date,
        format_slot_range(task.slot)
    );
    Ok(())
}

pub fn list(db_path: &Path, date: Option<String>) -> Result<()> {
    let store = SqliteStore::open(db_path)?;
    let date = parse_date(date.as_deref(), SystemClock.now().date())?;
    print!("{}", render_day(&store, date)?);
    Ok(())
}

pub fn done(db_path: &Path, id: TaskId, done: bool) -> Result<()> {
    let mut store = SqliteStore::open(db_path)?;
    let found = store
        .mark_done(id, done)
        .with_context(|| format!("updating task {}", id))?;
    if !found {
        bail!("task {} not found", id);
    }
    println!(
        "Marked task {} as {}",
        id,
        if done { "done" } else { "not done" }
    );
    Ok(())
}

pub fn delete(db_path: &Path, id: TaskId) -> Result<()> {
    let mut store = SqliteStore::open(db_path)?;
    let found = store
        .remove(id)
        .with_context(|| format!("deleting task {}", id))?;
    if !found {
        bail!("task {} not found", id);
    }
    println!("Deleted task {}", id);
    Ok(())
}

fn build_task(
    now: NaiveDateTime,
    title: &str,
    date: Option<&str>,
    at: Option<&str>,
    duration: Option<&str>,
    default_duration: u32,
) -> Result<NewTask> {
    let date = parse_date(date, now.date())?;
    let time = parse_time(at, now.time())?;
    let task = NewTask::parse(
        date,
        slot_index(time),
        title,
        duration.unwrap_or_default(),
        default_duration,
    )?;
    Ok(task)
}

fn render_day<S: TaskStore>(store: &S, date: NaiveDate) -> Result<String> {
    let mut grid = SlotGrid::generate(date);
    grid.populate(store.list_for_date(date)?);

    let mut out = String::new();
    writeln!(out, "{}", grid.date().format("%A, %B %-d, %Y"))?;
    let mut any = false;
    for (_, slot) in grid.iter().filter(|(_, s)| !s.tasks.is_empty()) {
        any = true;
        writeln!(out, "{}", format_time_range(slot.start.time()))?;
        for task in &slot.tasks {
            writeln!(
                out,
                "  [{}] #{} {} ({}m)",
                if task.done { "x" } else { " " },
                task.id,
                task.title,
                task.duration_minutes
            )?;
        }
    }
    if !any {
        writeln!(out, "  (no tasks)")?;
    }
    Ok(out)
}

fn parse_date(input: Option<&str>, fallback: NaiveDate) -> Result<NaiveDate> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| anyhow!("invalid date (use YYYY-MM-DD): {}", raw)),
        None => Ok(fallback),
    }
}

fn parse_time(input: Option<&str>, fallback: NaiveTime) -> Result<NaiveTime> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M")
            .map_err(|_| anyhow!("invalid time (use HH:MM): {}", raw)),
        None => Ok(fallback),
    }
}
