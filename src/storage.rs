use crate::model::{NewTask, Task, TaskId};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Durable task storage used by the planner.
pub trait TaskStore {
    fn save(&mut self, task: &NewTask) -> Result<TaskId, StoreError>;
    fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError>;
    fn set_done(&mut self, id: TaskId, done: bool) -> Result<(), StoreError>;
    fn delete(&mut self, id: TaskId) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        let store = SqliteStore { conn };
        store.init_schema().context("initializing schema")?;
        info!(path = %path.display(), "opened task database");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                date TEXT NOT NULL,
                time_slot INTEGER NOT NULL,
                title TEXT NOT NULL,
                duration INTEGER NOT NULL,
                done BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date);
            "#,
        )?;
        Ok(())
    }

    /// Sets the done flag. Returns `false` when no task has `id`.
    pub fn mark_done(&mut self, id: TaskId, done: bool) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET done = ?1 WHERE id = ?2",
            params![done, id],
        )?;
        debug!(id, done, changed, "updated task done flag");
        Ok(changed > 0)
    }

    /// Deletes a task. Returns `false` when no task has `id`.
    pub fn remove(&mut self, id: TaskId) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        debug!(id, changed, "deleted task");
        Ok(changed > 0)
    }

    #[cfg(test)]
    pub(crate) fn insert_raw_row(
        &mut self,
        date: NaiveDate,
        slot: i64,
        title: &str,
        duration: i64,
        created_at: Option<&str>,
    ) -> Result<TaskId, StoreError> {
        self.conn.execute(
            "INSERT INTO tasks (date, time_slot, title, duration, done, created_at) VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![date.format(DATE_FORMAT).to_string(), slot, title, duration, created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    #[cfg(test)]
    pub(crate) fn insert_raw_slot(
        &mut self,
        date: NaiveDate,
        slot: i64,
        title: &str,
    ) -> Result<TaskId, StoreError> {
        self.conn.execute(
            "INSERT INTO tasks (date, time_slot, title, duration, done) VALUES (?1, ?2, ?3, 30, 0)",
            params![date.format(DATE_FORMAT).to_string(), slot, title],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

impl TaskStore for SqliteStore {
    fn save(&mut self, task: &NewTask) -> Result<TaskId, StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO tasks (date, time_slot, title, duration, done)
            VALUES (?1, ?2, ?3, ?4, 0)
            "#,
            params![
                task.date.format(DATE_FORMAT).to_string(),
                task.slot as i64,
                task.title,
                i64::from(task.duration_minutes),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, slot = task.slot, date = %task.date, "saved task");
        Ok(id)
    }

    fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, time_slot, title, duration, done, created_at
            FROM tasks
            WHERE date = ?1
            ORDER BY time_slot, id
            "#,
        )?;
        let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, slot, title, duration, done, created_at) = row?;
            // Rows from older builds may hold values the model can't represent.
            let Ok(duration_minutes) = u32::try_from(duration) else {
                debug!(id, duration, "skipping task row with invalid duration");
                continue;
            };
            let created_at = match created_at {
                Some(raw) => match NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT) {
                    Ok(at) => at,
                    Err(_) => {
                        debug!(id, created_at = %raw, "skipping task row with invalid timestamp");
                        continue;
                    }
                },
                None => date.and_time(chrono::NaiveTime::MIN),
            };
            tasks.push(Task {
                id,
                date,
                slot,
                title,
                duration_minutes,
                done,
                created_at,
            });
        }
        Ok(tasks)
    }

    fn set_done(&mut self, id: TaskId, done: bool) -> Result<(), StoreError> {
        self.mark_done(id, done).map(|_| ())
    }

    fn delete(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.remove(id).map(|_| ())
    }
}

pub fn default_database_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("slotplan.db"))
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "slotplan").context("locating data directory")
}
