use crate::clock::Clock;
use crate::config::Config;
use crate::form::TaskForm;
use crate::grid::SlotGrid;
use crate::model::{slot_index, NewTask, SLOTS_PER_DAY};
use crate::storage::{StoreError, TaskStore};
use crate::viewport::Viewport;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Browsing,
    Selecting(Selection),
    Creating(TaskForm),
}

/// Task highlight inside the cursor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub task_cursor: usize,
    pub delete: DeleteConfirm,
}

/// Two-press delete confirmation. Any key other than the delete key disarms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirm {
    Idle,
    Pending,
}

impl DeleteConfirm {
    /// Returns true when this press commits the delete.
    fn press(&mut self) -> bool {
        match self {
            DeleteConfirm::Idle => {
                *self = DeleteConfirm::Pending;
                false
            }
            DeleteConfirm::Pending => {
                *self = DeleteConfirm::Idle;
                true
            }
        }
    }

    fn reset(&mut self) {
        *self = DeleteConfirm::Idle;
    }

    pub fn is_pending(&self) -> bool {
        *self == DeleteConfirm::Pending
    }
}

#[derive(Debug, Clone)]
struct Banner {
    message: String,
    at: NaiveDateTime,
}

pub struct App<S, C> {
    store: S,
    clock: C,
    date: NaiveDate,
    now_slot: usize,
    cursor: usize,
    grid: SlotGrid,
    viewport: Viewport,
    mode: Mode,
    banner: Option<Banner>,
    banner_ttl: Duration,
    default_duration: u32,
}

impl<S: TaskStore, C: Clock> App<S, C> {
    pub fn new(store: S, clock: C, config: &Config) -> Self {
        let now = clock.now();
        let now_slot = slot_index(now.time());
        let mut viewport = Viewport::new(config.viewport_height(), SLOTS_PER_DAY);
        viewport.centre_on(now_slot);
        let mut app = App {
            store,
            clock,
            date: now.date(),
            now_slot,
            cursor: now_slot,
            grid: SlotGrid::generate(now.date()),
            viewport,
            mode: Mode::Browsing,
            banner: None,
            banner_ttl: config.banner_duration(),
            default_duration: config.default_duration,
        };
        app.reload_or_banner();
        app
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn now_slot(&self) -> usize {
        self.now_slot
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_today(&self) -> bool {
        self.date == self.clock.now().date()
    }

    /// The error banner, while it is still within its display window.
    pub fn banner(&self) -> Option<&str> {
        let banner = self.banner.as_ref()?;
        if self.clock.now() - banner.at < self.banner_ttl {
            Some(banner.message.as_str())
        } else {
            None
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                self.tick();
                Flow::Continue
            }
            AppEvent::Resize => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        let mode = std::mem::replace(&mut self.mode, Mode::Browsing);
        match mode {
            Mode::Browsing => self.handle_browsing_key(key),
            Mode::Selecting(selection) => {
                self.handle_selection_key(key, selection);
                Flow::Continue
            }
            Mode::Creating(form) => {
                self.handle_creation_key(key, form);
                Flow::Continue
            }
        }
    }

    fn handle_browsing_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.viewport.follow(self.cursor);
                }
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.grid.len() {
                    self.cursor += 1;
                    self.viewport.follow(self.cursor);
                }
            }
            KeyCode::Left => self.change_day(-1),
            KeyCode::Right => self.change_day(1),
            KeyCode::Char('t') | KeyCode::Char('T') => self.jump_to_now(),
            KeyCode::Char('n') => self.mode = Mode::Creating(TaskForm::new(self.cursor)),
            KeyCode::Enter => {
                if !self.grid.tasks(self.cursor).is_empty() {
                    self.mode = Mode::Selecting(Selection {
                        task_cursor: 0,
                        delete: DeleteConfirm::Idle,
                    });
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_selection_key(&mut self, key: KeyEvent, mut selection: Selection) {
        let task_count = self.grid.tasks(self.cursor).len();
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Up => {
                selection.delete.reset();
                selection.task_cursor = selection.task_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                selection.delete.reset();
                if selection.task_cursor + 1 < task_count {
                    selection.task_cursor += 1;
                }
            }
            KeyCode::Char('d') => {
                if selection.delete.press() {
                    self.delete_selected(selection);
                    return;
                }
            }
            _ => selection.delete.reset(),
        }
        self.mode = Mode::Selecting(selection);
    }

    fn delete_selected(&mut self, mut selection: Selection) {
        let Some(id) = self
            .grid
            .tasks(self.cursor)
            .get(selection.task_cursor)
            .map(|t| t.id)
        else {
            return;
        };
        if let Err(err) = self.store.delete(id) {
            warn!(id, error = %err, "delete failed");
            self.set_banner(format!("Failed to delete task: {err}"));
            self.mode = Mode::Selecting(selection);
            return;
        }
        info!(id, slot = self.cursor, "deleted task");
        let remaining = match self.grid.slot_mut(self.cursor) {
            Some(slot) => {
                slot.tasks.retain(|t| t.id != id);
                slot.tasks.len()
            }
            None => 0,
        };
        if remaining > 0 {
            selection.task_cursor = selection.task_cursor.min(remaining - 1);
            self.mode = Mode::Selecting(selection);
        }
    }

    fn handle_creation_key(&mut self, key: KeyEvent, mut form: TaskForm) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Tab | KeyCode::BackTab => form.switch_field(),
            KeyCode::Enter => {
                if self.submit(&mut form) {
                    return;
                }
            }
            _ => {
                form.active_field_mut().edit(key);
            }
        }
        self.mode = Mode::Creating(form);
    }

    /// Validates and stores the form. Returns true once the task is saved and reloaded.
    fn submit(&mut self, form: &mut TaskForm) -> bool {
        let task = match NewTask::parse(
            self.date,
            form.slot,
            form.title.value(),
            form.duration.value(),
            self.default_duration,
        ) {
            Ok(task) => task,
            Err(err) => {
                form.error = Some(err.to_string());
                return false;
            }
        };
        match self.store.save(&task) {
            Ok(id) => info!(id, slot = task.slot, date = %task.date, "created task"),
            Err(err) => {
                warn!(error = %err, "save failed");
                form.error = Some(format!("Failed to save task: {err}"));
                return false;
            }
        }
        if let Err(err) = self.load_tasks() {
            warn!(error = %err, "reload after save failed");
            form.error = Some(format!("Failed to reload tasks: {err}"));
            return false;
        }
        true
    }

    fn change_day(&mut self, days: i64) {
        let Some(date) = self.date.checked_add_signed(Duration::days(days)) else {
            return;
        };
        self.date = date;
        self.grid = SlotGrid::generate(date);
        debug!(%date, "changed day");
        self.reload_or_banner();
    }

    fn jump_to_now(&mut self) {
        let now = self.clock.now();
        self.date = now.date();
        self.now_slot = slot_index(now.time());
        self.cursor = self.now_slot;
        self.grid = SlotGrid::generate(self.date);
        self.viewport.centre_on(self.now_slot);
        self.reload_or_banner();
    }

    fn tick(&mut self) {
        let slot = slot_index(self.clock.now().time());
        if slot != self.now_slot {
            debug!(slot, "now slot advanced");
            self.now_slot = slot;
        }
    }

    fn load_tasks(&mut self) -> Result<(), StoreError> {
        let tasks = self.store.list_for_date(self.date)?;
        let dropped = self.grid.populate(tasks);
        if dropped > 0 {
            debug!(dropped, date = %self.date, "skipped tasks with out-of-range slots");
        }
        Ok(())
    }

    fn reload_or_banner(&mut self) {
        if let Err(err) = self.load_tasks() {
            warn!(error = %err, date = %self.date, "loading tasks failed");
            self.set_banner(format!("Failed to load tasks: {err}"));
        }
    }

    fn set_banner(&mut self, message: String) {
        self.banner = Some(Banner {
            message,
            at: self.clock.now(),
        });
    }
}
