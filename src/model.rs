use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub type TaskId = i64;

/// Number of half-hour slots in one calendar day.
pub const SLOTS_PER_DAY: usize = 48;
pub const SLOT_MINUTES: u32 = 30;
pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const TITLE_CHAR_LIMIT: usize = 50;
pub const DURATION_CHAR_LIMIT: usize = 3;

/// A task row as returned by the store.
///
/// `slot` is kept as the raw stored value: rows written by older builds may
/// carry an index outside `0..SLOTS_PER_DAY`, and the grid decides what to do
/// with those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub date: NaiveDate,
    pub slot: i64,
    pub title: String,
    pub duration_minutes: u32,
    pub done: bool,
    pub created_at: NaiveDateTime,
}

/// A validated task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub date: NaiveDate,
    pub slot: usize,
    pub title: String,
    pub duration_minutes: u32,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Invalid duration")]
    InvalidDuration,
}

impl Task {
    pub fn slot_index(&self) -> Option<usize> {
        usize::try_from(self.slot)
            .ok()
            .filter(|idx| *idx < SLOTS_PER_DAY)
    }
}

impl NewTask {
    /// Validates raw form input. An empty duration falls back to `default_duration`.
    pub fn parse(
        date: NaiveDate,
        slot: usize,
        title: &str,
        duration: &str,
        default_duration: u32,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let duration_minutes = parse_duration(duration, default_duration)?;
        Ok(NewTask {
            date,
            slot: slot.min(SLOTS_PER_DAY - 1),
            title: title.to_string(),
            duration_minutes,
        })
    }
}

pub fn parse_duration(input: &str, default_duration: u32) -> Result<u32, ValidationError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(default_duration);
    }
    match raw.parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ValidationError::InvalidDuration),
    }
}

/// Slot index for a time of day: `floor((hour * 60 + minute) / 30)`.
pub fn slot_index(time: NaiveTime) -> usize {
    let minutes = time.hour() * 60 + time.minute();
    (minutes / SLOT_MINUTES) as usize
}

pub fn slot_start(slot: usize) -> NaiveTime {
    let minutes = (slot.min(SLOTS_PER_DAY - 1) as u32) * SLOT_MINUTES;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or(NaiveTime::MIN)
}

/// `9:00 AM - 9:30 AM` style label for a slot.
pub fn format_slot_range(slot: usize) -> String {
    format_time_range(slot_start(slot))
}

pub fn format_time_range(start: NaiveTime) -> String {
    let end = start + chrono::Duration::minutes(SLOT_MINUTES as i64);
    format!("{} - {}", start.format("%-I:%M %p"), end.format("%-I:%M %p"))
}
