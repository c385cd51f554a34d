use crate::model::{slot_start, Task, SLOTS_PER_DAY};
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub tasks: Vec<Task>,
}

/// One calendar day split into fixed half-hour slots.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    date: NaiveDate,
    slots: Vec<Slot>,
}

impl SlotGrid {
    pub fn generate(date: NaiveDate) -> Self {
        let slots = (0..SLOTS_PER_DAY)
            .map(|idx| Slot {
                start: date.and_time(slot_start(idx)),
                tasks: Vec::new(),
            })
            .collect();
        SlotGrid { date, slots }
    }

    /// Replaces every slot's tasks with `tasks`, keeping the given order within a slot.
    /// Rows whose slot index is out of range are skipped; the count is returned.
    pub fn populate(&mut self, tasks: Vec<Task>) -> usize {
        for slot in &mut self.slots {
            slot.tasks.clear();
        }
        let mut dropped = 0;
        for task in tasks {
            match task.slot_index() {
                Some(idx) => self.slots[idx].tasks.push(task),
                None => dropped += 1,
            }
        }
        dropped
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut Slot> {
        self.slots.get_mut(idx)
    }

    pub fn tasks(&self, idx: usize) -> &[Task] {
        self.slots
            .get(idx)
            .map(|s| s.tasks.as_slice())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().enumerate()
    }
}
