use crate::model::{DURATION_CHAR_LIMIT, TITLE_CHAR_LIMIT};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    value: String,
    cursor: usize,
    limit: usize,
}

impl FieldValue {
    pub fn new(limit: usize) -> Self {
        FieldValue {
            value: String::new(),
            cursor: 0,
            limit,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn move_left(&mut self) {
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let next = next_char(self.cursor, &self.value);
        self.value.drain(self.cursor..next);
    }

    fn insert_char(&mut self, ch: char) {
        if self.value.chars().count() >= self.limit {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }

    /// Applies an editing key. Returns false when the key is not an edit.
    pub fn edit(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.len(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c)
            }
            _ => return false,
        }
        true
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Duration,
}

/// In-progress task creation for one slot.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub slot: usize,
    pub title: FieldValue,
    pub duration: FieldValue,
    pub field: FormField,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn new(slot: usize) -> Self {
        TaskForm {
            slot,
            title: FieldValue::new(TITLE_CHAR_LIMIT),
            duration: FieldValue::new(DURATION_CHAR_LIMIT),
            field: FormField::Title,
            error: None,
        }
    }

    pub fn switch_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Duration,
            FormField::Duration => FormField::Title,
        };
    }

    pub fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Duration => &mut self.duration,
        }
    }
}

fn prev_char(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(field: &mut FieldValue, code: KeyCode) {
        field.edit(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(field: &mut FieldValue, text: &str) {
        for ch in text.chars() {
            press(field, KeyCode::Char(ch));
        }
    }

    #[test]
    fn edits_at_cursor_with_multibyte_text() {
        let mut field = FieldValue::new(50);
        type_str(&mut field, "café");
        press(&mut field, KeyCode::Left);
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.value(), "caé");
        press(&mut field, KeyCode::Home);
        press(&mut field, KeyCode::Delete);
        assert_eq!(field.value(), "aé");
        press(&mut field, KeyCode::End);
        type_str(&mut field, "!");
        assert_eq!(field.value(), "aé!");
        assert_eq!(field.with_caret(), "aé!▌");
    }

    #[test]
    fn ignores_input_past_limit() {
        let mut field = FieldValue::new(DURATION_CHAR_LIMIT);
        type_str(&mut field, "12345");
        assert_eq!(field.value(), "123");
    }

    #[test]
    fn control_chords_are_not_text() {
        let mut field = FieldValue::new(10);
        let handled = field.edit(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert!(!handled);
        assert_eq!(field.value(), "");
    }

    #[test]
    fn tab_cycles_between_two_fields() {
        let mut form = TaskForm::new(18);
        assert_eq!(form.field, FormField::Title);
        form.switch_field();
        assert_eq!(form.field, FormField::Duration);
        form.active_field_mut().edit(KeyEvent::new(KeyCode::Char('4'), KeyModifiers::NONE));
        form.switch_field();
        assert_eq!(form.field, FormField::Title);
        assert_eq!(form.duration.value(), "4");
        assert_eq!(form.title.value(), "");
    }
}
