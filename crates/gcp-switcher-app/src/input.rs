// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const PROJECT_INPUT_LIMIT: usize = 50;
pub const LIST_PAGE_ROWS: usize = 10;

/// Terminal-independent key vocabulary the reducer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Enter,
    Esc,
    Backspace,
    Interrupt,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListCursor {
    selected: usize,
    len: usize,
}

impl ListCursor {
    pub const fn selected(&self) -> usize {
        self.selected
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.len.saturating_sub(1));
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let target = self.selected.saturating_add_signed(delta);
        self.select(target);
    }

    /// Applies a navigation key; returns false when the key is not a
    /// movement key.
    pub fn apply_key(&mut self, key: KeyPress) -> bool {
        match key {
            KeyPress::Up | KeyPress::Char('k') => self.move_by(-1),
            KeyPress::Down | KeyPress::Char('j') => self.move_by(1),
            KeyPress::PageUp => self.move_by(-(LIST_PAGE_ROWS as isize)),
            KeyPress::PageDown => self.move_by(LIST_PAGE_ROWS as isize),
            KeyPress::Home | KeyPress::Char('g') => self.select(0),
            KeyPress::End | KeyPress::Char('G') => self.select(self.len.saturating_sub(1)),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInput {
    value: String,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn push(&mut self, ch: char) {
        if ch.is_control() || self.value.chars().count() >= PROJECT_INPUT_LIMIT {
            return;
        }
        self.value.push(ch);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyPress, LIST_PAGE_ROWS, ListCursor, PROJECT_INPUT_LIMIT, TextInput};

    #[test]
    fn cursor_clamps_to_bounds() {
        let mut cursor = ListCursor::default();
        cursor.move_by(1);
        assert_eq!(cursor.selected(), 0);

        cursor.set_len(3);
        cursor.move_by(-1);
        assert_eq!(cursor.selected(), 0);
        cursor.apply_key(KeyPress::End);
        assert_eq!(cursor.selected(), 2);
        cursor.move_by(5);
        assert_eq!(cursor.selected(), 2);

        cursor.set_len(1);
        assert_eq!(cursor.selected(), 0);
    }

    #[test]
    fn page_keys_jump_by_page() {
        let mut cursor = ListCursor::default();
        cursor.set_len(40);
        assert!(cursor.apply_key(KeyPress::PageDown));
        assert_eq!(cursor.selected(), LIST_PAGE_ROWS);
        assert!(cursor.apply_key(KeyPress::Home));
        assert_eq!(cursor.selected(), 0);
        assert!(!cursor.apply_key(KeyPress::Enter));
    }

    #[test]
    fn text_input_caps_length_and_skips_control_chars() {
        let mut input = TextInput::default();
        for _ in 0..PROJECT_INPUT_LIMIT + 5 {
            input.push('x');
        }
        input.push('\n');
        assert_eq!(input.value().len(), PROJECT_INPUT_LIMIT);

        input.backspace();
        assert_eq!(input.value().len(), PROJECT_INPUT_LIMIT - 1);
        input.clear();
        assert!(input.value().is_empty());
    }
}
