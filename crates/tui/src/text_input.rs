//! Reusable UTF-8 safe text input state with cursor management.
//!
//! Each form field owns one of these; the view only reads `input()` and
//! `cursor_column()`.

use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
}

impl TextInputState {
    /// State holding `text` with the cursor at its end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let input = text.into();
        let cursor = input.len();
        Self { input, cursor }
    }

    // ----- Getters -----
    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display column of the cursor, counting wide characters as two.
    pub fn cursor_column(&self) -> usize {
        self.input[..self.cursor].width()
    }

    // ----- Setters -----
    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len();
    }

    // ----- Editing primitives (UTF-8 safe) -----

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    /// Insert a char at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace the char immediately before the cursor.
    pub fn backspace(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().next_back() {
            let start = self.cursor - previous.len_utf8();
            self.input.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.input.drain(self.cursor..self.cursor + next.len_utf8());
        }
    }

    /// Remove everything before the cursor.
    pub fn clear_to_start(&mut self) {
        self.input.drain(..self.cursor);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_move_insert_backspace() {
        let mut st = TextInputState::with_text("h🙂llo"); // emoji is 4 bytes
        st.move_home();
        st.move_right(); // between h and 🙂
        st.insert_char('e');
        assert_eq!(st.input(), "he🙂llo");
        st.move_right(); // step over 🙂
        st.backspace(); // delete 🙂
        assert_eq!(st.input(), "hello");
        st.move_left();
        st.backspace();
        assert_eq!(st.input(), "ello");
    }

    #[test]
    fn delete_and_end_keep_the_cursor_on_boundaries() {
        let mut st = TextInputState::with_text("'é'");
        st.move_home();
        st.move_right();
        st.delete();
        assert_eq!(st.input(), "''");
        assert_eq!(st.cursor(), 1);
        st.move_end();
        st.delete();
        assert_eq!(st.input(), "''");
        assert_eq!(st.cursor(), 2);
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let mut st = TextInputState::with_text("日本x");
        assert_eq!(st.cursor_column(), 5);
        st.move_left();
        st.move_left();
        assert_eq!(st.cursor_column(), 2);
        st.clear_to_start();
        assert_eq!(st.input(), "本x");
        assert_eq!(st.cursor_column(), 0);
    }
}
