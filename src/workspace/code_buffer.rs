use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const INDENT: &str = "    ";

/// Editable multi-line text with a char-indexed cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Unhandled,
    Moved,
    Edited,
}

impl CodeBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole text; the cursor is clamped to the new length.
    pub fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.cursor.min(self.char_len());
    }

    pub fn reset(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Zero-based (line, column) of the cursor, counted in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for ch in self.text.chars().take(self.cursor) {
            if ch == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    pub fn handle(&mut self, key: KeyEvent) -> EditOutcome {
        match key.code {
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                EditOutcome::Moved
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                EditOutcome::Moved
            }
            KeyCode::Up => {
                self.move_vertical(-1);
                EditOutcome::Moved
            }
            KeyCode::Down => {
                self.move_vertical(1);
                EditOutcome::Moved
            }
            KeyCode::Home => {
                let (_, col) = self.cursor_line_col();
                self.cursor -= col;
                EditOutcome::Moved
            }
            KeyCode::End => {
                let (line, _) = self.cursor_line_col();
                self.cursor = self.line_start(line) + self.line_len(line);
                EditOutcome::Moved
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return EditOutcome::Unhandled;
                }
                self.remove_char(self.cursor - 1);
                self.cursor -= 1;
                EditOutcome::Edited
            }
            KeyCode::Delete => {
                if self.cursor >= self.char_len() {
                    return EditOutcome::Unhandled;
                }
                self.remove_char(self.cursor);
                EditOutcome::Edited
            }
            KeyCode::Enter => {
                let (line, _) = self.cursor_line_col();
                let indent: String = self
                    .line(line)
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect();
                self.insert_str(&format!("\n{indent}"));
                EditOutcome::Edited
            }
            KeyCode::Tab => {
                self.insert_str(INDENT);
                EditOutcome::Edited
            }
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.insert_str(&ch.to_string());
                EditOutcome::Edited
            }
            _ => EditOutcome::Unhandled,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn insert_str(&mut self, s: &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        self.text.insert_str(byte_offset, s);
        self.cursor += s.chars().count();
    }

    fn remove_char(&mut self, char_idx: usize) {
        let start = self.char_to_byte(char_idx);
        let end = self.char_to_byte(char_idx + 1);
        self.text.replace_range(start..end, "");
    }

    fn line(&self, line: usize) -> &str {
        self.text.split('\n').nth(line).unwrap_or("")
    }

    fn line_len(&self, line: usize) -> usize {
        self.line(line).chars().count()
    }

    fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    fn line_start(&self, line: usize) -> usize {
        self.text
            .split('\n')
            .take(line)
            .map(|l| l.chars().count() + 1)
            .sum()
    }

    fn move_vertical(&mut self, delta: isize) {
        let (line, col) = self.cursor_line_col();
        let target = line as isize + delta;
        if target < 0 || target as usize >= self.line_count() {
            return;
        }
        let target = target as usize;
        self.cursor = self.line_start(target) + col.min(self.line_len(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut buf = CodeBuffer::new("fn main() {}");
        for _ in 0..11 {
            buf.handle(key(KeyCode::Right));
        }
        assert_eq!(buf.handle(key(KeyCode::Char('x'))), EditOutcome::Edited);
        assert_eq!(buf.text(), "fn main() {x}");
    }

    #[test]
    fn test_enter_carries_indent() {
        let mut buf = CodeBuffer::new("    let a = 1;");
        buf.handle(key(KeyCode::End));
        buf.handle(key(KeyCode::Enter));
        assert_eq!(buf.text(), "    let a = 1;\n    ");
        assert_eq!(buf.cursor_line_col(), (1, 4));
    }

    #[test]
    fn test_backspace_at_start_is_unhandled() {
        let mut buf = CodeBuffer::new("abc");
        assert_eq!(buf.handle(key(KeyCode::Backspace)), EditOutcome::Unhandled);
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buf = CodeBuffer::new("ab\ncd");
        buf.handle(key(KeyCode::Down));
        assert_eq!(buf.cursor_line_col(), (1, 0));
        buf.handle(key(KeyCode::Backspace));
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_vertical_move_clamps_column() {
        let mut buf = CodeBuffer::new("long line\nab\nlonger line");
        buf.handle(key(KeyCode::End));
        buf.handle(key(KeyCode::Down));
        assert_eq!(buf.cursor_line_col(), (1, 2));
        buf.handle(key(KeyCode::Down));
        assert_eq!(buf.cursor_line_col(), (2, 2));
        buf.handle(key(KeyCode::Down));
        assert_eq!(buf.cursor_line_col(), (2, 2));
    }

    #[test]
    fn test_multibyte_chars() {
        let mut buf = CodeBuffer::new("é");
        buf.handle(key(KeyCode::End));
        buf.handle(key(KeyCode::Char('ß')));
        assert_eq!(buf.text(), "éß");
        buf.handle(key(KeyCode::Backspace));
        assert_eq!(buf.text(), "é");
    }

    #[test]
    fn test_control_chars_unhandled() {
        let mut buf = CodeBuffer::new("");
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(buf.handle(ctrl_r), EditOutcome::Unhandled);
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_replace_clamps_cursor() {
        let mut buf = CodeBuffer::new("abcdef");
        buf.handle(key(KeyCode::End));
        buf.replace("ab");
        assert_eq!(buf.cursor(), 2);
    }
}
