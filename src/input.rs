use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// Cursor over a text field owned by someone else (usually a draft).
///
/// `pos` is a byte offset and always sits on a char boundary of the text it
/// was last used with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCursor {
    pos: usize,
}

impl TextCursor {
    pub fn at_end(text: &str) -> Self {
        TextCursor { pos: text.len() }
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn clamp(&mut self, text: &str) {
        if self.pos > text.len() {
            self.pos = text.len();
        }
        while !text.is_char_boundary(self.pos) {
            self.pos -= 1;
        }
    }

    fn prev_boundary(text: &str, pos: usize) -> usize {
        text[..pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(text: &str, pos: usize) -> usize {
        text[pos..]
            .chars()
            .next()
            .map(|c| pos + c.len_utf8())
            .unwrap_or(pos)
    }

    fn line_start(text: &str, pos: usize) -> usize {
        text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(text: &str, pos: usize) -> usize {
        text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len())
    }

    /// Byte offset `columns` chars into the line starting at `start`, or the
    /// end of that line.
    fn offset_in_line(text: &str, start: usize, columns: usize) -> usize {
        let end = Self::line_end(text, start);
        text[start..end]
            .char_indices()
            .nth(columns)
            .map(|(i, _)| start + i)
            .unwrap_or(end)
    }

    fn column(text: &str, pos: usize) -> usize {
        text[Self::line_start(text, pos)..pos].chars().count()
    }

    /// Applies an editing key to `text`. Returns whether the text changed.
    pub fn apply(
        &mut self,
        text: &mut String,
        key: KeyEvent,
        multiline: bool,
        max_chars: Option<usize>,
    ) -> bool {
        self.clamp(text);
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        let room = max_chars.map_or(true, |max| text.chars().count() < max);
        match key.code {
            KeyCode::Char(c) if room => {
                text.insert(self.pos, c);
                self.pos += c.len_utf8();
                true
            }
            KeyCode::Enter if multiline && room => {
                text.insert(self.pos, '\n');
                self.pos += 1;
                true
            }
            KeyCode::Backspace if self.pos > 0 => {
                let prev = Self::prev_boundary(text, self.pos);
                text.replace_range(prev..self.pos, "");
                self.pos = prev;
                true
            }
            KeyCode::Delete if self.pos < text.len() => {
                let next = Self::next_boundary(text, self.pos);
                text.replace_range(self.pos..next, "");
                true
            }
            KeyCode::Left => {
                self.pos = Self::prev_boundary(text, self.pos);
                false
            }
            KeyCode::Right => {
                self.pos = Self::next_boundary(text, self.pos);
                false
            }
            KeyCode::Home => {
                self.pos = Self::line_start(text, self.pos);
                false
            }
            KeyCode::End => {
                self.pos = Self::line_end(text, self.pos);
                false
            }
            KeyCode::Up if multiline => {
                let start = Self::line_start(text, self.pos);
                if start > 0 {
                    let column = Self::column(text, self.pos);
                    let prev_start = Self::line_start(text, start - 1);
                    self.pos = Self::offset_in_line(text, prev_start, column);
                }
                false
            }
            KeyCode::Down if multiline => {
                let end = Self::line_end(text, self.pos);
                if end < text.len() {
                    let column = Self::column(text, self.pos);
                    self.pos = Self::offset_in_line(text, end + 1, column);
                }
                false
            }
            _ => false,
        }
    }

    /// Row and display column of the cursor, for placing the terminal cursor.
    pub fn screen_offset(&self, text: &str) -> (u16, u16) {
        let pos = self.pos.min(text.len());
        let before = text.get(..pos).unwrap_or(text);
        let row = before.matches('\n').count();
        let line = &before[Self::line_start(before, before.len())..];
        (row as u16, line.width() as u16)
    }
}
