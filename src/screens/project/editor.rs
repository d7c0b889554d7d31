use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Edits are saved automatically once the user pauses typing for the
/// configured delay. Returns true when a pending edit has aged past the
/// delay; pure so the debounce window is testable without a clock.
pub fn autosave_due(dirty_since: Option<Instant>, now: Instant, delay: Duration) -> bool {
    match dirty_since {
        Some(since) => now.duration_since(since) >= delay,
        None => false,
    }
}

/// Multi-line transcript editor for the currently open document.
pub struct Editor {
    pub key: Option<String>,
    content: String,
    /// Cursor as a char offset into `content`.
    cursor: usize,
    dirty_since: Option<Instant>,
    autosave_delay: Duration,
    pub last_saved: Option<String>,
    pub scroll_offset: u16,
}

impl Editor {
    pub fn new(autosave_delay: Duration) -> Self {
        Self {
            key: None,
            content: String::new(),
            cursor: 0,
            dirty_since: None,
            autosave_delay,
            last_saved: None,
            scroll_offset: 0,
        }
    }

    pub fn open(&mut self, key: String, content: String) {
        self.key = Some(key);
        self.cursor = content.chars().count();
        self.content = content;
        self.dirty_since = None;
        self.last_saved = None;
        self.scroll_offset = 0;
    }

    pub fn close(&mut self) {
        self.key = None;
        self.content.clear();
        self.cursor = 0;
        self.dirty_since = None;
        self.last_saved = None;
    }

    pub fn is_open(&self) -> bool {
        self.key.is_some()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// True once the debounce window for a pending edit has elapsed.
    pub fn should_autosave(&self) -> bool {
        autosave_due(self.dirty_since, Instant::now(), self.autosave_delay)
    }

    /// Snapshot for a save request: the document key and current content.
    /// Clears the dirty marker; a failed save re-marks via `mark_dirty`.
    pub fn take_save_snapshot(&mut self) -> Option<(String, String)> {
        let key = self.key.clone()?;
        self.dirty_since = None;
        Some((key, self.content.clone()))
    }

    pub fn mark_dirty(&mut self) {
        self.dirty_since = Some(Instant::now());
    }

    pub fn mark_saved(&mut self) {
        self.last_saved = Some(chrono::Local::now().format("%H:%M:%S").to_string());
    }

    fn byte_offset(&self, char_offset: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_offset)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    pub fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if !self.is_open() {
            return;
        }
        match key {
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                let at = self.byte_offset(self.cursor);
                self.content.insert(at, c);
                self.cursor += 1;
                self.mark_dirty();
            }
            KeyCode::Enter => {
                let at = self.byte_offset(self.cursor);
                self.content.insert(at, '\n');
                self.cursor += 1;
                self.mark_dirty();
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.content.remove(at);
                    self.mark_dirty();
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.content.chars().count() {
                    let at = self.byte_offset(self.cursor);
                    self.content.remove(at);
                    self.mark_dirty();
                }
            }
            KeyCode::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Right => {
                if self.cursor < self.content.chars().count() {
                    self.cursor += 1;
                }
            }
            KeyCode::Up => self.move_vertical(-1),
            KeyCode::Down => self.move_vertical(1),
            KeyCode::Home => {
                let (line, _) = self.cursor_line_col();
                self.cursor = self.line_start(line);
            }
            KeyCode::End => {
                let (line, _) = self.cursor_line_col();
                self.cursor = self.line_start(line) + self.line_len(line);
            }
            _ => {}
        }
    }

    fn lines(&self) -> Vec<&str> {
        self.content.split('\n').collect()
    }

    fn line_start(&self, line: usize) -> usize {
        self.lines()
            .iter()
            .take(line)
            .map(|l| l.chars().count() + 1)
            .sum()
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines()
            .get(line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut remaining = self.cursor;
        for (i, line) in self.lines().iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                return (i, remaining);
            }
            remaining -= len + 1; // line plus its newline
        }
        (0, 0)
    }

    fn move_vertical(&mut self, delta: i64) {
        let (line, col) = self.cursor_line_col();
        let line_count = self.lines().len();
        let target = line as i64 + delta;
        if target < 0 || target >= line_count as i64 {
            return;
        }
        let target = target as usize;
        let new_col = col.min(self.line_len(target));
        self.cursor = self.line_start(target) + new_col;
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, focused: bool) {
        let title = match (&self.key, &self.last_saved, self.is_dirty()) {
            (Some(key), _, true) => format!("{key} *"),
            (Some(key), Some(at), false) => format!("{key} (saved {at})"),
            (Some(key), None, false) => key.clone(),
            (None, _, _) => "No document open".to_string(),
        };

        let (line, col) = self.cursor_line_col();
        let visible_height = area.height.saturating_sub(2);
        if visible_height > 0 {
            if (line as u16) < self.scroll_offset {
                self.scroll_offset = line as u16;
            } else if line as u16 >= self.scroll_offset + visible_height {
                self.scroll_offset = line as u16 + 1 - visible_height;
            }
        }

        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        let body = Paragraph::new(self.content.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            )
            .scroll((self.scroll_offset, 0));
        f.render_widget(body, area);

        if focused && self.is_open() {
            let cursor_y = (line as u16).saturating_sub(self.scroll_offset);
            f.set_cursor_position((
                area.x + 1 + (col as u16).min(area.width.saturating_sub(3)),
                area.y + 1 + cursor_y.min(visible_height.saturating_sub(1)),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> Editor {
        let mut e = Editor::new(Duration::from_millis(1500));
        e.open("a.txt".to_string(), String::new());
        e
    }

    #[test]
    fn test_autosave_due_respects_delay() {
        let delay = Duration::from_millis(1500);
        let now = Instant::now();
        assert!(!autosave_due(None, now, delay));
        assert!(!autosave_due(Some(now), now + Duration::from_millis(100), delay));
        assert!(autosave_due(Some(now), now + Duration::from_millis(1500), delay));
    }

    #[test]
    fn test_typing_marks_dirty_and_moves_cursor() {
        let mut e = editor();
        assert!(!e.is_dirty());
        e.handle_input(KeyCode::Char('h'), KeyModifiers::NONE);
        e.handle_input(KeyCode::Char('i'), KeyModifiers::NONE);
        assert_eq!(e.content(), "hi");
        assert!(e.is_dirty());
    }

    #[test]
    fn test_backspace_respects_char_boundaries() {
        let mut e = editor();
        e.handle_input(KeyCode::Char('é'), KeyModifiers::NONE);
        e.handle_input(KeyCode::Char('x'), KeyModifiers::NONE);
        e.handle_input(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(e.content(), "é");
        e.handle_input(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(e.content(), "");
    }

    #[test]
    fn test_insert_in_middle() {
        let mut e = editor();
        for c in "ac".chars() {
            e.handle_input(KeyCode::Char(c), KeyModifiers::NONE);
        }
        e.handle_input(KeyCode::Left, KeyModifiers::NONE);
        e.handle_input(KeyCode::Char('b'), KeyModifiers::NONE);
        assert_eq!(e.content(), "abc");
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut e = Editor::new(Duration::from_millis(1500));
        e.open("a.txt".to_string(), "long line here\nhi\nanother".to_string());
        // Cursor starts at the end of the content.
        e.handle_input(KeyCode::Up, KeyModifiers::NONE);
        let (line, col) = e.cursor_line_col();
        assert_eq!(line, 1);
        assert_eq!(col, 2); // "hi" is shorter than the previous column

        e.handle_input(KeyCode::Up, KeyModifiers::NONE);
        let (line, _) = e.cursor_line_col();
        assert_eq!(line, 0);
    }

    #[test]
    fn test_take_save_snapshot_clears_dirty() {
        let mut e = editor();
        e.handle_input(KeyCode::Char('x'), KeyModifiers::NONE);
        let (key, content) = e.take_save_snapshot().unwrap();
        assert_eq!(key, "a.txt");
        assert_eq!(content, "x");
        assert!(!e.is_dirty());
    }

    #[test]
    fn test_closed_editor_ignores_input() {
        let mut e = Editor::new(Duration::from_millis(1500));
        e.handle_input(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(e.content(), "");
        assert!(e.take_save_snapshot().is_none());
    }

    #[test]
    fn test_enter_splits_line() {
        let mut e = editor();
        for c in "ab".chars() {
            e.handle_input(KeyCode::Char(c), KeyModifiers::NONE);
        }
        e.handle_input(KeyCode::Left, KeyModifiers::NONE);
        e.handle_input(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(e.content(), "a\nb");
        let (line, col) = e.cursor_line_col();
        assert_eq!((line, col), (1, 0));
    }
}
