use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use tui_input::Input;

use crate::components::button::{Button, ButtonAction, ButtonState};

const MAX_CONNECTION_LOGS: usize = 100;

/// What the connect screen asks the app to do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectAction {
    Connect(String),
    Quit,
}

pub struct ConnectScreen {
    pub url_input: Input,
    pub connect_button: Button,
    pub connect_in_progress: bool,
    pub connection_logs: Vec<String>,
}

impl ConnectScreen {
    pub fn new(default_url: &str) -> Self {
        let mut screen = Self {
            url_input: Input::default().with_value(default_url.to_string()),
            connect_button: Button::new("Connect").with_hotkey('c'),
            connect_in_progress: false,
            connection_logs: Vec::new(),
        };
        screen.log("QualAI client initialized");
        screen.log("Enter the backend URL and press Enter to connect");
        screen
    }

    pub fn log(&mut self, message: &str) {
        let line = format!("[{}] {message}", chrono::Local::now().format("%H:%M:%S"));
        self.connection_logs.push(line);
        if self.connection_logs.len() > MAX_CONNECTION_LOGS {
            self.connection_logs.remove(0);
        }
    }

    pub fn set_in_progress(&mut self, in_progress: bool) {
        self.connect_in_progress = in_progress;
        self.connect_button.set_enabled(!in_progress);
    }

    pub fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Option<ConnectAction> {
        if self.connect_in_progress {
            return None;
        }

        if self.connect_button.handle_key_input(key, modifiers) == ButtonAction::Clicked {
            return Some(ConnectAction::Connect(self.url_input.value().to_string()));
        }

        match key {
            KeyCode::Enter => Some(ConnectAction::Connect(self.url_input.value().to_string())),
            KeyCode::Esc => Some(ConnectAction::Quit),
            _ => {
                if let Some(req) = super::to_input_request(key, modifiers) {
                    self.url_input.handle(req);
                }
                None
            }
        }
    }

    pub fn handle_mouse_click(&mut self, column: u16, row: u16) -> Option<ConnectAction> {
        if self.connect_in_progress {
            return None;
        }
        if self.connect_button.handle_mouse_click(column, row) == ButtonAction::Clicked {
            self.connect_button.set_state(ButtonState::Pressed);
            return Some(ConnectAction::Connect(self.url_input.value().to_string()));
        }
        None
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // URL input
                Constraint::Length(3), // Connect button
                Constraint::Min(3),    // Connection log
            ])
            .split(area);

        let title = if self.connect_in_progress {
            "Server URL (connecting...)"
        } else {
            "Server URL"
        };
        let url = Paragraph::new(self.url_input.value())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(url, chunks[0]);

        if !self.connect_in_progress {
            let inner_width = chunks[0].width.saturating_sub(2);
            let cursor_x = self.url_input.visual_cursor() as u16;
            f.set_cursor_position((
                chunks[0].x + 1 + cursor_x.min(inner_width.saturating_sub(1)),
                chunks[0].y + 1,
            ));
        }

        let button_area = Rect {
            x: chunks[1].x,
            y: chunks[1].y,
            width: 15.min(chunks[1].width),
            height: chunks[1].height,
        };
        self.connect_button.render(f, button_area);

        let visible = chunks[2].height.saturating_sub(2) as usize;
        let start = self.connection_logs.len().saturating_sub(visible);
        let items: Vec<ListItem> = self.connection_logs[start..]
            .iter()
            .map(|line| ListItem::new(line.as_str()))
            .collect();
        let log_list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Connection Log"));
        f.render_widget(log_list, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_emits_connect_with_current_url() {
        let mut screen = ConnectScreen::new("http://localhost:5001");
        let action = screen.handle_input(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(
            action,
            Some(ConnectAction::Connect("http://localhost:5001".to_string()))
        );
    }

    #[test]
    fn test_typing_edits_url() {
        let mut screen = ConnectScreen::new("http://localhost:500");
        screen.handle_input(KeyCode::Char('1'), KeyModifiers::NONE);
        assert_eq!(screen.url_input.value(), "http://localhost:5001");
    }

    #[test]
    fn test_input_ignored_while_connecting() {
        let mut screen = ConnectScreen::new("http://localhost:5001");
        screen.set_in_progress(true);
        assert_eq!(screen.handle_input(KeyCode::Enter, KeyModifiers::NONE), None);
        assert_eq!(
            screen.handle_input(KeyCode::Char('x'), KeyModifiers::NONE),
            None
        );
        assert_eq!(screen.url_input.value(), "http://localhost:5001");
    }

    #[test]
    fn test_log_is_capped() {
        let mut screen = ConnectScreen::new("http://localhost:5001");
        for i in 0..200 {
            screen.log(&format!("line {i}"));
        }
        assert_eq!(screen.connection_logs.len(), MAX_CONNECTION_LOGS);
        assert!(screen.connection_logs.last().unwrap().contains("line 199"));
    }

    #[test]
    fn test_esc_quits() {
        let mut screen = ConnectScreen::new("http://localhost:5001");
        assert_eq!(
            screen.handle_input(KeyCode::Esc, KeyModifiers::NONE),
            Some(ConnectAction::Quit)
        );
    }
}
