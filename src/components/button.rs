use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonState {
    Normal,
    Hovered,
    Pressed,
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonAction {
    Clicked,
    None,
}

#[derive(Debug, Clone)]
pub struct Button {
    pub label: String,
    pub hotkey: Option<char>, // Alt+key shortcut
    pub state: ButtonState,
    pub enabled: bool,
    pub area: Option<Rect>, // Set during rendering for click detection
}

impl Button {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            hotkey: None,
            state: ButtonState::Normal,
            enabled: true,
            area: None,
        }
    }

    pub fn with_hotkey(mut self, key: char) -> Self {
        self.hotkey = Some(key);
        self
    }

    pub fn set_state(&mut self, state: ButtonState) {
        if self.enabled {
            self.state = state;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.state = if enabled {
            ButtonState::Normal
        } else {
            ButtonState::Disabled
        };
    }

    pub fn handle_key_input(&self, key: KeyCode, modifiers: KeyModifiers) -> ButtonAction {
        if !self.enabled {
            return ButtonAction::None;
        }

        if let KeyCode::Char(c) = key {
            if modifiers.contains(KeyModifiers::ALT) {
                if let Some(hotkey) = self.hotkey {
                    if c.eq_ignore_ascii_case(&hotkey) {
                        return ButtonAction::Clicked;
                    }
                }
            }
        }

        ButtonAction::None
    }

    pub fn handle_mouse_click(&self, column: u16, row: u16) -> ButtonAction {
        if !self.enabled {
            return ButtonAction::None;
        }

        if let Some(area) = self.area {
            if column >= area.x
                && column < area.x + area.width
                && row >= area.y
                && row < area.y + area.height
            {
                return ButtonAction::Clicked;
            }
        }

        ButtonAction::None
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        // Store area for click detection
        self.area = Some(area);

        let style = match self.state {
            ButtonState::Normal => Style::default().fg(Color::White),
            ButtonState::Hovered => Style::default().fg(Color::Yellow),
            ButtonState::Pressed => Style::default().fg(Color::Green),
            ButtonState::Disabled => Style::default().fg(Color::DarkGray),
        };

        let block = Block::default().borders(Borders::ALL).border_style(style);
        let paragraph = Paragraph::new(self.button_text(style))
            .block(block)
            .style(style)
            .centered();

        f.render_widget(paragraph, area);
    }

    fn button_text(&self, base_style: Style) -> Line {
        let mut spans = Vec::new();

        if let Some(hotkey) = self.hotkey {
            let mut found_hotkey = false;
            for ch in self.label.chars() {
                if !found_hotkey && ch.eq_ignore_ascii_case(&hotkey) {
                    spans.push(Span::styled(ch.to_string(), base_style.fg(Color::Red)));
                    found_hotkey = true;
                } else {
                    spans.push(Span::styled(ch.to_string(), base_style));
                }
            }
            if !found_hotkey {
                spans.push(Span::styled(self.label.clone(), base_style));
                spans.push(Span::styled(
                    format!(" (Alt+{})", hotkey.to_uppercase()),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        } else {
            spans.push(Span::styled(self.label.clone(), base_style));
        }

        Line::from(spans)
    }
}
