use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tokio::sync::Mutex;
use tui_input::Input;

use crate::api::ChatMessage;
use crate::client::QualAiClientManager;

const GREETING: &str = "Hello! I'm the QualAI assistant. Ask me anything about your interview transcripts.";
const APOLOGY: &str = "I apologize, but I ran into an error processing your message. Please try again.";

/// Chat with the analysis assistant. History lives server-side; this screen
/// mirrors it and appends the current session's exchanges.
pub struct ChatScreen {
    manager: Arc<Mutex<QualAiClientManager>>,
    pub messages: Vec<ChatMessage>,
    pub input: Input,
    pub scroll_offset: u16,
}

impl ChatScreen {
    pub fn new(manager: Arc<Mutex<QualAiClientManager>>) -> Self {
        Self {
            manager,
            messages: vec![ChatMessage {
                content: GREETING.to_string(),
                is_user: false,
            }],
            input: Input::default(),
            scroll_offset: 0,
        }
    }

    /// Replace the greeting with the stored history, when there is any.
    pub async fn load_history(&mut self) -> Result<()> {
        let history = self.manager.lock().await.chat_history().await?;
        if !history.is_empty() {
            self.messages = history;
        }
        Ok(())
    }

    /// Send the typed message. The user's line is kept even when the
    /// backend fails; the failure surfaces as an assistant apology.
    pub async fn send(&mut self) -> Result<()> {
        let message = self.input.value().trim().to_string();
        if message.is_empty() {
            return Ok(());
        }
        self.input.reset();
        self.messages.push(ChatMessage {
            content: message.clone(),
            is_user: true,
        });

        let result = self.manager.lock().await.chat(&message).await;

        let reply = match result {
            Ok(response) => response,
            Err(e) => {
                log::error!("Chat request failed: {e}");
                APOLOGY.to_string()
            }
        };
        self.messages.push(ChatMessage {
            content: reply,
            is_user: false,
        });
        self.scroll_offset = 0;
        Ok(())
    }

    pub async fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        match key {
            KeyCode::Enter => self.send().await,
            KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                Ok(())
            }
            KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                Ok(())
            }
            _ => {
                if let Some(req) = super::to_input_request(key, modifiers) {
                    self.input.handle(req);
                }
                Ok(())
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        let mut lines: Vec<Line> = Vec::new();
        for message in &self.messages {
            let (speaker, style) = if message.is_user {
                ("You", Style::default().fg(Color::Cyan))
            } else {
                ("QualAI", Style::default().fg(Color::Green))
            };
            lines.push(Line::from(Span::styled(format!("{speaker}:"), style)));
            for text_line in message.content.split('\n') {
                lines.push(Line::from(format!("  {text_line}")));
            }
            lines.push(Line::from(""));
        }

        // Pin to the bottom unless the user scrolled up.
        let visible_height = chunks[0].height.saturating_sub(2);
        let total = lines.len() as u16;
        let bottom = total.saturating_sub(visible_height);
        let scroll = bottom.saturating_sub(self.scroll_offset);

        let history = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Chat"))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        f.render_widget(history, chunks[0]);

        let input = Paragraph::new(self.input.value())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Message"));
        f.render_widget(input, chunks[1]);

        f.set_cursor_position((
            chunks[1].x + 1 + self.input.visual_cursor() as u16,
            chunks[1].y + 1,
        ));
    }
}
