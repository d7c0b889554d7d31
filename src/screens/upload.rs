use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use tui_input::Input;

use crate::config::QualAiConfig;
use crate::files::upload::{
    self, collect_upload_files, SharedUploadTask, UploadItem, UploadRegistry, UploadState,
};

/// Upload local files or folders to the backend. Each upload runs as its
/// own background task; the list below the input shows live status.
pub struct UploadScreen {
    pub path_input: Input,
    pub tasks: Vec<SharedUploadTask>,
    registry: UploadRegistry,
    completed_seen: usize,
}

impl UploadScreen {
    pub fn new() -> Self {
        Self {
            path_input: Input::default(),
            tasks: Vec::new(),
            registry: UploadRegistry::new(),
            completed_seen: 0,
        }
    }

    /// Start an upload for the typed path. Directories are expanded
    /// recursively before the request is built.
    pub async fn start_upload(
        &mut self,
        project: Option<String>,
        config: &QualAiConfig,
    ) -> Result<Option<String>> {
        let raw = self.path_input.value().trim().to_string();
        if raw.is_empty() {
            return Ok(None);
        }

        let path = PathBuf::from(&raw);
        let item = match UploadItem::from_path(&path) {
            Ok(item) => item,
            Err(e) => return Ok(Some(format!("Cannot upload {raw}: {e}"))),
        };
        let files = collect_upload_files(vec![item]).await?;
        if files.is_empty() {
            return Ok(Some(format!("Nothing to upload under {raw}")));
        }

        let count = files.len();
        match upload::start(files, project, config.clone(), &self.registry) {
            Ok(task) => {
                self.tasks.push(task);
                self.path_input.reset();
                Ok(Some(format!("Uploading {count} file(s) from {raw}")))
            }
            Err(e) => Ok(Some(format!("Upload rejected: {e}"))),
        }
    }

    /// Number of uploads that reached Completed since the last call. The
    /// app refreshes the document tree when this is non-zero.
    pub fn take_newly_completed(&mut self) -> usize {
        let completed = self
            .tasks
            .iter()
            .filter(|task| {
                task.lock()
                    .map(|t| t.state == UploadState::Completed)
                    .unwrap_or(false)
            })
            .count();
        let newly = completed.saturating_sub(self.completed_seen);
        self.completed_seen = completed;
        newly
    }

    pub fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if let Some(req) = super::to_input_request(key, modifiers) {
            self.path_input.handle(req);
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let input = Paragraph::new(self.path_input.value())
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("File or folder path (Enter to upload)"),
            );
        f.render_widget(input, chunks[0]);
        f.set_cursor_position((
            chunks[0].x + 1 + self.path_input.visual_cursor() as u16,
            chunks[0].y + 1,
        ));

        let items: Vec<ListItem> = self
            .tasks
            .iter()
            .rev()
            .map(|task| {
                let Ok(task) = task.lock() else {
                    return ListItem::new("(unavailable)");
                };
                let (status, style) = match &task.state {
                    UploadState::Pending => ("pending".to_string(), Style::default().fg(Color::Gray)),
                    UploadState::Uploading => {
                        ("uploading".to_string(), Style::default().fg(Color::Yellow))
                    }
                    UploadState::Completed => ("done".to_string(), Style::default().fg(Color::Green)),
                    UploadState::Error(e) => (format!("failed: {e}"), Style::default().fg(Color::Red)),
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ({} files) - ", task.label, task.file_count)),
                    Span::styled(status, style),
                ]))
            })
            .collect();
        let title = format!("Uploads ({} in flight)", self.registry.in_flight_count());
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(list, chunks[1]);
    }
}
