pub mod editor;
pub mod sidebar;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::sync::Mutex;
use tui_input::Input;

use crate::client::QualAiClientManager;
use crate::files::tree::NodeKind;
use editor::Editor;
use sidebar::Sidebar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Editor,
}

/// The project workspace: document tree on the left, transcript editor on
/// the right.
pub struct ProjectScreen {
    manager: Arc<Mutex<QualAiClientManager>>,
    pub sidebar: Sidebar,
    pub editor: Editor,
    pub focus: Focus,
    rename_input: Option<Input>,
    rename_target: Option<String>,
}

impl ProjectScreen {
    pub fn new(manager: Arc<Mutex<QualAiClientManager>>, autosave_delay_ms: u64) -> Self {
        Self {
            manager,
            sidebar: Sidebar::new(),
            editor: Editor::new(Duration::from_millis(autosave_delay_ms)),
            focus: Focus::Sidebar,
            rename_input: None,
            rename_target: None,
        }
    }

    pub async fn refresh_documents(&mut self) -> Result<()> {
        let keys = self.manager.lock().await.list_documents().await?;
        self.sidebar.set_documents(&keys);
        log::debug!("Loaded {} documents", keys.len());
        Ok(())
    }

    /// Flush any pending edit regardless of the debounce window. Used when
    /// leaving the screen or shutting down.
    pub async fn flush_pending_save(&mut self) -> Result<()> {
        if self.editor.is_dirty() {
            self.save_now().await?;
        }
        Ok(())
    }

    async fn save_now(&mut self) -> Result<()> {
        if let Some((key, content)) = self.editor.take_save_snapshot() {
            match self.manager.lock().await.save_document(&key, &content).await {
                Ok(()) => {
                    self.editor.mark_saved();
                    log::debug!("Saved {key}");
                }
                Err(e) => {
                    // Keep the edit pending so the next tick retries.
                    self.editor.mark_dirty();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Tick hook: runs the debounced autosave.
    pub async fn on_tick(&mut self) -> Result<()> {
        if self.editor.should_autosave() {
            self.save_now().await?;
        }
        Ok(())
    }

    async fn open_selected(&mut self) -> Result<Option<String>> {
        let Some(row) = self.sidebar.selected_row() else {
            return Ok(None);
        };
        match row.kind {
            NodeKind::Folder => {
                self.sidebar.toggle_expand();
                Ok(None)
            }
            NodeKind::File => {
                self.flush_pending_save().await?;
                let content = self.manager.lock().await.read_document(&row.name).await?;
                self.editor.open(row.name.clone(), content);
                self.focus = Focus::Editor;
                Ok(Some(format!("Opened {}", row.name)))
            }
        }
    }

    async fn delete_selected(&mut self) -> Result<Option<String>> {
        let Some(row) = self.sidebar.selected_row() else {
            return Ok(None);
        };
        if row.kind != NodeKind::File {
            return Ok(Some("Only documents can be deleted".to_string()));
        }
        self.manager.lock().await.delete_document(&row.name).await?;
        if self.editor.key.as_deref() == Some(row.name.as_str()) {
            self.editor.close();
            self.focus = Focus::Sidebar;
        }
        self.refresh_documents().await?;
        Ok(Some(format!("Deleted {}", row.name)))
    }

    fn begin_rename(&mut self) -> Option<String> {
        let row = self.sidebar.selected_row()?;
        if row.kind != NodeKind::File {
            return Some("Only documents can be renamed".to_string());
        }
        self.rename_input = Some(Input::default().with_value(row.relative_name.clone()));
        self.rename_target = Some(row.name);
        None
    }

    async fn commit_rename(&mut self) -> Result<Option<String>> {
        let (Some(input), Some(key)) = (self.rename_input.take(), self.rename_target.take())
        else {
            return Ok(None);
        };
        let name = input.value().trim().to_string();
        if name.is_empty() {
            return Ok(Some("Rename cancelled: empty name".to_string()));
        }
        // The rename PATCH only carries the name; push any pending content
        // edit first so closing the editor below cannot drop it.
        self.flush_pending_save().await?;
        self.manager.lock().await.rename_document(&key, &name).await?;
        if self.editor.key.as_deref() == Some(key.as_str()) {
            // The key changes server-side; reopen from the fresh listing.
            self.editor.close();
            self.focus = Focus::Sidebar;
        }
        self.refresh_documents().await?;
        Ok(Some(format!("Renamed {key} to {name}")))
    }

    pub fn rename_dialog_open(&self) -> bool {
        self.rename_input.is_some()
    }

    pub async fn handle_input(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<Option<String>> {
        if self.rename_input.is_some() {
            return match key {
                KeyCode::Esc => {
                    self.rename_input = None;
                    self.rename_target = None;
                    Ok(Some("Rename cancelled".to_string()))
                }
                KeyCode::Enter => self.commit_rename().await,
                _ => {
                    if let Some(req) = super::to_input_request(key, modifiers) {
                        if let Some(input) = self.rename_input.as_mut() {
                            input.handle(req);
                        }
                    }
                    Ok(None)
                }
            };
        }

        if key == KeyCode::Tab {
            self.focus = match self.focus {
                Focus::Sidebar => Focus::Editor,
                Focus::Editor => Focus::Sidebar,
            };
            return Ok(None);
        }

        match self.focus {
            Focus::Sidebar => match key {
                KeyCode::Up => {
                    self.sidebar.move_up();
                    Ok(None)
                }
                KeyCode::Down => {
                    self.sidebar.move_down();
                    Ok(None)
                }
                KeyCode::Enter => self.open_selected().await,
                KeyCode::Char('r') => Ok(self.begin_rename()),
                KeyCode::Delete => self.delete_selected().await,
                _ => Ok(None),
            },
            Focus::Editor => {
                if key == KeyCode::Char('s') && modifiers.contains(KeyModifiers::CONTROL) {
                    self.save_now().await?;
                    return Ok(Some("Saved".to_string()));
                }
                if key == KeyCode::Esc {
                    self.focus = Focus::Sidebar;
                    return Ok(None);
                }
                self.editor.handle_input(key, modifiers);
                Ok(None)
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(area);

        let sidebar_focused = self.focus == Focus::Sidebar;
        let editor_focused = self.focus == Focus::Editor && !self.rename_dialog_open();
        self.sidebar.render(f, chunks[0], sidebar_focused);
        self.editor.render(f, chunks[1], editor_focused);

        if let Some(input) = &self.rename_input {
            let dialog = centered_rect(40, 3, area);
            let body = Paragraph::new(input.value())
                .style(Style::default().fg(Color::Yellow))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow))
                        .title("Rename document"),
                );
            f.render_widget(Clear, dialog);
            f.render_widget(body, dialog);
            f.set_cursor_position((
                dialog.x + 1 + input.visual_cursor() as u16,
                dialog.y + 1,
            ));
        }
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualAiConfig;

    fn screen() -> ProjectScreen {
        let manager = QualAiClientManager::new(QualAiConfig::default()).unwrap();
        ProjectScreen::new(Arc::new(Mutex::new(manager)), 1500)
    }

    #[tokio::test]
    async fn test_tab_toggles_focus() {
        let mut s = screen();
        assert_eq!(s.focus, Focus::Sidebar);
        s.handle_input(KeyCode::Tab, KeyModifiers::NONE).await.unwrap();
        assert_eq!(s.focus, Focus::Editor);
        s.handle_input(KeyCode::Tab, KeyModifiers::NONE).await.unwrap();
        assert_eq!(s.focus, Focus::Sidebar);
    }

    #[tokio::test]
    async fn test_rename_requires_file_selection() {
        let mut s = screen();
        s.sidebar.set_documents(&["folder/doc.txt"]);
        // Top-level row is the folder.
        let status = s
            .handle_input(KeyCode::Char('r'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert_eq!(status.as_deref(), Some("Only documents can be renamed"));
        assert!(!s.rename_dialog_open());
    }

    #[tokio::test]
    async fn test_rename_dialog_opens_prefilled_for_file() {
        let mut s = screen();
        s.sidebar.set_documents(&["doc.txt"]);
        s.handle_input(KeyCode::Char('r'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert!(s.rename_dialog_open());
        assert_eq!(s.rename_input.as_ref().unwrap().value(), "doc.txt");

        // Esc cancels without touching the backend.
        let status = s.handle_input(KeyCode::Esc, KeyModifiers::NONE).await.unwrap();
        assert_eq!(status.as_deref(), Some("Rename cancelled"));
        assert!(!s.rename_dialog_open());
    }

    #[tokio::test]
    async fn test_rename_keeps_unsaved_edit_when_save_fails() {
        let mut s = screen();
        s.sidebar.set_documents(&["doc.txt"]);
        s.editor.open("doc.txt".to_string(), String::new());
        s.editor.handle_input(KeyCode::Char('x'), KeyModifiers::NONE);

        s.handle_input(KeyCode::Char('r'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert!(s.rename_dialog_open());

        // Disconnected manager: the pending-save flush fails before the
        // rename is issued, and the editor keeps the edit instead of
        // being closed over it.
        let result = s.handle_input(KeyCode::Enter, KeyModifiers::NONE).await;
        assert!(result.is_err());
        assert!(s.editor.is_open());
        assert!(s.editor.is_dirty());
        assert_eq!(s.editor.content(), "x");
    }

    #[tokio::test]
    async fn test_flush_pending_save_surfaces_failure() {
        let mut s = screen();
        s.editor.open("doc.txt".to_string(), String::new());
        s.editor.handle_input(KeyCode::Char('x'), KeyModifiers::NONE);

        // Disconnected manager: the flush fails loudly and the edit stays
        // pending for a retry.
        assert!(s.flush_pending_save().await.is_err());
        assert!(s.editor.is_dirty());
    }

    #[tokio::test]
    async fn test_enter_on_folder_expands_without_backend() {
        let mut s = screen();
        s.sidebar.set_documents(&["a/b.txt"]);
        assert_eq!(s.sidebar.rows().len(), 1);
        s.handle_input(KeyCode::Enter, KeyModifiers::NONE).await.unwrap();
        assert_eq!(s.sidebar.rows().len(), 2);
    }
}
