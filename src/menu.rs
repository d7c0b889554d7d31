use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::client::ConnectionStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum MenuType {
    File,
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewProject,
    RefreshDocuments,
    Upload,
    Exit,
    ViewProject,
    ViewChat,
    ViewLogs,
    ViewHelp,
}

pub struct MenuRenderer {
    pub active_menu: Option<MenuType>,
    pub connection_status: ConnectionStatus,
}

impl MenuRenderer {
    pub fn new() -> Self {
        Self {
            active_menu: None,
            connection_status: ConnectionStatus::Disconnected,
        }
    }

    pub fn render_menu_bar(&self, f: &mut Frame, area: Rect) {
        let mut menu_items = vec![];

        let file_style = if self.active_menu == Some(MenuType::File) {
            Style::default().fg(Color::White).bg(Color::Blue)
        } else {
            Style::default().fg(Color::Black).bg(Color::Gray)
        };
        menu_items.push(Span::styled(" File ", file_style));
        menu_items.push(Span::raw("  "));

        // View menu only makes sense once connected
        let view_style = if self.connection_status == ConnectionStatus::Connected {
            if self.active_menu == Some(MenuType::View) {
                Style::default().fg(Color::White).bg(Color::Blue)
            } else {
                Style::default().fg(Color::Black).bg(Color::Gray)
            }
        } else {
            Style::default().fg(Color::DarkGray).bg(Color::Gray)
        };
        menu_items.push(Span::styled(" View ", view_style));

        let menu = Paragraph::new(Line::from(menu_items))
            .style(Style::default().bg(Color::Blue).fg(Color::White));
        f.render_widget(menu, area);
    }

    pub fn render_dropdown_menu(&self, f: &mut Frame, menu_type: MenuType) {
        match menu_type {
            MenuType::File => {
                let dropdown_area = Rect {
                    x: 1,
                    y: 1,
                    width: 28,
                    height: 7,
                };

                let menu_items = [
                    "New Project...      Ctrl+N",
                    "Refresh Documents   F5",
                    "Upload...           Ctrl+U",
                    "──────────────────────────",
                    "Exit                Alt+X",
                ];

                let dropdown = Paragraph::new(menu_items.join("\n"))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(Color::Yellow)),
                    )
                    .style(Style::default().bg(Color::White).fg(Color::Black));

                f.render_widget(Clear, dropdown_area);
                f.render_widget(dropdown, dropdown_area);
            }
            MenuType::View => {
                let dropdown_area = Rect {
                    x: 9,
                    y: 1,
                    width: 22,
                    height: 6,
                };

                let menu_items = [
                    "Project       F2",
                    "Chat          F3",
                    "Logs          F4",
                    "Help          F1",
                ];

                let dropdown = Paragraph::new(menu_items.join("\n"))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(Color::Yellow)),
                    )
                    .style(Style::default().bg(Color::White).fg(Color::Black));

                f.render_widget(Clear, dropdown_area);
                f.render_widget(dropdown, dropdown_area);
            }
        }
    }

    /// Toggle a menu open/closed from a click on the menu bar row.
    pub fn handle_menu_click(&mut self, column: u16) -> Option<MenuType> {
        // Menu positions: File (1-6), View (8-13)
        if (1..=6).contains(&column) {
            if self.active_menu == Some(MenuType::File) {
                self.active_menu = None;
            } else {
                self.active_menu = Some(MenuType::File);
            }
            Some(MenuType::File)
        } else if (8..=13).contains(&column)
            && self.connection_status == ConnectionStatus::Connected
        {
            if self.active_menu == Some(MenuType::View) {
                self.active_menu = None;
            } else {
                self.active_menu = Some(MenuType::View);
            }
            Some(MenuType::View)
        } else {
            self.active_menu = None;
            None
        }
    }

    /// Map a click inside an open dropdown to its action. Row 0 is the
    /// dropdown's top border.
    pub fn handle_dropdown_click(&self, row_in_dropdown: u16) -> Option<MenuAction> {
        match self.active_menu {
            Some(MenuType::File) => match row_in_dropdown {
                1 => Some(MenuAction::NewProject),
                2 => Some(MenuAction::RefreshDocuments),
                3 => Some(MenuAction::Upload),
                5 => Some(MenuAction::Exit),
                _ => None,
            },
            Some(MenuType::View) => match row_in_dropdown {
                1 => Some(MenuAction::ViewProject),
                2 => Some(MenuAction::ViewChat),
                3 => Some(MenuAction::ViewLogs),
                4 => Some(MenuAction::ViewHelp),
                _ => None,
            },
            None => None,
        }
    }

    pub fn close_menu(&mut self) {
        self.active_menu = None;
    }

    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
    }

    pub fn get_active_menu(&self) -> Option<MenuType> {
        self.active_menu.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_toggles_file_menu() {
        let mut menu = MenuRenderer::new();
        assert_eq!(menu.handle_menu_click(2), Some(MenuType::File));
        assert_eq!(menu.get_active_menu(), Some(MenuType::File));
        menu.handle_menu_click(2);
        assert_eq!(menu.get_active_menu(), None);
    }

    #[test]
    fn test_view_menu_requires_connection() {
        let mut menu = MenuRenderer::new();
        assert_eq!(menu.handle_menu_click(9), None);

        menu.set_connection_status(ConnectionStatus::Connected);
        assert_eq!(menu.handle_menu_click(9), Some(MenuType::View));
    }

    #[test]
    fn test_dropdown_click_maps_rows_to_actions() {
        let mut menu = MenuRenderer::new();
        menu.active_menu = Some(MenuType::File);
        assert_eq!(menu.handle_dropdown_click(1), Some(MenuAction::NewProject));
        assert_eq!(menu.handle_dropdown_click(3), Some(MenuAction::Upload));
        assert_eq!(menu.handle_dropdown_click(4), None); // separator
        assert_eq!(menu.handle_dropdown_click(5), Some(MenuAction::Exit));
    }

    #[test]
    fn test_click_elsewhere_closes_menu() {
        let mut menu = MenuRenderer::new();
        menu.handle_menu_click(2);
        assert_eq!(menu.handle_menu_click(40), None);
        assert_eq!(menu.get_active_menu(), None);
    }
}
