use std::collections::HashSet;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::files::tree::{build_tree, NodeKind, TreeNode};

/// One visible row of the document tree, flattened for list rendering and
/// keyboard navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarRow {
    pub name: String,
    pub relative_name: String,
    pub kind: NodeKind,
    pub level: usize,
    pub expanded: bool,
    pub has_children: bool,
}

/// Flatten the forest into the rows currently visible: a folder's children
/// appear only while its full path is in `expanded`.
pub fn visible_rows(forest: &[TreeNode], expanded: &HashSet<String>) -> Vec<SidebarRow> {
    let mut rows = Vec::new();
    collect_rows(forest, expanded, 0, &mut rows);
    rows
}

fn collect_rows(
    nodes: &[TreeNode],
    expanded: &HashSet<String>,
    level: usize,
    rows: &mut Vec<SidebarRow>,
) {
    for node in nodes {
        let is_expanded = expanded.contains(&node.name);
        let has_children = node
            .children
            .as_ref()
            .is_some_and(|children| !children.is_empty());
        rows.push(SidebarRow {
            name: node.name.clone(),
            relative_name: node.relative_name.clone(),
            kind: node.kind,
            level,
            expanded: is_expanded,
            has_children,
        });
        if is_expanded {
            if let Some(children) = &node.children {
                collect_rows(children, expanded, level + 1, rows);
            }
        }
    }
}

pub struct Sidebar {
    forest: Vec<TreeNode>,
    expanded: HashSet<String>,
    pub selected_index: usize,
    pub scroll_offset: usize,
}

impl Sidebar {
    pub fn new() -> Self {
        Self {
            forest: Vec::new(),
            expanded: HashSet::new(),
            selected_index: 0,
            scroll_offset: 0,
        }
    }

    /// Rebuild the tree from a fresh document listing. Expansion state and
    /// the selection survive a refresh where the paths still exist.
    pub fn set_documents<S: AsRef<str>>(&mut self, keys: &[S]) {
        self.forest = build_tree(keys);

        let mut folders = HashSet::new();
        collect_folder_paths(&self.forest, &mut folders);
        self.expanded.retain(|path| folders.contains(path));

        let count = self.rows().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    pub fn rows(&self) -> Vec<SidebarRow> {
        visible_rows(&self.forest, &self.expanded)
    }

    pub fn selected_row(&self) -> Option<SidebarRow> {
        self.rows().into_iter().nth(self.selected_index)
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_down(&mut self) {
        let count = self.rows().len();
        if self.selected_index + 1 < count {
            self.selected_index += 1;
        }
    }

    /// Toggle the selected folder open or closed. Files are left to the
    /// caller, which opens them in the editor.
    pub fn toggle_expand(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.kind != NodeKind::Folder {
            return;
        }
        if !self.expanded.remove(&row.name) {
            self.expanded.insert(row.name);
        }
    }

    fn adjust_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index + 1 - visible_height;
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, focused: bool) {
        let visible_height = area.height.saturating_sub(2) as usize;
        self.adjust_scroll(visible_height);

        let rows = self.rows();
        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible_height)
            .map(|(i, row)| {
                let indent = "  ".repeat(row.level);
                let marker = match row.kind {
                    NodeKind::Folder if row.expanded => "▼ ",
                    NodeKind::Folder => "▶ ",
                    NodeKind::File => "  ",
                };
                let style = if i == self.selected_index {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else if row.kind == NodeKind::Folder {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{indent}{marker}{}", row.relative_name),
                    style,
                )))
            })
            .collect();

        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Documents"),
        );
        f.render_widget(list, area);
    }
}

fn collect_folder_paths(nodes: &[TreeNode], out: &mut HashSet<String>) {
    for node in nodes {
        if let Some(children) = &node.children {
            out.insert(node.name.clone());
            collect_folder_paths(children, out);
        }
    }
}
