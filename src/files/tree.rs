//! Builds the sidebar document tree from the flat path list returned by
//! `GET /documents`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

/// One file or folder in the document hierarchy.
///
/// `name` is the full cumulative path from the root and serves as the node's
/// stable identity; `relative_name` is the last path segment shown as the
/// display label. `children` is `Some` for folders (possibly empty) and
/// `None` for files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub relative_name: String,
    pub kind: NodeKind,
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    fn new(name: String, relative_name: String, kind: NodeKind) -> Self {
        let children = match kind {
            NodeKind::Folder => Some(Vec::new()),
            NodeKind::File => None,
        };
        Self {
            name,
            relative_name,
            kind,
            children,
        }
    }
}

/// Convert flat slash-delimited paths into a nested forest.
///
/// Sibling order is first-seen input order; no sorting is applied. Shared
/// path prefixes are deduplicated, and duplicate identical paths collapse
/// into one leaf. When a final segment collides with an existing node the
/// existing node is reused unchanged; when a non-final segment collides with
/// a file node, that node is promoted to a folder so deeper paths always
/// have a place to attach.
pub fn build_tree<S: AsRef<str>>(paths: &[S]) -> Vec<TreeNode> {
    let mut root: Vec<TreeNode> = Vec::new();

    for path in paths {
        let parts: Vec<&str> = path.as_ref().split('/').collect();
        let mut current_level = &mut root;

        let mut resolved_path = String::new();
        for (i, part) in parts.iter().enumerate() {
            let is_leaf = i == parts.len() - 1;

            if !resolved_path.is_empty() {
                resolved_path.push('/');
            }
            resolved_path.push_str(part);

            let position = current_level
                .iter()
                .position(|node| node.name == resolved_path);

            let index = match position {
                Some(index) => index,
                None => {
                    let kind = if is_leaf {
                        NodeKind::File
                    } else {
                        NodeKind::Folder
                    };
                    current_level.push(TreeNode::new(
                        resolved_path.clone(),
                        (*part).to_string(),
                        kind,
                    ));
                    current_level.len() - 1
                }
            };

            if !is_leaf {
                let node = &mut current_level[index];
                if node.children.is_none() {
                    // File/folder conflict: a deeper path needs this node as
                    // an ancestor, so promote it to a folder.
                    node.kind = NodeKind::Folder;
                }
                current_level = node.children.get_or_insert_with(Vec::new);
            }
        }
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_returns_empty_forest() {
        let forest = build_tree::<&str>(&[]);
        assert!(forest.is_empty());
    }

    #[test]
    fn test_single_file_at_root() {
        let forest = build_tree(&["a.txt"]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "a.txt");
        assert_eq!(forest[0].relative_name, "a.txt");
        assert_eq!(forest[0].kind, NodeKind::File);
        assert!(forest[0].children.is_none());
    }

    #[test]
    fn test_two_files_share_one_folder() {
        let forest = build_tree(&["a/b.txt", "a/c.txt"]);
        assert_eq!(forest.len(), 1);

        let folder = &forest[0];
        assert_eq!(folder.name, "a");
        assert_eq!(folder.kind, NodeKind::Folder);

        let children = folder.children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "a/b.txt");
        assert_eq!(children[1].name, "a/c.txt");
        assert_eq!(children[0].relative_name, "b.txt");
        assert_eq!(children[1].relative_name, "c.txt");
    }

    #[test]
    fn test_deep_path_builds_single_chain() {
        let forest = build_tree(&["x/y/z.txt"]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "x");
        assert_eq!(forest[0].kind, NodeKind::Folder);

        let y = &forest[0].children.as_ref().unwrap()[0];
        assert_eq!(y.name, "x/y");
        assert_eq!(y.kind, NodeKind::Folder);

        let z = &y.children.as_ref().unwrap()[0];
        assert_eq!(z.name, "x/y/z.txt");
        assert_eq!(z.relative_name, "z.txt");
        assert_eq!(z.kind, NodeKind::File);
        assert!(z.children.is_none());
    }

    #[test]
    fn test_sibling_order_is_first_seen() {
        let forest = build_tree(&["b.txt", "a/x.txt", "a.txt"]);
        let names: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a", "a.txt"]);
    }

    #[test]
    fn test_idempotent_across_calls() {
        let paths = ["a/b.txt", "a/c/d.txt", "e.txt"];
        let first = build_tree(&paths);
        let second = build_tree(&paths);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_paths_collapse() {
        let forest = build_tree(&["a/b.txt", "a/b.txt"]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_file_promoted_to_folder_on_deeper_path() {
        // "a" arrives first as a leaf, then "a/b" needs it as an ancestor.
        let forest = build_tree(&["a", "a/b"]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "a");
        assert_eq!(forest[0].kind, NodeKind::Folder);

        let children = forest[0].children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "a/b");
        assert_eq!(children[0].kind, NodeKind::File);
    }

    #[test]
    fn test_leaf_colliding_with_folder_reuses_it() {
        // "a" as a final segment after "a/b" created the folder: the folder
        // node is reused unchanged, no duplicate sibling appears.
        let forest = build_tree(&["a/b", "a"]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].kind, NodeKind::Folder);
        assert_eq!(forest[0].children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_segment_is_kept_not_panicked() {
        let forest = build_tree(&["a//b"]);
        assert_eq!(forest.len(), 1);

        let middle = &forest[0].children.as_ref().unwrap()[0];
        assert_eq!(middle.name, "a/");
        assert_eq!(middle.relative_name, "");
        assert_eq!(middle.kind, NodeKind::Folder);
    }
}
