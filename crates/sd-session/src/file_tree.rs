//! Routine file tree with single selection.

use sd_core::TreePath;
use serde::{Deserialize, Serialize};

use crate::{SessionError, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Folder,
    /// Python script that can be added to the routine list.
    Routine,
    /// Any other file a routine depends on.
    Support,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub path: TreePath,
    pub kind: NodeKind,
    /// Only folders have children; the tree owns them strictly.
    pub children: Vec<TreeNode>,
    pub expanded: bool,
}

impl TreeNode {
    fn new(path: TreePath, kind: NodeKind) -> Self {
        Self {
            path,
            kind,
            children: Vec::new(),
            expanded: false,
        }
    }

    pub fn name(&self) -> &str {
        self.path.name().unwrap_or_default()
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRow {
    pub path: TreePath,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub expanded: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeButtons {
    pub remove: bool,
    pub unselect: bool,
}

/// File tree. At most one node is selected at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
    selected: Option<TreePath>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, path: &TreePath) -> Option<&TreeNode> {
        let mut level = &self.nodes;
        let mut found = None;
        for depth in 1..=path.depth() {
            let node = level
                .iter()
                .find(|n| n.path.segments() == &path.segments()[..depth])?;
            level = &node.children;
            found = Some(node);
        }
        found
    }

    fn find_mut(&mut self, path: &TreePath) -> Option<&mut TreeNode> {
        let mut level = &mut self.nodes;
        for depth in 1..=path.depth() {
            let node = level
                .iter_mut()
                .find(|n| n.path.segments() == &path.segments()[..depth])?;
            if depth == path.depth() {
                return Some(node);
            }
            level = &mut node.children;
        }
        None
    }

    fn children_mut(&mut self, folder: &TreePath, expand: bool) -> SessionResult<&mut Vec<TreeNode>> {
        if folder.is_root() {
            return Ok(&mut self.nodes);
        }
        let node = self
            .find_mut(folder)
            .ok_or_else(|| SessionError::UnknownPath(folder.clone()))?;
        if !node.is_folder() {
            return Err(SessionError::NotAFolder(folder.clone()));
        }
        node.expanded |= expand;
        Ok(&mut node.children)
    }

    pub fn selected(&self) -> Option<&TreePath> {
        self.selected.as_ref()
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selected.as_ref().and_then(|p| self.find(p))
    }

    /// Name of the selected routine file, if a routine file is selected.
    pub fn selected_routine(&self) -> Option<&str> {
        self.selected_node()
            .filter(|n| n.kind == NodeKind::Routine)
            .map(TreeNode::name)
    }

    /// Content of the path field.
    pub fn path_field(&self) -> String {
        self.selected
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Folder new nodes are created under: the selected folder, the folder of
    /// the selected file, or the root.
    pub fn target_folder(&self) -> TreePath {
        match self.selected_node() {
            Some(node) if node.is_folder() => node.path.clone(),
            Some(node) => node.path.parent().unwrap_or_default(),
            None => TreePath::root(),
        }
    }

    /// Click on a node. Clicking the already selected folder toggles it open
    /// or closed instead.
    pub fn select(&mut self, path: &TreePath) -> SessionResult<()> {
        let already = self.selected.as_ref() == Some(path);
        let node = self
            .find_mut(path)
            .ok_or_else(|| SessionError::UnknownPath(path.clone()))?;
        if already && node.is_folder() {
            node.expanded = !node.expanded;
        }
        self.selected = Some(path.clone());
        Ok(())
    }

    /// Escape or the unselect button.
    pub fn unselect(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn buttons(&self) -> TreeButtons {
        let any = self.selected.is_some();
        TreeButtons {
            remove: any,
            unselect: any,
        }
    }

    /// Check a new folder name before the request goes out. Returns the path
    /// the folder will get.
    pub fn validate_new_folder(&self, name: &str) -> SessionResult<TreePath> {
        if name.trim().is_empty() {
            return Err(SessionError::EmptyName {
                what: "folder name",
            });
        }
        let path = self.target_folder().join(name)?;
        if self.find(&path).is_some() {
            return Err(SessionError::DuplicateNode(path));
        }
        Ok(path)
    }

    pub fn add_folder(&mut self, parent: &TreePath, name: &str) -> SessionResult<TreePath> {
        self.insert(parent, name, NodeKind::Folder)
    }

    pub fn add_file(&mut self, parent: &TreePath, name: &str, routine: bool) -> SessionResult<TreePath> {
        let kind = if routine {
            NodeKind::Routine
        } else {
            NodeKind::Support
        };
        self.insert(parent, name, kind)
    }

    fn insert(&mut self, parent: &TreePath, name: &str, kind: NodeKind) -> SessionResult<TreePath> {
        let path = parent.join(name)?;
        if self.find(&path).is_some() {
            return Err(SessionError::DuplicateNode(path));
        }
        self.children_mut(parent, true)?
            .push(TreeNode::new(path.clone(), kind));
        Ok(path)
    }

    /// Remove a node and its subtree. Clears the selection if it was inside.
    pub fn remove(&mut self, path: &TreePath) -> SessionResult<TreeNode> {
        let parent = path
            .parent()
            .ok_or_else(|| SessionError::UnknownPath(path.clone()))?;
        let siblings = self.children_mut(&parent, false)?;
        let index = siblings
            .iter()
            .position(|n| &n.path == path)
            .ok_or_else(|| SessionError::UnknownPath(path.clone()))?;
        let node = siblings.remove(index);

        if self.selected.as_ref().is_some_and(|s| s.starts_with(path)) {
            self.selected = None;
        }
        Ok(node)
    }

    /// Rows of every node whose ancestors are all expanded.
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(&self.nodes, &mut rows);
        rows
    }

    fn push_rows(&self, nodes: &[TreeNode], rows: &mut Vec<TreeRow>) {
        for node in nodes {
            rows.push(TreeRow {
                path: node.path.clone(),
                name: node.name().to_string(),
                kind: node.kind,
                depth: node.path.depth() - 1,
                expanded: node.expanded,
                selected: self.selected.as_ref() == Some(&node.path),
            });
            if node.expanded {
                self.push_rows(&node.children, rows);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> TreePath {
        TreePath::parse(raw).unwrap()
    }

    fn tree() -> FileTree {
        let mut t = FileTree::new();
        t.add_folder(&TreePath::root(), "lab").unwrap();
        t.add_folder(&path("lab"), "optics").unwrap();
        t.add_file(&path("lab/optics"), "fit.py", true).unwrap();
        t.add_file(&path("lab"), "calib.csv", false).unwrap();
        t
    }

    #[test]
    fn single_selection() {
        let mut t = tree();
        assert_eq!(t.buttons(), TreeButtons::default());

        t.select(&path("lab/optics")).unwrap();
        t.select(&path("lab/optics/fit.py")).unwrap();
        assert_eq!(t.selected(), Some(&path("lab/optics/fit.py")));
        assert_eq!(t.rows().iter().filter(|r| r.selected).count(), 1);
        assert_eq!(t.selected_routine(), Some("fit.py"));
        assert_eq!(t.path_field(), "lab/optics/fit.py");
        assert!(t.buttons().remove);

        assert!(t.unselect());
        assert!(!t.unselect());
        assert_eq!(t.path_field(), "");
    }

    #[test]
    fn reselecting_a_folder_toggles_it() {
        let mut t = tree();
        let lab = path("lab");
        assert!(t.find(&lab).unwrap().expanded);

        t.select(&lab).unwrap();
        assert!(t.find(&lab).unwrap().expanded);
        t.select(&lab).unwrap();
        assert!(!t.find(&lab).unwrap().expanded);
        assert_eq!(t.rows().len(), 1);
    }

    #[test]
    fn target_folder_follows_selection() {
        let mut t = tree();
        assert_eq!(t.target_folder(), TreePath::root());
        t.select(&path("lab/optics/fit.py")).unwrap();
        assert_eq!(t.target_folder(), path("lab/optics"));
        t.select(&path("lab")).unwrap();
        assert_eq!(t.target_folder(), path("lab"));
    }

    #[test]
    fn new_folder_validation() {
        let mut t = tree();
        assert_eq!(
            t.validate_new_folder("  "),
            Err(SessionError::EmptyName {
                what: "folder name"
            })
        );
        t.select(&path("lab")).unwrap();
        assert_eq!(
            t.validate_new_folder("optics"),
            Err(SessionError::DuplicateNode(path("lab/optics")))
        );
        assert_eq!(t.validate_new_folder("laser"), Ok(path("lab/laser")));
    }

    #[test]
    fn adding_to_collapsed_folder_expands_it() {
        let mut t = tree();
        t.select(&path("lab")).unwrap();
        t.select(&path("lab")).unwrap();
        assert!(!t.find(&path("lab")).unwrap().expanded);

        t.add_file(&path("lab"), "scan.py", true).unwrap();
        assert!(t.find(&path("lab")).unwrap().expanded);
        assert_eq!(
            t.add_file(&path("lab/calib.csv"), "x.py", true),
            Err(SessionError::NotAFolder(path("lab/calib.csv")))
        );
    }

    #[test]
    fn removing_a_folder_drops_subtree_and_selection() {
        let mut t = tree();
        t.select(&path("lab/optics/fit.py")).unwrap();
        let removed = t.remove(&path("lab/optics")).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert_eq!(t.selected(), None);
        assert!(t.find(&path("lab/optics/fit.py")).is_none());
        assert_eq!(
            t.remove(&path("lab/optics")),
            Err(SessionError::UnknownPath(path("lab/optics")))
        );
    }

    #[test]
    fn rows_are_depth_first() {
        let t = tree();
        let names: Vec<_> = t.rows().into_iter().map(|r| (r.name, r.depth)).collect();
        assert_eq!(
            names,
            vec![
                ("lab".to_string(), 0),
                ("optics".to_string(), 1),
                ("fit.py".to_string(), 2),
                ("calib.csv".to_string(), 1),
            ]
        );
    }
}
