//! Selection and super-selection state.

use rmdraw_core::NodeId;

use crate::error::{EditorError, EditorResult};
use crate::shape::ShapeTree;
use crate::undo::SelectionMemo;

/// What is selected and which container edits apply to.
///
/// `path` runs from the document root to the super-selected node; every
/// entry is the parent of the next. `selected` holds children of the last
/// path entry, without duplicates, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub(crate) selected: Vec<NodeId>,
    pub(crate) path: Vec<NodeId>,
}

impl SelectionState {
    /// Root and active page super-selected, nothing selected.
    pub fn new(tree: &ShapeTree) -> Self {
        let root = tree.root();
        let page = tree.active_page();
        let path = if page == root { vec![root] } else { vec![root, page] };
        Self {
            selected: Vec::new(),
            path,
        }
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn super_selection_path(&self) -> &[NodeId] {
        &self.path
    }

    /// Deepest super-selected node.
    pub fn super_selected(&self) -> NodeId {
        self.path.last().copied().unwrap_or_default()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_super_selected(&self, id: NodeId) -> bool {
        self.path.contains(&id)
    }

    /// Selected nodes, or the super-selected node when nothing is selected.
    pub fn selected_or_super_selected(&self) -> Vec<NodeId> {
        if self.selected.is_empty() {
            vec![self.super_selected()]
        } else {
            self.selected.clone()
        }
    }

    pub fn memo(&self) -> SelectionMemo {
        if self.selected.is_empty() {
            SelectionMemo::SuperSelected(self.super_selected())
        } else {
            SelectionMemo::Selected(self.selected.clone())
        }
    }

    /// Check the path and selection invariants against the tree.
    pub fn validate(&self, tree: &ShapeTree) -> EditorResult<()> {
        let fail = |msg: String| Err(EditorError::InconsistentSelection(msg));
        match self.path.first() {
            Some(first) if *first == tree.root() => {}
            Some(first) => return fail(format!("path starts at {} instead of the root", first)),
            None => return fail("empty super-selection path".to_string()),
        }
        for pair in self.path.windows(2) {
            if tree.parent(pair[1]) != Some(pair[0]) {
                return fail(format!("{} is not a child of {}", pair[1], pair[0]));
            }
        }
        let last = self.super_selected();
        for (i, id) in self.selected.iter().enumerate() {
            if tree.parent(*id) != Some(last) {
                return fail(format!("selected {} is not a child of {}", id, last));
            }
            if self.selected[..i].contains(id) {
                return fail(format!("{} selected twice", id));
            }
        }
        Ok(())
    }
}
