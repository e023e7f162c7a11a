//! SceneGraph: owns a document's shape tree and batches what changed.

use rmdraw_core::Rect;

use crate::property::PropertyChange;
use crate::shape::ShapeTree;

/// Changes and the repaint region gathered since the last flush.
#[derive(Debug, Default)]
pub struct SceneUpdate {
    pub changes: Vec<PropertyChange>,
    pub repaint: Option<Rect>,
    /// A full repaint was requested.
    pub repaint_all: bool,
}

impl SceneUpdate {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.repaint.is_none() && !self.repaint_all
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    tree: ShapeTree,
    repaint: Option<Rect>,
    repaint_all: bool,
}

impl SceneGraph {
    pub fn new(tree: ShapeTree) -> Self {
        Self {
            tree,
            repaint: None,
            repaint_all: false,
        }
    }

    pub fn tree(&self) -> &ShapeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ShapeTree {
        &mut self.tree
    }

    /// Queue a repaint of `region` in root coordinates, or of everything.
    pub fn request_repaint(&mut self, region: Option<Rect>) {
        match region {
            Some(r) => {
                self.repaint = Some(match self.repaint {
                    Some(cur) => cur.union(&r),
                    None => r,
                })
            }
            None => self.repaint_all = true,
        }
    }

    /// Collect recorded changes and pending repaint requests.
    pub fn flush(&mut self) -> SceneUpdate {
        let changes = self.tree.take_changes();
        let mut repaint = self.repaint.take();
        if let Some(dirty) = self.tree.take_dirty() {
            repaint = Some(match repaint {
                Some(r) => r.union(&dirty),
                None => dirty,
            });
        }
        SceneUpdate {
            changes,
            repaint,
            repaint_all: std::mem::take(&mut self.repaint_all),
        }
    }

    pub fn into_tree(self) -> ShapeTree {
        self.tree
    }
}
