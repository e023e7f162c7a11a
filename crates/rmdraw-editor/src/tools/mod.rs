//! Pointer tools.
//!
//! The editor owns one instance of each tool and forwards pointer events to
//! the current one. Tools keep only gesture state; everything they change
//! goes through the editor so it lands in the undo transaction.

mod polygon;
mod select;
mod shape;

pub use polygon::PolygonTool;
pub use select::{DragMode, SelectTool};
pub use shape::ShapeTool;

use serde::{Deserialize, Serialize};

use crate::editor::Editor;
use crate::error::EditorResult;
use crate::input::PointerEvent;
use crate::shape::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Oval,
    Line,
    Text,
    Polygon,
}

impl ToolKind {
    /// Node kind a creation tool makes.
    pub fn node_kind(self) -> Option<NodeKind> {
        match self {
            ToolKind::Select => None,
            ToolKind::Rectangle => Some(NodeKind::Rectangle),
            ToolKind::Oval => Some(NodeKind::Oval),
            ToolKind::Line => Some(NodeKind::Line),
            ToolKind::Text => Some(NodeKind::Text),
            ToolKind::Polygon => Some(NodeKind::Polygon),
        }
    }
}

pub trait Tool {
    fn mouse_pressed(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()>;

    fn mouse_dragged(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()>;

    fn mouse_released(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()>;

    fn mouse_moved(&mut self, _editor: &mut Editor, _event: &PointerEvent) -> EditorResult<()> {
        Ok(())
    }

    /// Abandon any gesture in progress.
    fn reset(&mut self) {}
}

#[derive(Debug, Default)]
pub struct Tools {
    pub(crate) current: ToolKind,
    pub(crate) select: SelectTool,
    pub(crate) shape: ShapeTool,
    pub(crate) polygon: PolygonTool,
}

impl Tools {
    pub(crate) fn current_mut(&mut self) -> &mut dyn Tool {
        match self.current {
            ToolKind::Select => &mut self.select,
            ToolKind::Polygon => &mut self.polygon,
            _ => &mut self.shape,
        }
    }

    pub(crate) fn switch_to(&mut self, kind: ToolKind) {
        self.current = kind;
        if let Some(node_kind) = kind.node_kind() {
            self.shape.set_kind(node_kind);
        }
    }

    pub(crate) fn reset_all(&mut self) {
        self.select.reset();
        self.shape.reset();
        self.polygon.reset();
    }
}
