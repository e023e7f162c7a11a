//! Drag-to-create tool for rectangles, ovals, lines and text.

use rmdraw_core::{NodeId, Point, Rect};

use super::{Tool, ToolKind};
use crate::editor::Editor;
use crate::error::EditorResult;
use crate::input::PointerEvent;
use crate::shape::NodeKind;

/// Drags shorter than this on both axes count as a click.
const CLICK_SLOP: f64 = 1.0;

#[derive(Debug)]
pub struct ShapeTool {
    kind: NodeKind,
    node: Option<NodeId>,
    container: Option<NodeId>,
    down: Point,
}

impl Default for ShapeTool {
    fn default() -> Self {
        Self {
            kind: NodeKind::Rectangle,
            node: None,
            container: None,
            down: Point::ZERO,
        }
    }
}

impl ShapeTool {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    /// Frame spanned by the press point and `cur`, both container-local.
    fn frame_to(&self, cur: Point) -> Rect {
        if self.kind == NodeKind::Line {
            // lines keep their direction in signed extents
            Rect {
                x: self.down.x,
                y: self.down.y,
                width: cur.x - self.down.x,
                height: cur.y - self.down.y,
            }
        } else {
            Rect::from_points(self.down, cur)
        }
    }
}

impl Tool for ShapeTool {
    fn mouse_pressed(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let container = editor.insertion_container();
        let local = editor.tree().point_to_local(container, event.point)?;
        editor.begin_edit(&format!("New {}", self.kind));
        let id = editor.insert_new_node(self.kind, Rect::new(local.x, local.y, 0.0, 0.0), container)?;
        self.node = Some(id);
        self.container = Some(container);
        self.down = local;
        Ok(())
    }

    fn mouse_dragged(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let (Some(id), Some(container)) = (self.node, self.container) else {
            return Ok(());
        };
        let cur = editor.tree().point_to_local(container, event.point)?;
        let frame = self.frame_to(cur);
        editor.tree_mut().set_frame(id, frame)?;
        Ok(())
    }

    fn mouse_released(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let (Some(id), Some(container)) = (self.node.take(), self.container.take()) else {
            return Ok(());
        };
        let cur = editor.tree().point_to_local(container, event.point)?;
        let mut frame = self.frame_to(cur);
        if frame.width.abs() < CLICK_SLOP && frame.height.abs() < CLICK_SLOP {
            let min = editor.config().editor.min_click_size;
            frame = Rect::new(self.down.x, self.down.y, min, min);
        }
        editor.tree_mut().set_frame(id, frame)?;
        tracing::debug!(node = %id, kind = %self.kind, "Created shape");

        if self.kind == NodeKind::Text {
            editor.set_super_selection(Some(id))?;
        } else {
            editor.set_selection(&[id])?;
        }
        editor.request_tool(ToolKind::Select);
        Ok(())
    }

    fn reset(&mut self) {
        self.node = None;
        self.container = None;
    }
}
