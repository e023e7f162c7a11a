//! Per-node-kind behavior.
//!
//! `handler_for` maps every [`NodeKind`] to a stateless handler. Handlers
//! answer hit-testing and capability questions, move resize handles, and
//! may take over a pointer gesture (the select tool then forwards drag and
//! release events to them verbatim).

use rmdraw_core::{NodeId, Point};

use crate::editor::{DropPayload, Editor};
use crate::error::TreeResult;
use crate::handles::{self, Handle};
use crate::input::{Key, KeyEvent, PointerEvent};
use crate::property::{Property, PropertyValue};
use crate::shape::{NodeKind, ShapeNode, ShapeTree};

/// Width of one character used to place the text caret.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Distance within which a point counts as on a line.
const LINE_HIT_TOLERANCE: f64 = 3.0;

pub trait NodeHandler: Sync {
    fn kind(&self) -> NodeKind;

    /// Hit test against a point in the node's local coordinates.
    fn contains_local_point(&self, tree: &ShapeTree, id: NodeId, point: Point) -> bool {
        tree.get(id)
            .is_some_and(|n| n.local_bounds().contains(&point))
    }

    fn accepts_children(&self, tree: &ShapeTree, id: NodeId) -> bool {
        tree.capabilities(id).accepts_children
    }

    fn super_selectable(&self, tree: &ShapeTree, id: NodeId) -> bool {
        tree.capabilities(id).super_selectable
    }

    fn accepts_drop(&self, tree: &ShapeTree, id: NodeId, payload: &DropPayload) -> bool {
        match payload {
            DropPayload::Color(_) => true,
            DropPayload::Text(_) | DropPayload::Image { .. } => self.accepts_children(tree, id),
        }
    }

    /// Resize handle under a root point.
    fn handle_at_point(
        &self,
        tree: &ShapeTree,
        id: NodeId,
        root_point: Point,
        handle_size: f64,
    ) -> Option<Handle> {
        handles::handle_at_point(tree, id, root_point, handle_size)
    }

    fn move_handle(
        &self,
        tree: &mut ShapeTree,
        id: NodeId,
        handle: Handle,
        root_point: Point,
    ) -> TreeResult<()> {
        handles::move_handle(tree, id, handle, root_point)
    }

    /// Returning true claims the gesture.
    fn mouse_pressed(&self, _editor: &mut Editor, _id: NodeId, _event: &PointerEvent) -> bool {
        false
    }

    fn mouse_dragged(&self, _editor: &mut Editor, _id: NodeId, _event: &PointerEvent) {}

    fn mouse_released(&self, _editor: &mut Editor, _id: NodeId, _event: &PointerEvent) {}

    /// Returning true consumes the key.
    fn key_pressed(&self, _editor: &mut Editor, _id: NodeId, _event: &KeyEvent) -> bool {
        false
    }

    fn did_become_super_selected(&self, _editor: &mut Editor, _id: NodeId) {}

    fn will_lose_super_selection(&self, _editor: &mut Editor, _id: NodeId) {}
}

struct DocumentHandler;
struct PageHandler;
struct RectangleHandler;
struct OvalHandler;
struct LineHandler;
struct PolygonHandler;
struct TextHandler;
struct ImageHandler;
struct GroupHandler;
struct SwitchHandler;

pub fn handler_for(kind: NodeKind) -> &'static dyn NodeHandler {
    match kind {
        NodeKind::Document => &DocumentHandler,
        NodeKind::Page => &PageHandler,
        NodeKind::Rectangle => &RectangleHandler,
        NodeKind::Oval => &OvalHandler,
        NodeKind::Line => &LineHandler,
        NodeKind::Polygon => &PolygonHandler,
        NodeKind::Text => &TextHandler,
        NodeKind::Image => &ImageHandler,
        NodeKind::Group => &GroupHandler,
        NodeKind::Switch => &SwitchHandler,
    }
}

impl NodeHandler for DocumentHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Document
    }

    fn contains_local_point(&self, _tree: &ShapeTree, _id: NodeId, _point: Point) -> bool {
        true
    }

    fn accepts_drop(&self, _tree: &ShapeTree, _id: NodeId, _payload: &DropPayload) -> bool {
        false
    }

    fn handle_at_point(&self, _: &ShapeTree, _: NodeId, _: Point, _: f64) -> Option<Handle> {
        None
    }
}

impl NodeHandler for PageHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Page
    }

    fn handle_at_point(&self, _: &ShapeTree, _: NodeId, _: Point, _: f64) -> Option<Handle> {
        None
    }
}

impl NodeHandler for RectangleHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Rectangle
    }
}

impl NodeHandler for OvalHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Oval
    }

    fn contains_local_point(&self, tree: &ShapeTree, id: NodeId, point: Point) -> bool {
        let Some(n) = tree.get(id) else {
            return false;
        };
        let bounds = n.local_bounds();
        let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (point.x - bounds.mid_x()) / rx;
        let ny = (point.y - bounds.mid_y()) / ry;
        nx * nx + ny * ny <= 1.0
    }
}

impl NodeHandler for LineHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Line
    }

    fn contains_local_point(&self, tree: &ShapeTree, id: NodeId, point: Point) -> bool {
        let Some(n) = tree.get(id) else {
            return false;
        };
        distance_to_segment(point, Point::ZERO, Point::new(n.width, n.height)) <= LINE_HIT_TOLERANCE
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 == 0.0 {
        return p.distance(&a);
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + ab.x * t, a.y + ab.y * t))
}

impl NodeHandler for PolygonHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Polygon
    }

    fn contains_local_point(&self, tree: &ShapeTree, id: NodeId, point: Point) -> bool {
        let Some(n) = tree.get(id) else {
            return false;
        };
        if n.points.len() < 3 {
            return n.local_bounds().contains(&point);
        }
        // even-odd rule on the denormalized vertices
        let pts: Vec<Point> = n
            .points
            .iter()
            .map(|p| Point::new(p.x * n.width, p.y * n.height))
            .collect();
        let mut inside = false;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (pi, pj) = (pts[i], pts[j]);
            if (pi.y > point.y) != (pj.y > point.y)
                && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

impl NodeHandler for ImageHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Image
    }
}

impl NodeHandler for GroupHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Group
    }

    /// A group is hit where any of its children is.
    fn contains_local_point(&self, tree: &ShapeTree, id: NodeId, point: Point) -> bool {
        tree.child_at_point(id, point).is_some()
    }
}

impl NodeHandler for SwitchHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Switch
    }
}

fn caret_for_point(node: &ShapeNode, local: Point) -> usize {
    let char_width = node.font_size * CHAR_WIDTH_FACTOR;
    let len = node.text.chars().count();
    if char_width <= 0.0 {
        return len;
    }
    ((local.x / char_width).round().max(0.0) as usize).min(len)
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

impl TextHandler {
    fn place_caret(editor: &mut Editor, id: NodeId, event: &PointerEvent) -> bool {
        let tree = editor.tree();
        let Ok(local) = tree.point_to_local(id, event.point) else {
            return false;
        };
        let Some(node) = tree.get(id) else {
            return false;
        };
        if !node.local_bounds().contains(&local) {
            return false;
        }
        let caret = caret_for_point(node, local);
        if let Err(e) = Self::set_caret(editor, id, caret) {
            tracing::warn!(node = %id, error = %e, "Failed to place text caret");
        }
        true
    }

    fn set_caret(editor: &mut Editor, id: NodeId, caret: usize) -> TreeResult<()> {
        editor
            .tree_mut()
            .set_property(id, Property::TextCaret, PropertyValue::Index(caret))?;
        Ok(())
    }

    /// Replace the text and caret, widening the frame to fit.
    fn edit(editor: &mut Editor, id: NodeId, text: String, caret: usize) -> TreeResult<()> {
        editor.begin_edit("Typing");
        let font_size = editor.tree().node(id)?.font_size;
        let needed = text.chars().count() as f64 * font_size * CHAR_WIDTH_FACTOR;
        let tree = editor.tree_mut();
        tree.set_property(id, Property::Text, PropertyValue::Text(text))?;
        tree.set_property(id, Property::TextCaret, PropertyValue::Index(caret))?;
        if tree.node(id)?.width < needed {
            tree.set_number(id, Property::Width, needed)?;
        }
        Ok(())
    }
}

impl NodeHandler for TextHandler {
    fn kind(&self) -> NodeKind {
        NodeKind::Text
    }

    /// Clicks inside a super-selected text node move the caret.
    fn mouse_pressed(&self, editor: &mut Editor, id: NodeId, event: &PointerEvent) -> bool {
        if !editor.is_super_selected(id) {
            return false;
        }
        Self::place_caret(editor, id, event)
    }

    fn mouse_dragged(&self, editor: &mut Editor, id: NodeId, event: &PointerEvent) {
        Self::place_caret(editor, id, event);
    }

    fn key_pressed(&self, editor: &mut Editor, id: NodeId, event: &KeyEvent) -> bool {
        if event.modifiers.shortcut() {
            return false;
        }
        let Some(node) = editor.tree().get(id) else {
            return false;
        };
        let mut text = node.text.clone();
        let len = text.chars().count();
        let caret = node.caret.min(len);
        let result = match event.key {
            Key::Char(c) if !c.is_control() => {
                text.insert(byte_offset(&text, caret), c);
                Self::edit(editor, id, text, caret + 1)
            }
            Key::Enter => {
                text.insert(byte_offset(&text, caret), '\n');
                Self::edit(editor, id, text, caret + 1)
            }
            Key::Backspace if caret > 0 => {
                text.remove(byte_offset(&text, caret - 1));
                Self::edit(editor, id, text, caret - 1)
            }
            Key::Delete if caret < len => {
                text.remove(byte_offset(&text, caret));
                Self::edit(editor, id, text, caret)
            }
            Key::Backspace | Key::Delete => Ok(()),
            Key::Left => Self::set_caret(editor, id, caret.saturating_sub(1)),
            Key::Right => Self::set_caret(editor, id, (caret + 1).min(len)),
            _ => return false,
        };
        if let Err(e) = result {
            tracing::warn!(node = %id, key = ?event.key, error = %e, "Text edit failed");
        }
        true
    }

    fn did_become_super_selected(&self, editor: &mut Editor, id: NodeId) {
        let len = editor.tree().get(id).map(|n| n.text.chars().count()).unwrap_or(0);
        if let Err(e) = Self::set_caret(editor, id, len) {
            tracing::warn!(node = %id, error = %e, "Failed to place text caret");
        }
    }

    /// Leaving an empty text node removes it.
    fn will_lose_super_selection(&self, editor: &mut Editor, id: NodeId) {
        let empty = editor
            .tree()
            .get(id)
            .is_some_and(|n| n.text.trim().is_empty() && n.parent().is_some());
        if empty {
            tracing::debug!(node = %id, "Removing empty text node");
            editor.join_edit("Delete Text");
            if let Err(e) = editor.tree_mut().remove_from_parent(id) {
                tracing::warn!(node = %id, error = %e, "Failed to remove empty text node");
            }
        }
    }
}
