//! Selection tool: the press/drag/release gesture interpreter.

use rmdraw_core::{NodeId, Point, Rect};

use super::Tool;
use crate::editor::Editor;
use crate::error::EditorResult;
use crate::guides::SnapMode;
use crate::handlers::handler_for;
use crate::handles::Handle;
use crate::input::PointerEvent;
use crate::property::Property;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    None,
    Move,
    Rotate,
    Resize,
    MarqueeSelect,
    /// A node handler claimed the gesture.
    EventDispatch,
}

#[derive(Debug, Default)]
pub struct SelectTool {
    mode: DragMode,
    down: Point,
    /// Last applied pointer position, after snapping.
    last: Point,
    handle: Option<(NodeId, Handle)>,
    claimed: Option<NodeId>,
    base_selection: Vec<NodeId>,
    pending: Option<Vec<NodeId>>,
    marquee: Option<Rect>,
}

impl SelectTool {
    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// Nodes the marquee would select on release.
    pub fn pending(&self) -> Option<&[NodeId]> {
        self.pending.as_deref()
    }

    /// Marquee rectangle in the super-selected container's coordinates.
    pub fn marquee(&self) -> Option<Rect> {
        self.marquee
    }

    pub fn claimed(&self) -> Option<NodeId> {
        self.claimed
    }

    /// Handle under the point, on a selected node or on the
    /// super-selected node.
    fn find_handle(editor: &Editor, point: Point) -> Option<(NodeId, Handle)> {
        let tree = editor.tree();
        let size = editor.config().editor.handle_size;
        let super_selected = editor.super_selected();
        editor
            .selected()
            .iter()
            .copied()
            .chain(std::iter::once(super_selected))
            .filter(|id| tree.get(*id).is_some_and(|n| !n.locked))
            .find_map(|id| {
                let kind = tree.kind(id)?;
                handler_for(kind)
                    .handle_at_point(tree, id, point, size)
                    .map(|h| (id, h))
            })
    }

    fn offer_takeover(&mut self, editor: &mut Editor, id: NodeId, event: &PointerEvent) -> bool {
        let Some(kind) = editor.tree().kind(id) else {
            return false;
        };
        if handler_for(kind).mouse_pressed(editor, id, event) {
            tracing::debug!(node = %id, kind = %kind, "Gesture claimed by node handler");
            self.claimed = Some(id);
            self.mode = DragMode::EventDispatch;
            return true;
        }
        false
    }

    fn toggle(editor: &mut Editor, hit: NodeId) -> EditorResult<()> {
        let container = editor.super_selected();
        if editor.tree().parent(hit) != Some(container) {
            return editor.set_selection(&[hit]);
        }
        let mut nodes = editor.selected().to_vec();
        match nodes.iter().position(|n| *n == hit) {
            Some(pos) => {
                nodes.remove(pos);
            }
            None => nodes.push(hit),
        }
        if nodes.is_empty() {
            editor.set_super_selection(Some(container))
        } else {
            editor.set_selection(&nodes)
        }
    }

    fn unlocked_selection(editor: &Editor) -> Vec<NodeId> {
        editor
            .selected()
            .iter()
            .copied()
            .filter(|id| editor.tree().get(*id).is_some_and(|n| !n.locked))
            .collect()
    }

    fn drag_move(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let nodes = Self::unlocked_selection(editor);
        if nodes.is_empty() {
            return Ok(());
        }
        let container = editor.super_selected();
        let to_local = editor.tree().transform_from_root(container)?;
        let cur = to_local.apply(event.point);
        let last = to_local.apply(self.last);
        editor.offset_nodes(&nodes, cur.x - last.x, cur.y - last.y)?;

        // correct toward the snapped position without reapplying the raw delta
        let snapped = editor.snapped_drag_point(event.point, SnapMode::Move, event.modifiers);
        let correction = to_local.apply(snapped) - cur;
        if correction != Point::ZERO {
            editor.offset_nodes(&nodes, correction.x, correction.y)?;
        }
        tracing::trace!(x = snapped.x, y = snapped.y, "Move drag");
        self.last = snapped;
        editor.update_guides(SnapMode::Move, snapped);
        Ok(())
    }

    fn drag_rotate(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let delta = event.point.y - self.last.y;
        for id in Self::unlocked_selection(editor) {
            let roll = editor.tree().node(id)?.roll;
            editor.tree_mut().set_number(id, Property::Roll, roll + delta)?;
        }
        self.last = event.point;
        Ok(())
    }

    fn drag_resize(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let Some((owner, handle)) = self.handle else {
            return Ok(());
        };
        let Some(kind) = editor.tree().kind(owner) else {
            return Ok(());
        };
        let point = editor.snapped_drag_point(event.point, SnapMode::Resize, event.modifiers);
        handler_for(kind).move_handle(editor.tree_mut(), owner, handle, point)?;
        tracing::trace!(node = %owner, handle = ?handle, "Resize drag");
        self.last = point;
        editor.update_guides(SnapMode::Resize, point);
        Ok(())
    }

    fn drag_marquee(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let container = editor.super_selected();
        let tree = editor.tree();
        let to_local = tree.transform_from_root(container)?;
        let rect = Rect::from_points(to_local.apply(self.down), to_local.apply(event.point));
        let hits = tree.children_intersecting(container, &rect);
        let pending = if event.modifiers.shift {
            let mut out: Vec<NodeId> = self
                .base_selection
                .iter()
                .copied()
                .filter(|id| !hits.contains(id))
                .collect();
            out.extend(hits.iter().filter(|id| !self.base_selection.contains(id)));
            out
        } else {
            hits
        };
        self.pending = Some(pending);
        self.marquee = Some(rect);
        editor.request_repaint(None);
        Ok(())
    }
}

impl Tool for SelectTool {
    fn mouse_pressed(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        self.reset();
        self.down = event.point;
        self.last = event.point;

        if let Some((owner, handle)) = Self::find_handle(editor, event.point) {
            if !editor.is_selected(owner) {
                editor.set_selection(&[owner])?;
            }
            editor.begin_edit("Resize");
            tracing::debug!(node = %owner, handle = ?handle, "Resize started");
            self.handle = Some((owner, handle));
            self.mode = DragMode::Resize;
            return Ok(());
        }

        let mut clicks = event.click_count.max(1);
        let mut budget = editor.tree().max_depth() + clicks as usize + 2;
        while budget > 0 {
            budget -= 1;
            let hit = editor.hit_test(event.point);

            if editor.is_super_selected(hit) {
                if self.offer_takeover(editor, hit, event) {
                    return Ok(());
                }
                if !(event.modifiers.shift && hit == editor.super_selected()) {
                    editor.set_super_selection(Some(hit))?;
                }
                self.base_selection = editor.selected().to_vec();
                self.mode = DragMode::MarqueeSelect;
                return Ok(());
            }

            let tree = editor.tree();
            let Some(kind) = tree.kind(hit) else {
                break;
            };
            let super_selectable = handler_for(kind).super_selectable(tree, hit);
            let own_immediate = tree.capabilities(hit).children_super_select_immediately
                && !tree.children(hit).is_empty();
            let parent_immediate = tree
                .parent(hit)
                .is_some_and(|p| tree.capabilities(p).children_super_select_immediately);

            if own_immediate || (parent_immediate && super_selectable) {
                tracing::debug!(node = %hit, "Promoting to super-selection");
                editor.set_super_selection(Some(hit))?;
                continue;
            }
            if clicks > 1 && super_selectable {
                editor.set_super_selection(Some(hit))?;
                clicks -= 1;
                continue;
            }
            if event.modifiers.shift {
                Self::toggle(editor, hit)?;
                return Ok(());
            }
            if !editor.is_selected(hit) {
                editor.set_selection(&[hit])?;
            }
            if self.offer_takeover(editor, hit, event) {
                return Ok(());
            }
            if event.modifiers.alt {
                editor.begin_edit("Rotate");
                self.mode = DragMode::Rotate;
            } else {
                editor.begin_edit("Move");
                self.mode = DragMode::Move;
            }
            return Ok(());
        }
        tracing::warn!("Press dispatch did not settle");
        Ok(())
    }

    fn mouse_dragged(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        match self.mode {
            DragMode::None => Ok(()),
            DragMode::Move => self.drag_move(editor, event),
            DragMode::Rotate => self.drag_rotate(editor, event),
            DragMode::Resize => self.drag_resize(editor, event),
            DragMode::MarqueeSelect => self.drag_marquee(editor, event),
            DragMode::EventDispatch => {
                if let Some(id) = self.claimed {
                    if let Some(kind) = editor.tree().kind(id) {
                        handler_for(kind).mouse_dragged(editor, id, event);
                    }
                }
                Ok(())
            }
        }
    }

    fn mouse_released(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let result = match self.mode {
            DragMode::MarqueeSelect => {
                let pending = self.pending.take().unwrap_or_else(|| {
                    if event.modifiers.shift {
                        self.base_selection.clone()
                    } else {
                        Vec::new()
                    }
                });
                if pending.is_empty() {
                    let container = editor.super_selected();
                    editor.set_super_selection(Some(container))
                } else {
                    editor.set_selection(&pending)
                }
            }
            DragMode::EventDispatch => {
                if let Some(id) = self.claimed.take() {
                    if let Some(kind) = editor.tree().kind(id) {
                        handler_for(kind).mouse_released(editor, id, event);
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        };
        self.reset();
        editor.request_repaint(None);
        result
    }

    fn reset(&mut self) {
        self.mode = DragMode::None;
        self.handle = None;
        self.claimed = None;
        self.base_selection.clear();
        self.pending = None;
        self.marquee = None;
    }
}
