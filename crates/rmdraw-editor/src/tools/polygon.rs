//! Click-by-click polygon tool.

use rmdraw_core::{NodeId, Point, Rect, EPSILON};

use super::{Tool, ToolKind};
use crate::editor::Editor;
use crate::error::EditorResult;
use crate::input::PointerEvent;
use crate::property::{Property, PropertyValue};
use crate::shape::NodeKind;

/// Collects vertices in the insertion container's coordinates. Clicking
/// on the first or last vertex, or double-clicking, finishes the shape.
#[derive(Debug, Default)]
pub struct PolygonTool {
    points: Vec<Point>,
    container: Option<NodeId>,
}

impl PolygonTool {
    /// Vertices placed so far, container-local.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn closes_path(&self, point: Point, tolerance: f64) -> bool {
        if self.points.len() < 2 {
            return false;
        }
        let near = |p: Option<&Point>| p.is_some_and(|p| p.distance(&point) <= tolerance);
        near(self.points.first()) || near(self.points.last())
    }

    fn finish(&mut self, editor: &mut Editor) -> EditorResult<()> {
        let points = std::mem::take(&mut self.points);
        let container = self.container.take();
        editor.request_tool(ToolKind::Select);
        let (Some(container), Some(bounds)) = (container, Rect::bounding(&points)) else {
            return Ok(());
        };
        if points.len() < 2 {
            tracing::debug!("Polygon cancelled with fewer than two points");
            return Ok(());
        }
        let unit = |v: f64, origin: f64, extent: f64| {
            if extent.abs() < EPSILON {
                0.0
            } else {
                (v - origin) / extent
            }
        };
        let normalized: Vec<Point> = points
            .iter()
            .map(|p| {
                Point::new(
                    unit(p.x, bounds.x, bounds.width),
                    unit(p.y, bounds.y, bounds.height),
                )
            })
            .collect();

        editor.begin_edit("New Polygon");
        let id = editor.insert_new_node(NodeKind::Polygon, bounds, container)?;
        editor
            .tree_mut()
            .set_property(id, Property::Points, PropertyValue::Points(normalized))?;
        editor.set_selection(&[id])?;
        tracing::debug!(node = %id, vertices = points.len(), "Created polygon");
        Ok(())
    }
}

impl Tool for PolygonTool {
    fn mouse_pressed(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let container = match self.container {
            Some(c) if editor.tree().is_attached(c) => c,
            _ => {
                self.points.clear();
                let c = editor.insertion_container();
                self.container = Some(c);
                c
            }
        };
        let local = editor.tree().point_to_local(container, event.point)?;
        if event.click_count > 1 || self.closes_path(local, editor.config().editor.handle_size) {
            return self.finish(editor);
        }
        self.points.push(local);
        Ok(())
    }

    /// Dragging moves the vertex placed by the press.
    fn mouse_dragged(&mut self, editor: &mut Editor, event: &PointerEvent) -> EditorResult<()> {
        let Some(container) = self.container else {
            return Ok(());
        };
        let local = editor.tree().point_to_local(container, event.point)?;
        if let Some(last) = self.points.last_mut() {
            *last = local;
        }
        Ok(())
    }

    fn mouse_released(&mut self, _editor: &mut Editor, _event: &PointerEvent) -> EditorResult<()> {
        Ok(())
    }

    fn reset(&mut self) {
        self.points.clear();
        self.container = None;
    }
}
