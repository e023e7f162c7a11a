//! Drag-and-drop onto the canvas and asynchronous image loads.

use rmdraw_core::{EditorEvent, LoadTicket, NodeId, Point, Rect, Size};
use serde::{Deserialize, Serialize};

use super::Editor;
use crate::error::{EditorResult, Outcome};
use crate::handlers::{handler_for, CHAR_WIDTH_FACTOR};
use crate::property::{Property, PropertyValue};
use crate::shape::NodeKind;

/// Size of an image node before its natural size is known.
const IMAGE_PLACEHOLDER: Size = Size::new(100.0, 100.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DropPayload {
    /// A paint name or hex color.
    Color(String),
    Text(String),
    /// Image location; the host loads it.
    Image { source: String },
}

impl Editor {
    /// Innermost node under a root point that takes the payload.
    pub fn drop_target(&self, point: Point, payload: &DropPayload) -> Option<NodeId> {
        let tree = self.tree();
        let mut cur = Some(self.hit_test(point));
        while let Some(id) = cur {
            let kind = tree.kind(id)?;
            if handler_for(kind).accepts_drop(tree, id, payload) {
                return Some(id);
            }
            cur = tree.parent(id);
        }
        None
    }

    pub fn drop_payload(&mut self, point: Point, payload: DropPayload) -> EditorResult<Outcome> {
        let Some(target) = self.drop_target(point, &payload) else {
            return Ok(Outcome::NothingToDo);
        };
        tracing::debug!(target = %target, payload = ?payload, "Drop");
        match payload {
            DropPayload::Color(color) => self.fill_nodes(&[target], Some(color)),
            DropPayload::Text(text) => {
                let font_size = self.config.editor.default_font_size;
                let width = (text.chars().count() as f64 * font_size * CHAR_WIDTH_FACTOR).max(1.0);
                let height = font_size * 1.2;
                let local = self.tree().point_to_local(target, point)?;
                self.begin_edit("Drop Text");
                let frame = Rect::new(local.x, local.y, width, height);
                let id = self.insert_new_node(NodeKind::Text, frame, target)?;
                self.tree_mut()
                    .set_property(id, Property::Text, PropertyValue::Text(text))?;
                self.set_selection(&[id])?;
                self.finish_edit();
                Ok(Outcome::Done)
            }
            DropPayload::Image { source } => {
                let local = self.tree().point_to_local(target, point)?;
                self.begin_edit("Drop Image");
                let frame = Rect::new(
                    local.x,
                    local.y,
                    IMAGE_PLACEHOLDER.width,
                    IMAGE_PLACEHOLDER.height,
                );
                let id = self.insert_new_node(NodeKind::Image, frame, target)?;
                self.tree_mut().set_property(
                    id,
                    Property::ImageSource,
                    PropertyValue::OptionalText(Some(source.clone())),
                )?;
                self.set_selection(&[id])?;
                self.finish_edit();
                let ticket = self.request_image_load(id);
                self.emit(EditorEvent::ImageLoadRequested {
                    ticket,
                    node: id,
                    source,
                });
                Ok(Outcome::Done)
            }
        }
    }

    fn request_image_load(&mut self, node: NodeId) -> LoadTicket {
        self.session.image_generation += 1;
        let ticket = LoadTicket {
            session: self.session.id,
            generation: self.session.image_generation,
        };
        self.session.image_requests.insert(node, ticket);
        ticket
    }

    /// Apply a finished image load. Tickets from a closed session or a
    /// superseded request do nothing.
    pub fn complete_image_load(
        &mut self,
        ticket: LoadTicket,
        node: NodeId,
        size: Size,
    ) -> EditorResult<Outcome> {
        if self.session.image_requests.get(&node) != Some(&ticket) {
            tracing::debug!(ticket = %ticket, node = %node, "Ignoring stale image load");
            return Ok(Outcome::NothingToDo);
        }
        self.session.image_requests.remove(&node);
        if !self.tree().contains(node) {
            return Ok(Outcome::NothingToDo);
        }
        self.tree_mut().set_property(
            node,
            Property::ImageNaturalSize,
            PropertyValue::Size(Some(size)),
        )?;
        self.process_changes();
        self.emit(EditorEvent::ImageLoaded { node, size });
        tracing::info!(node = %node, width = size.width, height = size.height, "Image loaded");
        Ok(Outcome::Done)
    }
}
