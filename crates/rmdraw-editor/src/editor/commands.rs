//! Editing commands and the clipboard.
//!
//! Each command titles its own undo transaction and commits it before it
//! returns, so every command is one undo step. Commands with nothing to
//! act on report `NothingToDo`.

use rmdraw_core::{NodeId, Rect};

use super::Editor;
use crate::error::{EditorResult, Outcome};
use crate::property::{Property, PropertyValue};
use crate::shape::NodeKind;

impl Editor {
    /// Selected nodes in paint order.
    fn selected_in_z_order(&self) -> Vec<NodeId> {
        let tree = self.tree();
        let mut nodes = self.selection.selected.clone();
        nodes.sort_by_key(|id| tree.child_index(*id).unwrap_or(usize::MAX));
        nodes
    }

    pub fn delete_selected(&mut self) -> EditorResult<Outcome> {
        let nodes = self.selected_in_z_order();
        if nodes.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Delete");
        let container = self.selection.super_selected();
        for id in &nodes {
            self.tree_mut().remove_from_parent(*id)?;
        }
        tracing::info!(count = nodes.len(), "Deleted nodes");
        self.set_super_selection(Some(container))?;
        self.finish_edit();
        Ok(Outcome::Done)
    }

    /// Wrap the selection in a new group at the position of its lowest
    /// member, keeping everything where it renders.
    pub fn group_selected(&mut self) -> EditorResult<Outcome> {
        let nodes = self.selected_in_z_order();
        let container = self.selection.super_selected();
        let accepts_group = self
            .tree()
            .kind(container)
            .is_some_and(|k| k.accepts_child_kind(NodeKind::Group));
        if nodes.is_empty() || !accepts_group {
            return Ok(Outcome::NothingToDo);
        }
        let Some(bounds) = Rect::union_all(nodes.iter().map(|id| self.tree().bounds_in_parent(*id)))
        else {
            return Ok(Outcome::NothingToDo);
        };
        let index = nodes
            .first()
            .and_then(|id| self.tree().child_index(*id))
            .unwrap_or(0);

        self.begin_edit("Group");
        let tree = self.tree_mut();
        let group = tree.create(NodeKind::Group, bounds);
        tree.insert_child(container, index, group)?;
        for (i, id) in nodes.iter().enumerate() {
            tree.reparent_preserving(*id, group, i)?;
        }
        tracing::info!(group = %group, count = nodes.len(), "Grouped nodes");
        self.set_selection(&[group])?;
        self.finish_edit();
        Ok(Outcome::Done)
    }

    /// Dissolve selected groups into their container.
    pub fn ungroup_selected(&mut self) -> EditorResult<Outcome> {
        let groups: Vec<NodeId> = self
            .selected_in_z_order()
            .into_iter()
            .filter(|id| self.tree().kind(*id) == Some(NodeKind::Group))
            .collect();
        if groups.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Ungroup");
        let container = self.selection.super_selected();
        let mut released = Vec::new();
        for group in groups {
            let tree = self.tree_mut();
            let index = tree.child_index(group).unwrap_or(0);
            let children = tree.children(group).to_vec();
            for (i, child) in children.iter().enumerate() {
                tree.reparent_preserving(*child, container, index + 1 + i)?;
            }
            tree.remove_from_parent(group)?;
            released.extend(children);
        }
        self.set_selection(&released)?;
        self.finish_edit();
        Ok(Outcome::Done)
    }

    /// Offset unlocked selected nodes in their container's coordinates.
    pub fn move_selected_by(&mut self, dx: f64, dy: f64) -> EditorResult<Outcome> {
        let nodes: Vec<NodeId> = self
            .selection
            .selected
            .iter()
            .copied()
            .filter(|id| self.tree().get(*id).is_some_and(|n| !n.locked))
            .collect();
        if nodes.is_empty() || (dx == 0.0 && dy == 0.0) {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Move");
        self.offset_nodes(&nodes, dx, dy)?;
        self.finish_edit();
        Ok(Outcome::Done)
    }

    pub(crate) fn offset_nodes(&mut self, nodes: &[NodeId], dx: f64, dy: f64) -> EditorResult<()> {
        let tree = self.tree_mut();
        for id in nodes {
            let (x, y) = {
                let n = tree.node(*id)?;
                (n.x, n.y)
            };
            tree.set_number(*id, Property::X, x + dx)?;
            tree.set_number(*id, Property::Y, y + dy)?;
        }
        Ok(())
    }

    pub fn bring_to_front(&mut self) -> EditorResult<Outcome> {
        let nodes = self.selected_in_z_order();
        let container = self.selection.super_selected();
        let len = self.tree().children(container).len();
        let already = nodes
            .iter()
            .enumerate()
            .all(|(i, id)| self.tree().child_index(*id) == Some(len - nodes.len() + i));
        if nodes.is_empty() || already {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Bring to Front");
        let tree = self.tree_mut();
        for id in &nodes {
            tree.remove_from_parent(*id)?;
            tree.add_child(container, *id)?;
        }
        self.finish_edit();
        Ok(Outcome::Done)
    }

    pub fn send_to_back(&mut self) -> EditorResult<Outcome> {
        let nodes = self.selected_in_z_order();
        let container = self.selection.super_selected();
        let already = nodes
            .iter()
            .enumerate()
            .all(|(i, id)| self.tree().child_index(*id) == Some(i));
        if nodes.is_empty() || already {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Send to Back");
        let tree = self.tree_mut();
        for id in nodes.iter().rev() {
            tree.remove_from_parent(*id)?;
            tree.insert_child(container, 0, *id)?;
        }
        self.finish_edit();
        Ok(Outcome::Done)
    }

    /// Fill the selection, or the super-selected node when nothing is
    /// selected.
    pub fn set_fill(&mut self, color: Option<String>) -> EditorResult<Outcome> {
        let root = self.tree().root();
        let targets: Vec<NodeId> = self
            .selected_or_super_selected()
            .into_iter()
            .filter(|id| *id != root)
            .collect();
        self.fill_nodes(&targets, color)
    }

    pub(crate) fn fill_nodes(
        &mut self,
        targets: &[NodeId],
        color: Option<String>,
    ) -> EditorResult<Outcome> {
        let value = PropertyValue::OptionalText(color);
        let differs = targets
            .iter()
            .any(|id| self.tree().value(*id, Property::Fill).ok().as_ref() != Some(&value));
        if !differs {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Fill Color");
        for id in targets {
            self.tree_mut().set_property(*id, Property::Fill, value.clone())?;
        }
        self.finish_edit();
        Ok(Outcome::Done)
    }

    pub fn set_locked(&mut self, locked: bool) -> EditorResult<Outcome> {
        let nodes: Vec<NodeId> = self
            .selection
            .selected
            .iter()
            .copied()
            .filter(|id| self.tree().get(*id).is_some_and(|n| n.locked != locked))
            .collect();
        if nodes.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit(if locked { "Lock" } else { "Unlock" });
        for id in &nodes {
            self.tree_mut()
                .set_property(*id, Property::Locked, PropertyValue::Bool(locked))?;
        }
        self.finish_edit();
        Ok(Outcome::Done)
    }

    /// Add a page sized like the first one and make it active.
    pub fn add_page(&mut self) -> EditorResult<NodeId> {
        self.begin_edit("Add Page");
        let root = self.tree().root();
        let tree = self.tree_mut();
        let page = tree.create_page_like_first();
        tree.add_child(root, page)?;
        self.set_super_selection(Some(page))?;
        self.finish_edit();
        tracing::info!(page = %page, pages = self.tree().pages().len(), "Added page");
        Ok(page)
    }

    // ----- clipboard -----

    /// Copy the selection into the clipboard as detached duplicates.
    pub fn copy(&mut self) -> EditorResult<Outcome> {
        let nodes = self.selected_in_z_order();
        if nodes.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        let tree = self.scene.tree_mut();
        for old in std::mem::take(&mut self.session.clipboard) {
            if let Err(e) = tree.discard_detached(old) {
                tracing::warn!(node = %old, error = %e, "Failed to free clipboard node");
            }
        }
        let mut copies = Vec::with_capacity(nodes.len());
        for id in &nodes {
            copies.push(tree.duplicate_subtree(*id)?);
        }
        self.session.clipboard = copies;
        self.session.paste_count = 0;
        tracing::debug!(count = nodes.len(), "Copied to clipboard");
        Ok(Outcome::Done)
    }

    pub fn cut(&mut self) -> EditorResult<Outcome> {
        if self.copy()?.is_noop() {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Cut");
        let container = self.selection.super_selected();
        for id in self.selected_in_z_order() {
            self.tree_mut().remove_from_parent(id)?;
        }
        self.set_super_selection(Some(container))?;
        self.finish_edit();
        Ok(Outcome::Done)
    }

    pub fn has_clipboard(&self) -> bool {
        !self.session.clipboard.is_empty()
    }

    /// Paste the clipboard into the insertion container, each paste offset
    /// further from the originals.
    pub fn paste(&mut self) -> EditorResult<Outcome> {
        if self.session.clipboard.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Paste");
        self.session.paste_count += 1;
        let offset = self.config.editor.paste_offset * f64::from(self.session.paste_count);
        let container = self.insertion_container();
        let sources = self.session.clipboard.clone();
        let pasted = self.place_copies(&sources, container, offset)?;
        self.set_selection(&pasted)?;
        self.finish_edit();
        tracing::info!(count = pasted.len(), "Pasted");
        Ok(Outcome::Done)
    }

    /// Copy the selection in place, offset by the paste offset.
    pub fn duplicate(&mut self) -> EditorResult<Outcome> {
        let nodes = self.selected_in_z_order();
        if nodes.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.begin_edit("Duplicate");
        let container = self.selection.super_selected();
        let offset = self.config.editor.paste_offset;
        let copies = self.place_copies(&nodes, container, offset)?;
        self.set_selection(&copies)?;
        self.finish_edit();
        Ok(Outcome::Done)
    }

    fn place_copies(
        &mut self,
        sources: &[NodeId],
        container: NodeId,
        offset: f64,
    ) -> EditorResult<Vec<NodeId>> {
        let mut placed = Vec::with_capacity(sources.len());
        for source in sources {
            let copy = self.tree_mut().duplicate_subtree(*source)?;
            self.tree_mut().add_child(container, copy)?;
            placed.push(copy);
        }
        self.offset_nodes(&placed, offset, offset)?;
        Ok(placed)
    }
}
