//! Arena-backed document tree.
//!
//! Nodes live in a `SlotMap` keyed by [`NodeId`]. Parent links are arena
//! keys, so detached nodes stay addressable and undo can reattach them.
//! Every mutation records a [`PropertyChange`] while recording is on and
//! grows the dirty region used for repaint requests.

use rmdraw_core::{GeometryError, NodeId, Point, Quad, Rect, Size, Transform};
use slotmap::SlotMap;

use super::{Capabilities, NodeKind, ShapeNode};
use crate::error::{TreeError, TreeResult};
use crate::handlers::handler_for;
use crate::property::{Property, PropertyChange, PropertyValue};

#[derive(Debug, Clone)]
pub struct ShapeTree {
    nodes: SlotMap<NodeId, ShapeNode>,
    root: NodeId,
    recording: bool,
    changes: Vec<PropertyChange>,
    dirty: Option<Rect>,
}

impl ShapeTree {
    /// Document root with a single page of `page_size`.
    pub fn new_document(page_size: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(
            ShapeNode::new(NodeKind::Document)
                .with_frame(Rect::new(0.0, 0.0, page_size.width, page_size.height)),
        );
        let mut tree = Self {
            nodes,
            root,
            recording: true,
            changes: Vec::new(),
            dirty: None,
        };
        let page = tree.create_page(page_size);
        tree.attach(root, 0, page);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&ShapeNode> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: NodeId) -> TreeResult<&ShapeNode> {
        self.nodes.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut ShapeNode> {
        self.nodes.get_mut(id).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|n| n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Capability flags, including rules that depend on the node's state.
    pub fn capabilities(&self, id: NodeId) -> Capabilities {
        match self.nodes.get(id) {
            Some(node) => {
                let mut caps = node.kind.capabilities();
                if node.kind == NodeKind::Rectangle && !node.children.is_empty() {
                    caps.super_selectable = true;
                }
                caps
            }
            None => Capabilities {
                accepts_children: false,
                children_super_select_immediately: false,
                super_selectable: false,
            },
        }
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind, frame: Rect) -> NodeId {
        self.create_node(ShapeNode::new(kind).with_frame(frame))
    }

    /// Insert a prepared node into the arena, detached.
    pub fn create_node(&mut self, mut node: ShapeNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    fn create_page(&mut self, size: Size) -> NodeId {
        let mut page =
            ShapeNode::new(NodeKind::Page).with_frame(Rect::new(0.0, 0.0, size.width, size.height));
        page.fill = Some("white".to_string());
        self.nodes.insert(page)
    }

    /// Create a detached page sized like the first page.
    pub fn create_page_like_first(&mut self) -> NodeId {
        let size = self
            .pages()
            .first()
            .and_then(|p| self.get(*p))
            .map(|p| Size::new(p.width, p.height))
            .unwrap_or(Size::new(612.0, 792.0));
        self.create_page(size)
    }

    // Links without recording or validation. Used while building trees.
    fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::WouldCreateCycle { parent, child });
        }
        if !parent_node.kind.accepts_child_kind(child_node.kind) {
            return Err(TreeError::NotAContainer {
                parent,
                kind: child_node.kind.to_string(),
            });
        }
        Ok(())
    }

    /// Insert a detached node as the `index`-th child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        self.check_insert(parent, child)?;
        let len = self.children(parent).len();
        if index > len {
            return Err(TreeError::ChildIndexOutOfBounds { parent, index, len });
        }
        self.attach(parent, index, child);
        self.mark_dirty(child);
        self.record(PropertyChange::new(
            parent,
            Property::Child { index },
            PropertyValue::Node(None),
            PropertyValue::Node(Some(child)),
        ));
        Ok(())
    }

    /// Append a detached node to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let len = self.node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Detach a node; returns its former parent and index.
    pub fn remove_from_parent(&mut self, child: NodeId) -> TreeResult<(NodeId, usize)> {
        let parent = self.node(child)?.parent.ok_or(TreeError::Detached(child))?;
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == child)
            .ok_or(TreeError::Detached(child))?;
        self.mark_dirty(child);
        self.node_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        self.record(PropertyChange::new(
            parent,
            Property::Child { index },
            PropertyValue::Node(Some(child)),
            PropertyValue::Node(None),
        ));
        Ok((parent, index))
    }

    /// Current value of a property.
    pub fn value(&self, id: NodeId, property: Property) -> TreeResult<PropertyValue> {
        let n = self.node(id)?;
        let value = match property {
            Property::X => PropertyValue::Number(n.x),
            Property::Y => PropertyValue::Number(n.y),
            Property::Width => PropertyValue::Number(n.width),
            Property::Height => PropertyValue::Number(n.height),
            Property::Roll => PropertyValue::Number(n.roll),
            Property::ScaleX => PropertyValue::Number(n.scale_x),
            Property::ScaleY => PropertyValue::Number(n.scale_y),
            Property::SkewX => PropertyValue::Number(n.skew_x),
            Property::SkewY => PropertyValue::Number(n.skew_y),
            Property::Fill => PropertyValue::OptionalText(n.fill.clone()),
            Property::Stroke => PropertyValue::OptionalText(n.stroke.clone()),
            Property::Locked => PropertyValue::Bool(n.locked),
            Property::Hittable => PropertyValue::Bool(n.hittable),
            Property::Name => PropertyValue::Text(n.name.clone()),
            Property::Text => PropertyValue::Text(n.text.clone()),
            Property::FontSize => PropertyValue::Number(n.font_size),
            Property::TextCaret => PropertyValue::Index(n.caret),
            Property::Points => PropertyValue::Points(n.points.clone()),
            Property::ImageSource => PropertyValue::OptionalText(n.image_source.clone()),
            Property::ImageNaturalSize => PropertyValue::Size(n.natural_size),
            Property::SelectedPageIndex => PropertyValue::Index(n.selected_page),
            Property::Child { index } => PropertyValue::Node(n.children.get(index).copied()),
        };
        Ok(value)
    }

    /// Set a property, recording the change. Returns false when the value
    /// was already current.
    pub fn set_property(
        &mut self,
        id: NodeId,
        property: Property,
        value: PropertyValue,
    ) -> TreeResult<bool> {
        if property.is_structural() {
            return Err(TreeError::InvalidValue { node: id, property });
        }
        if let PropertyValue::Number(v) = value {
            if !v.is_finite() {
                return Err(TreeError::Geometry {
                    node: id,
                    source: GeometryError::NonFinite {
                        field: format!("{:?}", property),
                    },
                });
            }
        }
        let old = self.value(id, property)?;
        if old == value {
            return Ok(false);
        }
        self.mark_dirty(id);
        self.write(id, property, value.clone())?;
        self.mark_dirty(id);
        self.record(PropertyChange::new(id, property, old, value));
        Ok(true)
    }

    pub fn set_number(&mut self, id: NodeId, property: Property, value: f64) -> TreeResult<bool> {
        self.set_property(id, property, PropertyValue::Number(value))
    }

    /// Set the frame origin and size.
    pub fn set_frame(&mut self, id: NodeId, frame: Rect) -> TreeResult<()> {
        self.set_number(id, Property::X, frame.x)?;
        self.set_number(id, Property::Y, frame.y)?;
        self.set_number(id, Property::Width, frame.width)?;
        self.set_number(id, Property::Height, frame.height)?;
        Ok(())
    }

    fn write(&mut self, id: NodeId, property: Property, value: PropertyValue) -> TreeResult<()> {
        let invalid = TreeError::InvalidValue { node: id, property };
        let n = self.node_mut(id)?;
        match (property, value) {
            (Property::X, PropertyValue::Number(v)) => n.x = v,
            (Property::Y, PropertyValue::Number(v)) => n.y = v,
            (Property::Width, PropertyValue::Number(v)) => n.width = v,
            (Property::Height, PropertyValue::Number(v)) => n.height = v,
            (Property::Roll, PropertyValue::Number(v)) => n.roll = v,
            (Property::ScaleX, PropertyValue::Number(v)) => n.scale_x = v,
            (Property::ScaleY, PropertyValue::Number(v)) => n.scale_y = v,
            (Property::SkewX, PropertyValue::Number(v)) => n.skew_x = v,
            (Property::SkewY, PropertyValue::Number(v)) => n.skew_y = v,
            (Property::Fill, PropertyValue::OptionalText(v)) => n.fill = v,
            (Property::Stroke, PropertyValue::OptionalText(v)) => n.stroke = v,
            (Property::Locked, PropertyValue::Bool(v)) => n.locked = v,
            (Property::Hittable, PropertyValue::Bool(v)) => n.hittable = v,
            (Property::Name, PropertyValue::Text(v)) => n.name = v,
            (Property::Text, PropertyValue::Text(v)) => n.text = v,
            (Property::FontSize, PropertyValue::Number(v)) => n.font_size = v,
            (Property::TextCaret, PropertyValue::Index(v)) => n.caret = v,
            (Property::Points, PropertyValue::Points(v)) => n.points = v,
            (Property::ImageSource, PropertyValue::OptionalText(v)) => n.image_source = v,
            (Property::ImageNaturalSize, PropertyValue::Size(v)) => n.natural_size = v,
            (Property::SelectedPageIndex, PropertyValue::Index(v)) => n.selected_page = v,
            _ => return Err(invalid),
        }
        Ok(())
    }

    /// Apply the `new` side of a recorded change.
    ///
    /// Undo applies `change.inverse()`, redo the change itself.
    pub fn apply_change(&mut self, change: &PropertyChange) -> TreeResult<()> {
        match change.property {
            Property::Child { index } => match (&change.old, &change.new) {
                (PropertyValue::Node(None), PropertyValue::Node(Some(child))) => {
                    self.insert_child(change.node, index, *child)
                }
                (PropertyValue::Node(Some(child)), PropertyValue::Node(None)) => {
                    self.remove_from_parent(*child).map(|_| ())
                }
                _ => Err(TreeError::InvalidValue {
                    node: change.node,
                    property: change.property,
                }),
            },
            property => self
                .set_property(change.node, property, change.new.clone())
                .map(|_| ()),
        }
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.parent(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    /// Chain from the root down to `id`, inclusive.
    pub fn path_from_root(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        self.node(id)?;
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id);
        if path.first() != Some(&self.root) {
            return Err(TreeError::Detached(id));
        }
        Ok(path)
    }

    /// Whether the node is connected to the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || (self.contains(id) && self.is_ancestor(self.root, id))
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Depth of the deepest attached node.
    pub fn max_depth(&self) -> usize {
        fn walk(tree: &ShapeTree, id: NodeId, depth: usize) -> usize {
            tree.children(id)
                .iter()
                .map(|c| walk(tree, *c, depth + 1))
                .max()
                .unwrap_or(depth)
        }
        walk(self, self.root, 0)
    }

    /// The node and all its descendants, parents before children.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            out.extend_from_slice(self.children(out[i]));
            i += 1;
        }
        out
    }

    pub fn pages(&self) -> &[NodeId] {
        self.children(self.root)
    }

    /// Page selected by the root's page index, clamped to the page list.
    pub fn active_page(&self) -> NodeId {
        let pages = self.pages();
        let index = self.get(self.root).map(|r| r.selected_page).unwrap_or(0);
        pages
            .get(index)
            .or_else(|| pages.last())
            .copied()
            .unwrap_or(self.root)
    }

    pub fn page_index(&self, page: NodeId) -> Option<usize> {
        self.pages().iter().position(|p| *p == page)
    }

    /// The page containing `id`, or `id` itself when it is a page.
    pub fn page_of(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id) == Some(NodeKind::Page) {
            return Some(id);
        }
        self.ancestors(id)
            .into_iter()
            .find(|a| self.kind(*a) == Some(NodeKind::Page))
    }

    pub fn local_transform(&self, id: NodeId) -> Transform {
        self.get(id).map(|n| n.transform()).unwrap_or_default()
    }

    /// Maps `id`'s local coordinates to root coordinates.
    pub fn transform_to_root(&self, id: NodeId) -> Transform {
        let mut m = Transform::IDENTITY;
        let mut cur = id;
        while let Some(node) = self.get(cur) {
            let Some(parent) = node.parent else {
                break;
            };
            m = node.transform().multiply(&m);
            cur = parent;
        }
        m
    }

    pub fn transform_from_root(&self, id: NodeId) -> TreeResult<Transform> {
        self.transform_to_root(id)
            .inverse()
            .map_err(|source| TreeError::Geometry { node: id, source })
    }

    /// Converts a root point into `id`'s local coordinates.
    pub fn point_to_local(&self, id: NodeId, root_point: Point) -> TreeResult<Point> {
        Ok(self.transform_from_root(id)?.apply(root_point))
    }

    pub fn point_to_root(&self, id: NodeId, local: Point) -> Point {
        self.transform_to_root(id).apply(local)
    }

    pub fn quad_in_parent(&self, id: NodeId) -> Quad {
        match self.get(id) {
            Some(n) => n.transform().apply_quad(&n.local_bounds()),
            None => Quad([Point::ZERO; 4]),
        }
    }

    /// Axis-aligned bounds in the parent's coordinates.
    pub fn bounds_in_parent(&self, id: NodeId) -> Rect {
        self.quad_in_parent(id).bounds()
    }

    pub fn bounds_in_root(&self, id: NodeId) -> Rect {
        match self.get(id) {
            Some(n) => self.transform_to_root(id).apply_rect(&n.local_bounds()),
            None => Rect::default(),
        }
    }

    /// Topmost hittable child of `parent` under a point in `parent`'s
    /// local coordinates.
    pub fn child_at_point(&self, parent: NodeId, point: Point) -> Option<NodeId> {
        self.children(parent).iter().rev().copied().find(|child| {
            let Some(node) = self.get(*child) else {
                return false;
            };
            if !node.hittable {
                return false;
            }
            match node.transform().inverse() {
                Ok(inv) => handler_for(node.kind).contains_local_point(self, *child, inv.apply(point)),
                Err(_) => false,
            }
        })
    }

    /// Hittable children of `parent` whose outline intersects `rect`, in
    /// z-order.
    pub fn children_intersecting(&self, parent: NodeId, rect: &Rect) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|c| self.get(*c).is_some_and(|n| n.hittable))
            .filter(|c| self.quad_in_parent(*c).intersects_rect(rect))
            .collect()
    }

    /// Move `child` under `new_parent` at `index` without changing where it
    /// renders.
    ///
    /// The frame center is converted through root coordinates and the
    /// rotation difference between the two parent chains is folded into
    /// the node's roll. Exact for translation and rotation ancestors.
    pub fn reparent_preserving(
        &mut self,
        child: NodeId,
        new_parent: NodeId,
        index: usize,
    ) -> TreeResult<()> {
        let node = self.node(child)?;
        let old_parent = node.parent.ok_or(TreeError::Detached(child))?;
        let (w, h, roll, kind) = (node.width, node.height, node.roll, node.kind);
        let parent_node = self.node(new_parent)?;
        if child == new_parent || self.is_ancestor(child, new_parent) {
            return Err(TreeError::WouldCreateCycle {
                parent: new_parent,
                child,
            });
        }
        if !parent_node.kind.accepts_child_kind(kind) {
            return Err(TreeError::NotAContainer {
                parent: new_parent,
                kind: kind.to_string(),
            });
        }
        let len = parent_node.children.len() - usize::from(old_parent == new_parent);
        if index > len {
            return Err(TreeError::ChildIndexOutOfBounds {
                parent: new_parent,
                index,
                len,
            });
        }

        let center_root = self.transform_to_root(child).apply(Point::new(w / 2.0, h / 2.0));
        let rot_old = self.transform_to_root(old_parent).rotation_degrees();
        let rot_new = self.transform_to_root(new_parent).rotation_degrees();
        let center = self.transform_from_root(new_parent)?.apply(center_root);

        self.remove_from_parent(child)?;
        self.set_number(child, Property::X, center.x - w / 2.0)?;
        self.set_number(child, Property::Y, center.y - h / 2.0)?;
        let delta = rot_old - rot_new;
        if delta.abs() > 1e-9 {
            self.set_number(child, Property::Roll, roll + delta)?;
        }
        self.insert_child(new_parent, index, child)
    }

    /// Deep copy of a subtree; the copy is detached.
    pub fn duplicate_subtree(&mut self, id: NodeId) -> TreeResult<NodeId> {
        let source = self.node(id)?.clone();
        let children = source.children.clone();
        let copy = self.create_node(source);
        for child in children {
            let child_copy = self.duplicate_subtree(child)?;
            self.attach(copy, usize::MAX, child_copy);
        }
        Ok(copy)
    }

    /// Free a detached subtree that no recorded change refers to.
    pub fn discard_detached(&mut self, id: NodeId) -> TreeResult<()> {
        if self.node(id)?.parent.is_some() || id == self.root {
            return Err(TreeError::AlreadyAttached(id));
        }
        for node in self.descendants(id) {
            self.nodes.remove(node);
        }
        Ok(())
    }

    /// Enable or disable change recording; returns the previous state.
    pub fn set_recording(&mut self, recording: bool) -> bool {
        std::mem::replace(&mut self.recording, recording)
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    fn record(&mut self, change: PropertyChange) {
        if self.recording {
            tracing::trace!(node = %change.node, property = ?change.property, "Recorded change");
            self.changes.push(change);
        }
    }

    fn mark_dirty(&mut self, id: NodeId) {
        if !self.is_attached(id) {
            return;
        }
        let bounds = self.bounds_in_root(id);
        self.dirty = Some(match self.dirty {
            Some(d) => d.union(&bounds),
            None => bounds,
        });
    }

    /// Drain recorded changes.
    pub fn take_changes(&mut self) -> Vec<PropertyChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Drain the region touched since the last call.
    pub fn take_dirty(&mut self) -> Option<Rect> {
        self.dirty.take()
    }
}
