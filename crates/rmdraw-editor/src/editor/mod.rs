//! Editor: one open document, its selection, undo history and tools.
//!
//! Every host entry point (pointer, key, drop, command) ends by flushing
//! the scene graph. Flushed changes feed the active undo transaction and
//! schedule a deferred commit. Keys, drops and commands run it before they
//! return. During a drag it is held back until the pointer is released,
//! so a whole drag lands in one undo step.

mod commands;
mod drop;
mod keys;

pub use drop::DropPayload;

use std::collections::HashMap;

use rmdraw_core::{
    EditorEvent, EventDispatcher, EventFilter, LoadTicket, NodeId, Point, Rect, Size,
    SubscriptionId,
};
use rmdraw_settings::Config;
use uuid::Uuid;

use crate::error::{EditorError, EditorResult, Outcome};
use crate::guides::{self, Guide, SnapMode};
use crate::handlers::handler_for;
use crate::input::{Modifiers, PointerEvent};
use crate::pending::{PendingSlot, PendingTask, RunLaterTicket};
use crate::property::{Property, PropertyChange, PropertyValue};
use crate::scene_graph::SceneGraph;
use crate::selection::SelectionState;
use crate::shape::{NodeKind, ShapeNode, ShapeTree};
use crate::tools::{Tool, ToolKind, Tools};
use crate::undo::{SelectionMemo, Undoer};

/// US Letter in points.
pub const DEFAULT_PAGE_SIZE: Size = Size::new(612.0, 792.0);

/// Per-document editing session state.
#[derive(Debug)]
pub struct SessionContext {
    /// Rotated when a document is opened or closed.
    pub id: Uuid,
    pub proximity_guides_enabled: bool,
    /// Detached copies of the last copied nodes.
    pub(crate) clipboard: Vec<NodeId>,
    pub(crate) paste_count: u32,
    pub(crate) pending: PendingSlot,
    pub(crate) guides: Vec<Guide>,
    pub(crate) mouse_down: bool,
    /// Selection captured when the current edit was titled.
    pub(crate) edit_selection: Option<SelectionMemo>,
    pub(crate) image_generation: u64,
    pub(crate) image_requests: HashMap<NodeId, LoadTicket>,
    pub(crate) hooks_enabled: bool,
}

impl SessionContext {
    fn new(config: &Config) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            proximity_guides_enabled: config.snapping.proximity_guides_enabled,
            clipboard: Vec::new(),
            paste_count: 0,
            pending: PendingSlot::new(id),
            guides: Vec::new(),
            mouse_down: false,
            edit_selection: None,
            image_generation: 0,
            image_requests: HashMap::new(),
            hooks_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    DidBecomeSuperSelected,
    WillLoseSuperSelection,
}

pub struct Editor {
    pub(crate) scene: SceneGraph,
    pub(crate) selection: SelectionState,
    pub(crate) undoer: Undoer,
    pub(crate) session: SessionContext,
    pub(crate) config: Config,
    pub(crate) events: EventDispatcher,
    pub(crate) tools: Tools,
    pub(crate) requested_tool: Option<ToolKind>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("session", &self.session.id)
            .field("selection", &self.selection)
            .field("tool", &self.tools.current)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Editor with a new one-page document.
    pub fn new(config: Config) -> Self {
        Self::with_document(config, ShapeTree::new_document(DEFAULT_PAGE_SIZE))
    }

    pub fn with_document(config: Config, tree: ShapeTree) -> Self {
        let selection = SelectionState::new(&tree);
        let session = SessionContext::new(&config);
        tracing::info!(session = %session.id, nodes = tree.len(), "Opened document");
        Self {
            scene: SceneGraph::new(tree),
            selection,
            undoer: Undoer::with_depth(config.history.max_undo_depth),
            session,
            config,
            events: EventDispatcher::new(),
            tools: Tools::default(),
            requested_tool: None,
        }
    }

    /// Replace the document. Undo history, clipboard and pending work are
    /// dropped; tickets issued before this call become stale.
    pub fn open_document(&mut self, tree: ShapeTree) -> ShapeTree {
        let old = std::mem::replace(&mut self.scene, SceneGraph::new(tree)).into_tree();
        self.selection = SelectionState::new(self.tree());
        self.undoer.clear();
        self.session = SessionContext::new(&self.config);
        self.tools.reset_all();
        self.tools.current = ToolKind::Select;
        self.requested_tool = None;
        tracing::info!(session = %self.session.id, nodes = self.tree().len(), "Opened document");
        self.emit(EditorEvent::RepaintRequested { region: None });
        old
    }

    /// Close the document, leaving an empty one in its place.
    pub fn close_document(&mut self) -> ShapeTree {
        tracing::info!(session = %self.session.id, "Closing document");
        self.open_document(ShapeTree::new_document(DEFAULT_PAGE_SIZE))
    }

    pub fn tree(&self) -> &ShapeTree {
        self.scene.tree()
    }

    /// Mutable tree access. Changes are picked up at the next flush.
    pub fn tree_mut(&mut self) -> &mut ShapeTree {
        self.scene.tree_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn undoer(&self) -> &Undoer {
        &self.undoer
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selected(&self) -> &[NodeId] {
        self.selection.selected()
    }

    pub fn super_selected(&self) -> NodeId {
        self.selection.super_selected()
    }

    pub fn super_selection_path(&self) -> &[NodeId] {
        self.selection.super_selection_path()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn is_super_selected(&self, id: NodeId) -> bool {
        self.selection.is_super_selected(id)
    }

    pub fn selected_or_super_selected(&self) -> Vec<NodeId> {
        self.selection.selected_or_super_selected()
    }

    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        self.events.subscribe(filter, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Queue a repaint; delivered at the next flush.
    pub fn request_repaint(&mut self, region: Option<Rect>) {
        self.scene.request_repaint(region);
    }

    pub(crate) fn emit(&mut self, event: EditorEvent) {
        tracing::trace!(event = %event, "Editor event");
        self.events.publish(event);
    }

    // ----- selection -----

    /// Select sibling nodes, super-selecting their parent.
    ///
    /// An empty list super-selects the active page. A node without a
    /// parent is super-selected itself, and nodes directly under the
    /// document root (pages) super-select the last of them.
    pub fn set_selection(&mut self, nodes: &[NodeId]) -> EditorResult<()> {
        let mut list: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for id in nodes {
            if !list.contains(id) {
                list.push(*id);
            }
        }
        let Some(&first) = list.first() else {
            return self.set_super_selection(None);
        };
        let tree = self.tree();
        for id in &list {
            tree.node(*id)?;
        }
        let Some(parent) = tree.parent(first) else {
            return self.set_super_selection(Some(first));
        };
        if parent == tree.root() {
            return self.set_super_selection(list.last().copied());
        }
        if let Some(other) = list.iter().find(|id| tree.parent(**id) != Some(parent)) {
            return Err(EditorError::MixedParents {
                first,
                other: *other,
            });
        }

        let old_selected = self.selection.selected.clone();
        let old_path = self.selection.path.clone();
        self.super_select_internal(Some(parent))?;
        // hooks on the way may have removed nodes
        let container = self.selection.super_selected();
        list.retain(|id| self.tree().parent(*id) == Some(container));
        self.selection.selected = list;
        self.notify_selection(old_selected, old_path);
        Ok(())
    }

    /// Make `node` the deepest super-selected node, or the active page for
    /// `None`. Clears the selection.
    ///
    /// Idempotent: `SelectionChanged` and `SuperSelectionChanged` are only
    /// published when the selection or the path actually changed, so
    /// re-super-selecting the current node publishes just a repaint.
    pub fn set_super_selection(&mut self, node: Option<NodeId>) -> EditorResult<()> {
        let old_selected = self.selection.selected.clone();
        let old_path = self.selection.path.clone();
        self.super_select_internal(node)?;
        self.notify_selection(old_selected, old_path);
        Ok(())
    }

    fn super_select_internal(&mut self, node: Option<NodeId>) -> EditorResult<()> {
        let target = node.unwrap_or_else(|| self.tree().active_page());
        let chain = self.tree().path_from_root(target)?;
        self.selection.selected.clear();

        while let Some(&last) = self.selection.path.last() {
            if chain.contains(&last) {
                break;
            }
            self.selection.path.pop();
            self.call_hook(last, Hook::WillLoseSuperSelection);
        }

        let chain = match self.tree().path_from_root(target) {
            Ok(chain) => chain,
            Err(e) => {
                tracing::warn!(node = %target, error = %e, "Super-selection target removed by a hook");
                self.selection.path.truncate(1);
                return Err(e.into());
            }
        };
        if self.selection.path.is_empty() {
            self.selection.path.push(self.tree().root());
        }
        let start = self.selection.path.len();
        for id in chain.into_iter().skip(start) {
            self.selection.path.push(id);
            self.call_hook(id, Hook::DidBecomeSuperSelected);
        }

        if let Some(page) = self.tree().page_of(target) {
            self.activate_page(page);
        }
        Ok(())
    }

    fn activate_page(&mut self, page: NodeId) {
        let old = self.tree().active_page();
        if old == page {
            return;
        }
        let Some(index) = self.tree().page_index(page) else {
            return;
        };
        let root = self.tree().root();
        if let Err(e) = self
            .tree_mut()
            .set_property(root, Property::SelectedPageIndex, PropertyValue::Index(index))
        {
            tracing::warn!(page = %page, error = %e, "Failed to record active page");
            return;
        }
        tracing::debug!(page = %page, index, "Active page changed");
        self.emit(EditorEvent::ActivePageChanged {
            old: Some(old),
            new: page,
        });
    }

    fn notify_selection(&mut self, old_selected: Vec<NodeId>, old_path: Vec<NodeId>) {
        if old_selected != self.selection.selected {
            self.emit(EditorEvent::SelectionChanged {
                old: old_selected,
                new: self.selection.selected.clone(),
            });
        }
        if old_path != self.selection.path {
            self.emit(EditorEvent::SuperSelectionChanged {
                old: old_path,
                new: self.selection.path.clone(),
            });
        }
        self.emit(EditorEvent::RepaintRequested { region: None });
    }

    fn call_hook(&mut self, id: NodeId, hook: Hook) {
        if !self.session.hooks_enabled {
            return;
        }
        let Some(kind) = self.tree().kind(id) else {
            return;
        };
        let handler = handler_for(kind);
        match hook {
            Hook::DidBecomeSuperSelected => handler.did_become_super_selected(self, id),
            Hook::WillLoseSuperSelection => handler.will_lose_super_selection(self, id),
        }
    }

    /// Step the selection one level out.
    pub fn pop_selection(&mut self) -> EditorResult<Outcome> {
        let tree = self.tree();
        let selected = self.selection.selected();
        if selected.len() == 1 {
            if let Some(parent) = tree.parent(selected[0]) {
                self.set_super_selection(Some(parent))?;
                return Ok(Outcome::Done);
            }
        }
        if self.selection.path.len() < 2 {
            return Ok(Outcome::NothingToDo);
        }
        let current = self.selection.super_selected();
        let parent_immediate = tree
            .parent(current)
            .is_some_and(|p| tree.capabilities(p).children_super_select_immediately);
        if tree.kind(current) == Some(NodeKind::Text) {
            self.set_selection(&[current])?;
        } else if parent_immediate {
            let parent = tree.parent(current);
            self.set_super_selection(parent)?;
        } else {
            self.set_selection(&[current])?;
        }
        Ok(Outcome::Done)
    }

    /// Select every child of the super-selected container.
    pub fn select_all(&mut self) -> EditorResult<Outcome> {
        let mut container = self.selection.super_selected();
        if container == self.tree().root() {
            container = self.tree().active_page();
            self.set_super_selection(Some(container))?;
        }
        let children = self.tree().children(container).to_vec();
        if children.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.set_selection(&children)?;
        Ok(Outcome::Done)
    }

    /// Super-select a page, making it the active page.
    pub fn set_active_page(&mut self, page: NodeId) -> EditorResult<()> {
        let tree = self.tree();
        let node = tree.node(page)?;
        if node.kind != NodeKind::Page || node.parent() != Some(tree.root()) {
            return Err(EditorError::WrongKind {
                node: page,
                expected: NodeKind::Page.to_string(),
                actual: node.kind.to_string(),
            });
        }
        self.set_super_selection(Some(page))?;
        self.process_changes();
        Ok(())
    }

    /// Drop selection entries that no longer hang off the root.
    fn prune_selection(&mut self) {
        let tree = self.scene.tree();
        let mut keep = 1;
        while keep < self.selection.path.len()
            && tree.parent(self.selection.path[keep]) == Some(self.selection.path[keep - 1])
        {
            keep += 1;
        }
        self.selection.path.truncate(keep.min(self.selection.path.len()));
        if self.selection.path.is_empty() {
            self.selection.path.push(tree.root());
        }
        let container = self.selection.super_selected();
        self.selection
            .selected
            .retain(|id| tree.parent(*id) == Some(container));
    }

    // ----- hit testing -----

    /// Node under a root point a click should act on.
    ///
    /// The search starts in the super-selected container and widens
    /// outward, never past the active page. A hit on an ancestor chain
    /// child is replaced by a sibling drawn above it at the point.
    pub fn hit_test(&self, point: Point) -> NodeId {
        let tree = self.tree();
        let page = tree.active_page();
        let mut container = self.selection.super_selected();
        if container == tree.root() || !tree.is_attached(container) {
            container = page;
        }

        let mut found = None;
        let mut cur = Some(container);
        while let Some(c) = cur {
            if let Ok(local) = tree.point_to_local(c, point) {
                if let Some(hit) = tree.child_at_point(c, local) {
                    found = Some(hit);
                    break;
                }
            }
            if c == page || c == tree.root() {
                break;
            }
            cur = tree.parent(c);
        }

        let Some(mut hit) = found else {
            return page;
        };

        // a sibling of an outer chain node may cover the hit
        let mut node = hit;
        while let Some(parent) = tree.parent(node) {
            if node == page || parent == tree.root() {
                break;
            }
            if let Ok(local) = tree.point_to_local(parent, point) {
                if let Some(top) = tree.child_at_point(parent, local) {
                    let above = match (tree.child_index(top), tree.child_index(node)) {
                        (Some(t), Some(n)) => t > n,
                        _ => false,
                    };
                    if top != node && above {
                        hit = top;
                    }
                }
            }
            if parent == page {
                break;
            }
            node = parent;
        }
        hit
    }

    // ----- change processing and undo -----

    /// Title the next undo transaction. Uncommitted changes under another
    /// title are committed first.
    pub fn begin_edit(&mut self, title: &str) {
        self.process_changes();
        if self.undoer.has_changes() && self.undoer.title() != title {
            self.commit_undo();
        }
        if !self.undoer.has_changes() {
            self.undoer.set_title(title);
            self.session.edit_selection = Some(self.selection.memo());
        }
    }

    /// Like `begin_edit`, but joins an open transaction whatever its title.
    pub(crate) fn join_edit(&mut self, title: &str) {
        if !self.undoer.has_changes() && !self.scene.tree().has_changes() {
            self.undoer.set_title(title);
            self.session.edit_selection = Some(self.selection.memo());
        }
    }

    /// Flush the scene graph into the undo transaction and repaint events.
    pub fn process_changes(&mut self) {
        let update = self.scene.flush();
        let mut added = false;
        for change in update.changes {
            added |= self.record_change(change);
        }
        if added {
            self.session.pending.schedule(PendingTask::CommitUndo);
        }
        if let Some(region) = update.repaint {
            self.emit(EditorEvent::RepaintRequested {
                region: Some(region),
            });
        }
        if update.repaint_all {
            self.emit(EditorEvent::RepaintRequested { region: None });
        }
    }

    fn record_change(&mut self, change: PropertyChange) -> bool {
        if change.property.is_housekeeping() && !self.undoer.has_changes() {
            return false;
        }
        if !self.undoer.has_changes() {
            let memo = self
                .session
                .edit_selection
                .take()
                .unwrap_or_else(|| self.selection.memo());
            self.undoer.set_undo_selection(memo);
            if self.undoer.title().is_empty() {
                self.undoer.set_title("Edit");
            }
            let title = self.undoer.title().to_string();
            tracing::debug!(title = %title, "Opened undo transaction");
            self.emit(EditorEvent::UndoTransactionOpened { title });
        }
        self.undoer.add_change(change);
        true
    }

    /// Commit the active transaction now.
    pub fn commit_undo(&mut self) {
        self.process_changes();
        self.session.pending.clear();
        self.session.edit_selection = None;
        if let Some((title, changes)) = self.undoer.save_changes(self.selection.memo()) {
            tracing::info!(title = %title, changes, "Committed undo transaction");
            self.emit(EditorEvent::UndoTransactionCommitted { title, changes });
        }
    }

    /// End a discrete action. Outside a pointer gesture its changes are
    /// committed as their own undo step.
    pub(crate) fn finish_edit(&mut self) {
        self.process_changes();
        let _ = self.run_pending();
    }

    /// Ticket for the scheduled deferred work, if any.
    pub fn pending_ticket(&self) -> Option<RunLaterTicket> {
        self.session
            .pending
            .is_pending()
            .then(|| self.session.pending.ticket())
    }

    /// Run deferred work. Held back while a pointer button is down.
    pub fn run_pending(&mut self) -> Outcome {
        if self.session.mouse_down {
            return Outcome::NothingToDo;
        }
        match self.session.pending.take() {
            Some(task) => {
                self.run_task(task);
                Outcome::Done
            }
            None => Outcome::NothingToDo,
        }
    }

    /// Run deferred work named by a ticket; stale tickets do nothing.
    pub fn run_later(&mut self, ticket: RunLaterTicket) -> Outcome {
        if self.session.mouse_down {
            return Outcome::NothingToDo;
        }
        match self.session.pending.take_for(ticket) {
            Some(task) => {
                self.run_task(task);
                Outcome::Done
            }
            None => Outcome::NothingToDo,
        }
    }

    fn run_task(&mut self, task: PendingTask) {
        match task {
            PendingTask::CommitUndo => self.commit_undo(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undoer.can_undo() || self.undoer.has_changes() || self.scene.tree().has_changes()
    }

    pub fn can_redo(&self) -> bool {
        self.undoer.can_redo()
    }

    pub fn undo(&mut self) -> EditorResult<Outcome> {
        self.commit_undo();
        let (changes, memo, title) = match self.undoer.undo() {
            Some(set) => (set.changes.clone(), set.undo_selection.clone(), set.title.clone()),
            None => return Ok(Outcome::NothingToDo),
        };
        tracing::info!(title = %title, "Undo");
        let inverses: Vec<PropertyChange> = changes.iter().rev().map(|c| c.inverse()).collect();
        self.replay(&inverses, memo);
        Ok(Outcome::Done)
    }

    pub fn redo(&mut self) -> EditorResult<Outcome> {
        self.commit_undo();
        let (changes, memo, title) = match self.undoer.redo() {
            Some(set) => (set.changes.clone(), set.redo_selection.clone(), set.title.clone()),
            None => return Ok(Outcome::NothingToDo),
        };
        tracing::info!(title = %title, "Redo");
        self.replay(&changes, memo);
        Ok(Outcome::Done)
    }

    fn replay(&mut self, changes: &[PropertyChange], memo: SelectionMemo) {
        let was_recording = self.tree_mut().set_recording(false);
        for change in changes {
            if let Err(e) = self.tree_mut().apply_change(change) {
                tracing::warn!(node = %change.node, property = ?change.property, error = %e, "Failed to replay change");
            }
        }
        self.tree_mut().set_recording(was_recording);
        self.restore_selection(memo);
        // selection restore records housekeeping only; drop it
        let _ = self.tree_mut().take_changes();
        self.process_changes();
    }

    fn restore_selection(&mut self, memo: SelectionMemo) {
        let hooks = std::mem::replace(&mut self.session.hooks_enabled, false);
        self.prune_selection();
        let restored = match memo {
            SelectionMemo::Selected(nodes) => {
                let nodes: Vec<NodeId> = nodes
                    .into_iter()
                    .filter(|id| self.tree().is_attached(*id))
                    .collect();
                !nodes.is_empty() && self.set_selection(&nodes).is_ok()
            }
            SelectionMemo::SuperSelected(node) => {
                self.tree().is_attached(node) && self.set_super_selection(Some(node)).is_ok()
            }
            SelectionMemo::None => false,
        };
        if !restored {
            if let Err(e) = self.set_super_selection(None) {
                tracing::warn!(error = %e, "Could not restore selection");
            }
        }
        self.session.hooks_enabled = hooks;
    }

    // ----- snapping and guides -----

    pub fn guides(&self) -> &[Guide] {
        &self.session.guides
    }

    pub fn set_proximity_guides_enabled(&mut self, enabled: bool) {
        self.session.proximity_guides_enabled = enabled;
        if !enabled {
            self.session.guides.clear();
        }
    }

    /// Bounds snapping acts on, in the super-selected container's
    /// coordinates. `Move` uses the selection bounds, `Resize` a zero-size
    /// box at the point.
    fn snap_subject(&self, local: Point, mode: SnapMode) -> Option<Rect> {
        match mode {
            SnapMode::Move => Rect::union_all(
                self.selection
                    .selected
                    .iter()
                    .map(|id| self.tree().bounds_in_parent(*id)),
            ),
            SnapMode::Resize => Some(Rect::new(local.x, local.y, 0.0, 0.0)),
        }
    }

    fn proximity_offset(&self, bounds: &Rect) -> Point {
        let container = self.selection.super_selected();
        let candidates = guides::candidate_bounds(self.tree(), container, &self.selection.selected);
        guides::snap_offset(bounds, &candidates, self.config.snapping.proximity_threshold)
    }

    fn grid_offset(&self, bounds: &Rect) -> Point {
        let spacing = self.config.snapping.grid_spacing;
        if spacing <= 0.0 {
            return Point::ZERO;
        }
        let snap = |v: f64| (v / spacing).round() * spacing - v;
        Point::new(snap(bounds.x), snap(bounds.y))
    }

    fn snap_with(&self, point: Point, mode: SnapMode, grid: bool, proximity: bool) -> Point {
        let container = self.selection.super_selected();
        let Ok(local) = self.tree().point_to_local(container, point) else {
            return point;
        };
        let Some(bounds) = self.snap_subject(local, mode) else {
            return point;
        };
        let mut offset = Point::ZERO;
        if grid {
            offset = self.grid_offset(&bounds);
        }
        if proximity {
            offset = offset + self.proximity_offset(&bounds.translated(offset.x, offset.y));
        }
        self.tree().point_to_root(container, local + offset)
    }

    /// Snap a root point so the dragged edges align with nearby siblings.
    pub fn point_snapped_to_proximity_guides(&self, point: Point, mode: SnapMode) -> Point {
        if !self.session.proximity_guides_enabled {
            return point;
        }
        self.snap_with(point, mode, false, true)
    }

    pub fn point_snapped_to_grid(&self, point: Point, mode: SnapMode) -> Point {
        self.snap_with(point, mode, true, false)
    }

    /// Snapping applied during drags: grid first, then proximity guides.
    /// Holding control disables both.
    pub(crate) fn snapped_drag_point(
        &self,
        point: Point,
        mode: SnapMode,
        modifiers: Modifiers,
    ) -> Point {
        if modifiers.suppresses_snap() {
            return point;
        }
        let grid = self.config.snapping.snap_to_grid;
        let proximity = self.session.proximity_guides_enabled;
        if !grid && !proximity {
            return point;
        }
        self.snap_with(point, mode, grid, proximity)
    }

    /// Recompute guides for the current drag.
    pub(crate) fn update_guides(&mut self, mode: SnapMode, point: Point) {
        self.session.guides.clear();
        if !self.session.proximity_guides_enabled {
            return;
        }
        let container = self.selection.super_selected();
        let Ok(local) = self.tree().point_to_local(container, point) else {
            return;
        };
        let Some(bounds) = self.snap_subject(local, mode) else {
            return;
        };
        let candidates = guides::candidate_bounds(self.tree(), container, &self.selection.selected);
        self.session.guides =
            guides::guides_for(&bounds, &candidates, self.config.snapping.proximity_threshold);
    }

    pub(crate) fn clear_guides(&mut self) {
        if !self.session.guides.is_empty() {
            self.session.guides.clear();
            self.emit(EditorEvent::RepaintRequested { region: None });
        }
    }

    // ----- node creation -----

    /// Nearest container at or above the super-selected node that accepts
    /// new shapes; the active page when that would be the root.
    pub fn insertion_container(&self) -> NodeId {
        let tree = self.tree();
        let mut cur = self.selection.super_selected();
        loop {
            if cur == tree.root() || !tree.contains(cur) {
                return tree.active_page();
            }
            if tree.capabilities(cur).accepts_children {
                return cur;
            }
            match tree.parent(cur) {
                Some(p) => cur = p,
                None => return tree.active_page(),
            }
        }
    }

    /// Create a node of `kind` with a frame in `container`'s coordinates
    /// and append it there.
    pub(crate) fn insert_new_node(
        &mut self,
        kind: NodeKind,
        frame: Rect,
        container: NodeId,
    ) -> EditorResult<NodeId> {
        let mut node = ShapeNode::new(kind).with_frame(frame);
        if kind == NodeKind::Text {
            node.font_size = self.config.editor.default_font_size;
        }
        let tree = self.tree_mut();
        let id = tree.create_node(node);
        tree.add_child(container, id)?;
        tracing::debug!(node = %id, kind = %kind, "Inserted node");
        Ok(id)
    }

    // ----- pointer input -----

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current
    }

    /// Switch tools, cancelling any gesture of the previous tool.
    pub fn set_tool(&mut self, kind: ToolKind) {
        self.tools.current_mut().reset();
        self.tools.switch_to(kind);
        tracing::debug!(tool = ?kind, "Tool changed");
    }

    /// Ask for a tool switch once the current event has been handled.
    pub(crate) fn request_tool(&mut self, kind: ToolKind) {
        self.requested_tool = Some(kind);
    }

    fn with_tool<F>(&mut self, f: F) -> EditorResult<()>
    where
        F: FnOnce(&mut dyn Tool, &mut Editor) -> EditorResult<()>,
    {
        let mut tools = std::mem::take(&mut self.tools);
        let result = f(tools.current_mut(), self);
        self.tools = tools;
        if let Some(kind) = self.requested_tool.take() {
            self.set_tool(kind);
        }
        self.process_changes();
        result
    }

    /// Starts a gesture. Work left over from earlier actions is committed
    /// first so the gesture gets its own undo step.
    pub fn mouse_pressed(&mut self, event: &PointerEvent) -> EditorResult<()> {
        self.finish_edit();
        self.session.mouse_down = true;
        self.with_tool(|tool, editor| tool.mouse_pressed(editor, event))
    }

    pub fn mouse_dragged(&mut self, event: &PointerEvent) -> EditorResult<()> {
        self.with_tool(|tool, editor| tool.mouse_dragged(editor, event))
    }

    pub fn mouse_moved(&mut self, event: &PointerEvent) -> EditorResult<()> {
        self.with_tool(|tool, editor| tool.mouse_moved(editor, event))
    }

    /// Ends the gesture and runs deferred work held back during it.
    pub fn mouse_released(&mut self, event: &PointerEvent) -> EditorResult<()> {
        let result = self.with_tool(|tool, editor| tool.mouse_released(editor, event));
        self.session.mouse_down = false;
        self.clear_guides();
        let _ = self.run_pending();
        result
    }

    pub fn pending_marquee(&self) -> Option<&[NodeId]> {
        self.tools.select.pending()
    }
}
