//! Undo/redo transactions of property changes.

use chrono::{DateTime, Utc};
use rmdraw_core::NodeId;
use uuid::Uuid;

use crate::property::PropertyChange;

/// Selection to restore when a transaction is undone or redone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionMemo {
    /// Nothing recorded; restoring falls back to the active page.
    #[default]
    None,
    /// These siblings were selected.
    Selected(Vec<NodeId>),
    /// Nothing was selected and this node was super-selected.
    SuperSelected(NodeId),
}

/// A titled batch of changes that undo treats as one step.
#[derive(Debug, Clone)]
pub struct UndoSet {
    pub id: Uuid,
    pub title: String,
    pub changes: Vec<PropertyChange>,
    pub undo_selection: SelectionMemo,
    pub redo_selection: SelectionMemo,
    pub opened_at: DateTime<Utc>,
}

impl UndoSet {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            changes: Vec::new(),
            undo_selection: SelectionMemo::None,
            redo_selection: SelectionMemo::None,
            opened_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Manages the active transaction and the undo/redo stacks
#[derive(Debug)]
pub struct Undoer {
    active: UndoSet,
    undo_stack: Vec<UndoSet>,
    redo_stack: Vec<UndoSet>,
    max_depth: usize,
}

impl Default for Undoer {
    fn default() -> Self {
        Self::new()
    }
}

impl Undoer {
    /// Create a new undoer with default depth (100)
    pub fn new() -> Self {
        Self::with_depth(100)
    }

    /// Create with custom maximum undo depth
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            active: UndoSet::new(),
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.active.title = title.into();
    }

    pub fn title(&self) -> &str {
        &self.active.title
    }

    pub fn active(&self) -> &UndoSet {
        &self.active
    }

    pub fn has_changes(&self) -> bool {
        !self.active.changes.is_empty()
    }

    pub fn set_undo_selection(&mut self, memo: SelectionMemo) {
        self.active.undo_selection = memo;
    }

    /// Append a change to the active transaction.
    ///
    /// A change to the same node and property as an earlier change, with
    /// no structural change in between, updates that change's new value.
    pub fn add_change(&mut self, change: PropertyChange) {
        if !change.property.is_structural() {
            for existing in self.active.changes.iter_mut().rev() {
                if existing.property.is_structural() {
                    break;
                }
                if existing.node == change.node && existing.property == change.property {
                    existing.new = change.new;
                    return;
                }
            }
        }
        self.active.changes.push(change);
    }

    /// Commit the active transaction. Returns its title and change count,
    /// or `None` when it was empty.
    pub fn save_changes(&mut self, redo_selection: SelectionMemo) -> Option<(String, usize)> {
        if self.active.is_empty() {
            return None;
        }
        let mut set = std::mem::replace(&mut self.active, UndoSet::new());
        set.redo_selection = redo_selection;
        let summary = (set.title.clone(), set.changes.len());
        tracing::debug!(title = %set.title, changes = set.changes.len(), "Committed undo set");

        self.redo_stack.clear();
        self.undo_stack.push(set);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        Some(summary)
    }

    /// Move the newest transaction to the redo stack and return it.
    pub fn undo(&mut self) -> Option<&UndoSet> {
        let set = self.undo_stack.pop()?;
        self.redo_stack.push(set);
        self.redo_stack.last()
    }

    /// Move the newest undone transaction back and return it.
    pub fn redo(&mut self) -> Option<&UndoSet> {
        let set = self.redo_stack.pop()?;
        self.undo_stack.push(set);
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Menu title such as "Undo Move"
    pub fn undo_title(&self) -> Option<String> {
        self.undo_stack.last().map(|s| format!("Undo {}", s.title))
    }

    pub fn redo_title(&self) -> Option<String> {
        self.redo_stack.last().map(|s| format!("Redo {}", s.title))
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history and the active transaction
    pub fn clear(&mut self) {
        self.active = UndoSet::new();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
