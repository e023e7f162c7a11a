//! Error types for the editor crate.
//!
//! `TreeError` covers structural failures of the shape tree. `EditorError`
//! wraps it and adds selection preconditions. Expected no-op conditions
//! (nothing to undo, empty selection, popping at the root) are not errors;
//! they are reported as [`Outcome::NothingToDo`].

use rmdraw_core::{GeometryError, NodeId};
use thiserror::Error;

use crate::property::Property;

/// Errors raised by shape tree mutation and lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// No node with this id exists in the arena.
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    /// The node would become its own ancestor.
    #[error("Adding {child} to {parent} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },

    /// The parent does not accept this child.
    #[error("{parent} does not accept {kind} children")]
    NotAContainer { parent: NodeId, kind: String },

    /// The child already has a parent.
    #[error("Node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),

    /// Child index past the end of the child list.
    #[error("Child index {index} out of bounds for {parent} ({len} children)")]
    ChildIndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    /// The node is not connected to the document root.
    #[error("Node {0} is detached from the document")]
    Detached(NodeId),

    /// A coordinate conversion failed or a geometric value was rejected.
    #[error("Geometry of {node}: {source}")]
    Geometry {
        node: NodeId,
        #[source]
        source: GeometryError,
    },

    /// The value type does not match the property.
    #[error("Invalid value for {property:?} on {node}")]
    InvalidValue { node: NodeId, property: Property },
}

/// Errors raised by editor operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Tree error
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Nodes passed to `set_selection` do not share one parent.
    #[error("Selection nodes have different parents ({first} and {other})")]
    MixedParents { first: NodeId, other: NodeId },

    /// An operation needed a node of a different kind.
    #[error("Node {node} is a {actual}, expected {expected}")]
    WrongKind {
        node: NodeId,
        expected: String,
        actual: String,
    },

    /// The selection state broke one of its invariants.
    #[error("Inconsistent selection: {0}")]
    InconsistentSelection(String),
}

impl From<EditorError> for rmdraw_core::Error {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Tree(TreeError::Geometry { source, .. }) => {
                rmdraw_core::Error::Geometry(source)
            }
            other => rmdraw_core::Error::other(other.to_string()),
        }
    }
}

/// Result type alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Result type alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Result of a user-level operation that may legitimately do nothing.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation changed editor state.
    Done,
    /// Nothing happened; the host may beep.
    NothingToDo,
}

impl Outcome {
    pub fn is_noop(self) -> bool {
        self == Outcome::NothingToDo
    }
}
