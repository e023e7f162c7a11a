//! # RMDraw Editor
//!
//! The editing core of RMDraw: an arena-backed shape tree, the
//! selection / super-selection state machine, the select tool's gesture
//! interpreter, creation tools, proximity guides and undo coalescing.
//!
//! All state is owned by one [`Editor`] and mutated on the caller's
//! thread. Hosts feed it pointer and key events and listen for
//! [`rmdraw_core::EditorEvent`]s.

pub mod editor;
pub mod error;
pub mod guides;
pub mod handlers;
pub mod handles;
pub mod input;
pub mod pending;
pub mod property;
pub mod scene_graph;
pub mod selection;
pub mod shape;
pub mod tools;
pub mod undo;

pub use editor::{DropPayload, Editor, SessionContext, DEFAULT_PAGE_SIZE};
pub use error::{EditorError, EditorResult, Outcome, TreeError, TreeResult};
pub use guides::{Guide, GuideEdge, SnapMode};
pub use handlers::{handler_for, NodeHandler};
pub use handles::Handle;
pub use input::{Key, KeyEvent, Modifiers, PointerEvent};
pub use pending::{PendingTask, RunLaterTicket};
pub use property::{Property, PropertyChange, PropertyValue};
pub use scene_graph::{SceneGraph, SceneUpdate};
pub use selection::SelectionState;
pub use shape::{Capabilities, NodeKind, ShapeNode, ShapeTree};
pub use tools::{DragMode, Tool, ToolKind};
pub use undo::{SelectionMemo, UndoSet, Undoer};
