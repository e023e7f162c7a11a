//! # RMDraw Core
//!
//! Core types shared by every RMDraw crate:
//! geometry primitives, arena identifiers for shape nodes, editor
//! notification events and the unified error type.

pub mod error;
pub mod events;
pub mod geometry;
pub mod ids;

pub use error::{Error, GeometryError, Result};
pub use events::{
    EditorEvent, EventCategory, EventDispatcher, EventFilter, LoadTicket, SubscriptionId,
};
pub use geometry::{Point, Quad, Rect, Size, Transform};
pub use ids::NodeId;

/// Tolerance used for floating point comparisons on document coordinates.
pub const EPSILON: f64 = 1e-9;
