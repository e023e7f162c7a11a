//! Node properties and the change records the undo pipeline consumes.

use rmdraw_core::{NodeId, Point, Size};
use serde::{Deserialize, Serialize};

/// Every mutable attribute of a shape node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    X,
    Y,
    Width,
    Height,
    Roll,
    ScaleX,
    ScaleY,
    SkewX,
    SkewY,
    Fill,
    Stroke,
    Locked,
    Hittable,
    Name,
    Text,
    FontSize,
    TextCaret,
    Points,
    ImageSource,
    ImageNaturalSize,
    SelectedPageIndex,
    /// Structural change: a child inserted at or removed from `index`.
    Child { index: usize },
}

impl Property {
    /// Properties that do not open an undo transaction on their own.
    pub fn is_housekeeping(&self) -> bool {
        matches!(
            self,
            Property::SelectedPageIndex | Property::TextCaret | Property::ImageNaturalSize
        )
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Property::Child { .. })
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    Bool(bool),
    Text(String),
    /// Optional string: paint names and image sources.
    OptionalText(Option<String>),
    Points(Vec<Point>),
    Size(Option<Size>),
    Index(usize),
    Node(Option<NodeId>),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// One recorded property change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub node: NodeId,
    pub property: Property,
    pub old: PropertyValue,
    pub new: PropertyValue,
}

impl PropertyChange {
    pub fn new(node: NodeId, property: Property, old: PropertyValue, new: PropertyValue) -> Self {
        Self {
            node,
            property,
            old,
            new,
        }
    }

    /// Change that reverts this one
    pub fn inverse(&self) -> Self {
        Self {
            node: self.node,
            property: self.property,
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}
