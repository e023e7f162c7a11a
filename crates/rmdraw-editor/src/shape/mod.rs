//! Shape nodes and the document tree.

mod tree;

pub use tree::ShapeTree;

use rmdraw_core::{NodeId, Point, Rect, Size, Transform};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Document,
    Page,
    Rectangle,
    Oval,
    Line,
    Polygon,
    Text,
    Image,
    Group,
    Switch,
}

impl NodeKind {
    /// Static capability table.
    ///
    /// Rectangles become super-selectable once they have children; see
    /// [`ShapeTree::capabilities`].
    pub fn capabilities(self) -> Capabilities {
        let (accepts_children, children_super_select_immediately, super_selectable) = match self {
            NodeKind::Document => (true, true, true),
            NodeKind::Page => (true, false, true),
            NodeKind::Rectangle => (true, false, false),
            NodeKind::Oval | NodeKind::Line | NodeKind::Polygon | NodeKind::Image => {
                (false, false, false)
            }
            NodeKind::Text => (false, false, true),
            NodeKind::Group => (true, false, true),
            NodeKind::Switch => (true, true, true),
        };
        Capabilities {
            accepts_children,
            children_super_select_immediately,
            super_selectable,
        }
    }

    /// Whether a node of this kind may hold a child of `child` kind.
    pub fn accepts_child_kind(self, child: NodeKind) -> bool {
        match self {
            NodeKind::Document => child == NodeKind::Page,
            _ if child == NodeKind::Page || child == NodeKind::Document => false,
            _ => self.capabilities().accepts_children,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Page => "Page",
            NodeKind::Rectangle => "Rectangle",
            NodeKind::Oval => "Oval",
            NodeKind::Line => "Line",
            NodeKind::Polygon => "Polygon",
            NodeKind::Text => "Text",
            NodeKind::Image => "Image",
            NodeKind::Group => "Group",
            NodeKind::Switch => "Switch",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability flags of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub accepts_children: bool,
    /// Children become super-selected without an intermediate select step.
    pub children_super_select_immediately: bool,
    pub super_selectable: bool,
}

/// Child list; most nodes have few children.
pub type Children = SmallVec<[NodeId; 4]>;

/// A node in the document tree.
///
/// Geometry is relative to the parent. Frames may have negative width or
/// height after a handle drag flips them.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub kind: NodeKind,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees around the frame center.
    pub roll: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub locked: bool,
    pub hittable: bool,
    pub text: String,
    pub font_size: f64,
    /// Character index of the edit caret.
    pub caret: usize,
    /// Polygon vertices, normalized to the unit frame.
    pub points: Vec<Point>,
    pub image_source: Option<String>,
    pub natural_size: Option<Size>,
    /// Index of the active page; meaningful on the document root only.
    pub selected_page: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Children,
}

impl ShapeNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            roll: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            fill: None,
            stroke: None,
            locked: false,
            hittable: true,
            text: String::new(),
            font_size: 12.0,
            caret: 0,
            points: Vec::new(),
            image_source: None,
            natural_size: None,
            selected_page: 0,
            parent: None,
            children: Children::new(),
        }
    }

    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.x = frame.x;
        self.y = frame.y;
        self.width = frame.width;
        self.height = frame.height;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Frame in parent coordinates, ignoring rotation and scale.
    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Bounds in local coordinates.
    pub fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Local-to-parent transform.
    ///
    /// Rotation, scale and skew pivot around the frame center.
    pub fn transform(&self) -> Transform {
        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        if self.roll == 0.0
            && self.scale_x == 1.0
            && self.scale_y == 1.0
            && self.skew_x == 0.0
            && self.skew_y == 0.0
        {
            return Transform::translation(self.x, self.y);
        }
        Transform::translation(self.x + cx, self.y + cy)
            .multiply(&Transform::rotation(self.roll))
            .multiply(&Transform::scale(self.scale_x, self.scale_y))
            .multiply(&Transform::skew(self.skew_x, self.skew_y))
            .multiply(&Transform::translation(-cx, -cy))
    }

    pub fn is_rigid(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0 && self.skew_x == 0.0 && self.skew_y == 0.0
    }
}
