//! Resize handles: four corners and four edge midpoints.

use rmdraw_core::{NodeId, Point};

use crate::error::TreeResult;
use crate::property::Property;
use crate::shape::ShapeTree;

/// Smallest width or height magnitude a handle drag may produce.
pub const MIN_HANDLE_EXTENT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NorthWest,
        Handle::North,
        Handle::NorthEast,
        Handle::East,
        Handle::SouthEast,
        Handle::South,
        Handle::SouthWest,
        Handle::West,
    ];

    pub fn opposite(self) -> Handle {
        match self {
            Handle::NorthWest => Handle::SouthEast,
            Handle::North => Handle::South,
            Handle::NorthEast => Handle::SouthWest,
            Handle::East => Handle::West,
            Handle::SouthEast => Handle::NorthWest,
            Handle::South => Handle::North,
            Handle::SouthWest => Handle::NorthEast,
            Handle::West => Handle::East,
        }
    }

    fn moves_min_x(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::West | Handle::SouthWest)
    }

    fn moves_max_x(self) -> bool {
        matches!(self, Handle::NorthEast | Handle::East | Handle::SouthEast)
    }

    fn moves_min_y(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::North | Handle::NorthEast)
    }

    fn moves_max_y(self) -> bool {
        matches!(self, Handle::SouthWest | Handle::South | Handle::SouthEast)
    }

    /// Handle position in local coordinates of a `width` x `height` frame.
    pub fn local_point(self, width: f64, height: f64) -> Point {
        let x = if self.moves_min_x() {
            0.0
        } else if self.moves_max_x() {
            width
        } else {
            width / 2.0
        };
        let y = if self.moves_min_y() {
            0.0
        } else if self.moves_max_y() {
            height
        } else {
            height / 2.0
        };
        Point::new(x, y)
    }
}

fn floor_extent(value: f64) -> f64 {
    if value.abs() < MIN_HANDLE_EXTENT {
        if value < 0.0 {
            -MIN_HANDLE_EXTENT
        } else {
            MIN_HANDLE_EXTENT
        }
    } else {
        value
    }
}

/// Handle of `id` under a root point, if any.
pub fn handle_at_point(
    tree: &ShapeTree,
    id: NodeId,
    root_point: Point,
    handle_size: f64,
) -> Option<Handle> {
    let node = tree.get(id)?;
    let to_root = tree.transform_to_root(id);
    Handle::ALL.into_iter().find(|handle| {
        let p = to_root.apply(handle.local_point(node.width, node.height));
        (p.x - root_point.x).abs() <= handle_size && (p.y - root_point.y).abs() <= handle_size
    })
}

/// Drag `handle` of `id` to a root point.
///
/// The new extent is floored at [`MIN_HANDLE_EXTENT`] with its sign kept,
/// so a frame can flip through zero. The opposite handle stays fixed in
/// parent coordinates.
pub fn move_handle(
    tree: &mut ShapeTree,
    id: NodeId,
    handle: Handle,
    root_point: Point,
) -> TreeResult<()> {
    let node = tree.node(id)?;
    let (w, h) = (node.width, node.height);
    let before = node.transform();
    let target = tree.transform_from_root(id)?.apply(root_point);

    let p1 = handle.local_point(w, h);
    let dx = target.x - p1.x;
    let dy = target.y - p1.y;

    let mut nw = w;
    let mut nh = h;
    if handle.moves_min_x() {
        nw = w - dx;
    } else if handle.moves_max_x() {
        nw = w + dx;
    }
    if handle.moves_min_y() {
        nh = h - dy;
    } else if handle.moves_max_y() {
        nh = h + dy;
    }
    let nw = floor_extent(nw);
    let nh = floor_extent(nh);

    let opposite = handle.opposite();
    let anchor_before = before.apply(opposite.local_point(w, h));

    tree.set_number(id, Property::Width, nw)?;
    tree.set_number(id, Property::Height, nh)?;
    let after = tree.node(id)?.transform();
    let anchor_after = after.apply(opposite.local_point(nw, nh));

    let node = tree.node(id)?;
    let (x, y) = (node.x, node.y);
    tree.set_number(id, Property::X, x + anchor_before.x - anchor_after.x)?;
    tree.set_number(id, Property::Y, y + anchor_before.y - anchor_after.y)?;
    Ok(())
}
