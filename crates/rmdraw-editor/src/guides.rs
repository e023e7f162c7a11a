//! Proximity guides: alignment lines and snapping against sibling edges.
//!
//! All geometry here is in the local coordinates of the container whose
//! children are being dragged.

use rmdraw_core::{NodeId, Point, Rect, EPSILON};

use crate::shape::ShapeTree;

/// Which edge of the dragged bounds a guide aligns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideEdge {
    Left,
    Right,
    Top,
    Bottom,
}

/// A guide line segment in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub edge: GuideEdge,
    pub start: Point,
    pub end: Point,
}

/// What a snapped point stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapMode {
    /// The point drags the whole selection bounds.
    Move,
    /// The point is a resize handle, snapped as a zero-size proxy.
    Resize,
}

#[derive(Debug, Clone, Copy)]
struct EdgeMatch {
    /// Signed offset from the dragged edge to the candidate coordinate.
    delta: f64,
    coord: f64,
    /// Distance between the boxes on the perpendicular axis.
    gap: f64,
    span_min: f64,
    span_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

fn edges(r: &Rect, axis: Axis) -> [f64; 2] {
    match axis {
        Axis::X => [r.min_x(), r.max_x()],
        Axis::Y => [r.min_y(), r.max_y()],
    }
}

fn cross_range(r: &Rect, axis: Axis) -> (f64, f64) {
    match axis {
        Axis::X => (r.min_y(), r.max_y()),
        Axis::Y => (r.min_x(), r.max_x()),
    }
}

fn best_match(
    edge: f64,
    axis: Axis,
    bounds: &Rect,
    candidates: &[Rect],
    threshold: f64,
) -> Option<EdgeMatch> {
    let (b_min, b_max) = cross_range(bounds, axis);
    let mut best: Option<EdgeMatch> = None;
    for c in candidates {
        let (c_min, c_max) = cross_range(c, axis);
        let gap = (c_min - b_max).max(b_min - c_max).max(0.0);
        for coord in edges(c, axis) {
            let delta = coord - edge;
            if delta.abs() > threshold {
                continue;
            }
            let candidate = EdgeMatch {
                delta,
                coord,
                gap,
                span_min: b_min.min(c_min),
                span_max: b_max.max(c_max),
            };
            best = Some(match best {
                None => candidate,
                Some(cur) if delta.abs() < cur.delta.abs() - EPSILON => candidate,
                Some(cur) if (delta.abs() - cur.delta.abs()).abs() <= EPSILON => {
                    if (coord - cur.coord).abs() <= EPSILON {
                        EdgeMatch {
                            gap: cur.gap.min(gap),
                            span_min: cur.span_min.min(candidate.span_min),
                            span_max: cur.span_max.max(candidate.span_max),
                            ..cur
                        }
                    } else if gap < cur.gap {
                        candidate
                    } else {
                        cur
                    }
                }
                Some(cur) => cur,
            });
        }
    }
    best
}

struct Matches {
    left: Option<EdgeMatch>,
    right: Option<EdgeMatch>,
    top: Option<EdgeMatch>,
    bottom: Option<EdgeMatch>,
}

fn matches(bounds: &Rect, candidates: &[Rect], threshold: f64) -> Matches {
    Matches {
        left: best_match(bounds.min_x(), Axis::X, bounds, candidates, threshold),
        right: best_match(bounds.max_x(), Axis::X, bounds, candidates, threshold),
        top: best_match(bounds.min_y(), Axis::Y, bounds, candidates, threshold),
        bottom: best_match(bounds.max_y(), Axis::Y, bounds, candidates, threshold),
    }
}

/// Offset that aligns the nearest edges of `bounds` with candidate edges.
///
/// On X a tie between the left and right offsets goes to the left edge; on
/// Y a tie between top and bottom goes to the bottom edge.
pub fn snap_offset(bounds: &Rect, candidates: &[Rect], threshold: f64) -> Point {
    let m = matches(bounds, candidates, threshold);
    let dx = match (m.left, m.right) {
        (Some(l), Some(r)) => {
            if l.delta.abs() <= r.delta.abs() {
                l.delta
            } else {
                r.delta
            }
        }
        (Some(l), None) => l.delta,
        (None, Some(r)) => r.delta,
        (None, None) => 0.0,
    };
    let dy = match (m.top, m.bottom) {
        (Some(t), Some(b)) => {
            if t.delta.abs() < b.delta.abs() {
                t.delta
            } else {
                b.delta
            }
        }
        (Some(t), None) => t.delta,
        (None, Some(b)) => b.delta,
        (None, None) => 0.0,
    };
    Point::new(dx, dy)
}

/// Up to four guide segments for `bounds`.
pub fn guides_for(bounds: &Rect, candidates: &[Rect], threshold: f64) -> Vec<Guide> {
    let m = matches(bounds, candidates, threshold);
    let vertical = |edge, e: EdgeMatch| Guide {
        edge,
        start: Point::new(e.coord, e.span_min),
        end: Point::new(e.coord, e.span_max),
    };
    let horizontal = |edge, e: EdgeMatch| Guide {
        edge,
        start: Point::new(e.span_min, e.coord),
        end: Point::new(e.span_max, e.coord),
    };
    let mut out = Vec::with_capacity(4);
    if let Some(e) = m.left {
        out.push(vertical(GuideEdge::Left, e));
    }
    if let Some(e) = m.right {
        out.push(vertical(GuideEdge::Right, e));
    }
    if let Some(e) = m.top {
        out.push(horizontal(GuideEdge::Top, e));
    }
    if let Some(e) = m.bottom {
        out.push(horizontal(GuideEdge::Bottom, e));
    }
    out
}

/// Candidate rectangles: every child of `container` not in `exclude`,
/// plus the container's own bounds unless it is the document root.
pub fn candidate_bounds(tree: &ShapeTree, container: NodeId, exclude: &[NodeId]) -> Vec<Rect> {
    let mut out: Vec<Rect> = tree
        .children(container)
        .iter()
        .filter(|c| !exclude.contains(c))
        .map(|c| tree.bounds_in_parent(*c))
        .collect();
    if container != tree.root() {
        if let Some(node) = tree.get(container) {
            out.push(node.local_bounds());
        }
    }
    out
}
