//! Affine transforms between node coordinate spaces.

use super::{Point, Rect};
use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// 2D affine transform.
///
/// Maps `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `degrees`, clockwise on a Y-down page.
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Skew by angles in degrees along each axis.
    pub fn skew(skew_x: f64, skew_y: f64) -> Self {
        Self {
            b: skew_y.to_radians().tan(),
            c: skew_x.to_radians().tan(),
            ..Self::IDENTITY
        }
    }

    /// Returns `self * rhs`: `rhs` is applied first, then `self`.
    pub fn multiply(&self, rhs: &Transform) -> Transform {
        Transform {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform. Degenerate transforms fail with
    /// `GeometryError::SingularTransform`.
    pub fn inverse(&self) -> Result<Transform, GeometryError> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return Err(GeometryError::SingularTransform { determinant: det });
        }
        let inv = 1.0 / det;
        Ok(Transform {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            tx: (self.c * self.ty - self.d * self.tx) * inv,
            ty: (self.b * self.tx - self.a * self.ty) * inv,
        })
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Maps a rectangle's corners.
    pub fn apply_quad(&self, r: &Rect) -> Quad {
        let [p0, p1, p2, p3] = r.corners();
        Quad([self.apply(p0), self.apply(p1), self.apply(p2), self.apply(p3)])
    }

    /// Axis-aligned bounds of a mapped rectangle.
    pub fn apply_rect(&self, r: &Rect) -> Rect {
        self.apply_quad(r).bounds()
    }

    /// Rotation component in degrees. Exact for rigid transforms.
    pub fn rotation_degrees(&self) -> f64 {
        self.b.atan2(self.a).to_degrees()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Four corners of a transformed rectangle, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn bounds(&self) -> Rect {
        // four points always produce a bounding box
        Rect::bounding(&self.0).unwrap_or_default()
    }

    /// Separating-axis overlap test against an axis-aligned rectangle.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if !self.bounds().intersects(rect) {
            return false;
        }
        let rect_pts = rect.corners();
        for i in 0..4 {
            let p = self.0[i];
            let q = self.0[(i + 1) % 4];
            let axis = Point::new(-(q.y - p.y), q.x - p.x);
            if axis.x.abs() < 1e-12 && axis.y.abs() < 1e-12 {
                continue;
            }
            let (qmin, qmax) = project(&self.0, axis);
            let (rmin, rmax) = project(&rect_pts, axis);
            if qmax < rmin || rmax < qmin {
                return false;
            }
        }
        true
    }
}

fn project(points: &[Point; 4], axis: Point) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        let v = p.x * axis.x + p.y * axis.y;
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}
