#![warn(missing_docs)]

//! Math types for the ocam kernel.
//!
//! Thin wrappers around nalgebra providing the value types shared by the
//! octree and drop-cutter crates: points, vectors, triangles, bounding
//! boxes and the tolerance used for boundary tests.

mod bbox;
mod triangle;

pub use bbox::BoundingBox;
pub use triangle::Triangle;

use nalgebra::Vector3;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Linear tolerance for geometric comparisons.
///
/// All boundary tests in the kernel are inclusive within `linear`: a cutter
/// of radius `r` touches geometry at horizontal distance `r + linear`, a
/// point on a facet edge is inside the facet, and a normal whose z component
/// is below `linear` is vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
}

impl Tolerance {
    /// Default kernel tolerance (1e-9).
    pub const DEFAULT: Self = Self { linear: 1e-9 };

    /// Check if a scalar is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if distance `d` is within `reach`, boundary included.
    pub fn within(&self, d: f64, reach: f64) -> bool {
        d <= reach + self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Horizontal (xy) length of a vector.
pub fn xy_norm(v: &Vec3) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Horizontal (xy) distance between two points, ignoring z.
pub fn xy_distance(a: &Point3, b: &Point3) -> f64 {
    xy_norm(&(b - a))
}

/// Closest point to `p` on the infinite xy line through `p1` and `p2`.
///
/// The returned point lies on the 3D line, so its z is interpolated along
/// the segment direction. Returns `None` when `p1` and `p2` coincide in xy.
pub fn xy_closest_point_on_line(p: &Point3, p1: &Point3, p2: &Point3) -> Option<Point3> {
    let v = p2 - p1;
    let len_sq = v.x * v.x + v.y * v.y;
    if len_sq < Tolerance::DEFAULT.linear * Tolerance::DEFAULT.linear {
        return None;
    }
    let t = ((p.x - p1.x) * v.x + (p.y - p1.y) * v.y) / len_sq;
    Some(p1 + t * v)
}
