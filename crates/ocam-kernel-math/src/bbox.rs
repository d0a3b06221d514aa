//! Axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

use crate::Point3;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundingBox {
    /// Create a box from two corners. The corners are sorted per axis.
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// The smallest box containing all `points`, or `None` if empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bb.add_point(p);
        }
        Some(bb)
    }

    /// A cube centered at `center` with half-width `half`.
    pub fn cube(center: Point3, half: f64) -> Self {
        Self {
            min: Point3::new(center.x - half, center.y - half, center.z - half),
            max: Point3::new(center.x + half, center.y + half, center.z + half),
        }
    }

    /// Grow the box to include `p`.
    pub fn add_point(&mut self, p: &Point3) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Check if two boxes overlap in 3D (touching counts).
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.overlaps_xy(other) && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Check if the xy projections of two boxes overlap (touching counts).
    pub fn overlaps_xy(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Return a copy grown by `d` in x and y.
    pub fn expanded_xy(&self, d: f64) -> Self {
        Self {
            min: Point3::new(self.min.x - d, self.min.y - d, self.min.z),
            max: Point3::new(self.max.x + d, self.max.y + d, self.max.z),
        }
    }
}
