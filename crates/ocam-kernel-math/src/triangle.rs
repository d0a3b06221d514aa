//! Triangles with cached normal and bounding box.

use crate::{BoundingBox, Point3, Tolerance, Vec3};

/// A triangle defined by its three vertices.
///
/// The unit normal and bounding box are computed once at construction.
/// Zero-area triangles (collinear or coincident vertices) are allowed but
/// have no normal; the drop-cutter treats them as non-interfering.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    p: [Point3; 3],
    normal: Option<Vec3>,
    bbox: BoundingBox,
}

impl Triangle {
    /// Create a new triangle from vertices.
    pub fn new(p0: Point3, p1: Point3, p2: Point3) -> Self {
        let n = (p1 - p0).cross(&(p2 - p0));
        let len = n.norm();
        let normal = if len > Tolerance::DEFAULT.linear {
            Some(n / len)
        } else {
            None
        };

        let mut bbox = BoundingBox { min: p0, max: p0 };
        bbox.add_point(&p1);
        bbox.add_point(&p2);

        Self {
            p: [p0, p1, p2],
            normal,
            bbox,
        }
    }

    /// The three vertices.
    pub fn vertices(&self) -> &[Point3; 3] {
        &self.p
    }

    /// The edges as vertex pairs `(p0, p1)`, `(p1, p2)`, `(p2, p0)`.
    pub fn edges(&self) -> [(Point3, Point3); 3] {
        [
            (self.p[0], self.p[1]),
            (self.p[1], self.p[2]),
            (self.p[2], self.p[0]),
        ]
    }

    /// Unit normal following the vertex winding, `None` if degenerate.
    pub fn normal(&self) -> Option<Vec3> {
        self.normal
    }

    /// Unit normal flipped so that its z component is non-negative.
    pub fn up_normal(&self) -> Option<Vec3> {
        self.normal.map(|n| if n.z < 0.0 { -n } else { n })
    }

    /// True if the triangle has (numerically) zero area.
    pub fn is_degenerate(&self) -> bool {
        self.normal.is_none()
    }

    /// Axis-aligned bounding box.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Highest vertex z.
    pub fn max_z(&self) -> f64 {
        self.bbox.max.z
    }

    /// Get the Z coordinate on the triangle plane at (x, y).
    /// Returns None if the triangle is degenerate or vertical.
    pub fn z_at_xy(&self, x: f64, y: f64) -> Option<f64> {
        let n = self.normal?;
        if Tolerance::DEFAULT.is_zero(n.z) {
            return None;
        }
        let p0 = &self.p[0];
        Some(p0.z - (n.x * (x - p0.x) + n.y * (y - p0.y)) / n.z)
    }

    /// Check if point (x, y) is inside the triangle in 2D projection.
    ///
    /// Points on the boundary count as inside. Triangles whose projection
    /// has no area contain nothing.
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        let [v0, v1, v2] = &self.p;

        let e1 = (v1.x - v0.x, v1.y - v0.y);
        let e2 = (v2.x - v0.x, v2.y - v0.y);
        let q = (x - v0.x, y - v0.y);

        let d00 = e1.0 * e1.0 + e1.1 * e1.1;
        let d01 = e1.0 * e2.0 + e1.1 * e2.1;
        let d11 = e2.0 * e2.0 + e2.1 * e2.1;
        let d20 = q.0 * e1.0 + q.1 * e1.1;
        let d21 = q.0 * e2.0 + q.1 * e2.1;

        let denom = d00 * d11 - d01 * d01;
        if denom <= 1e-12 * d00 * d11 || denom <= 0.0 {
            return false;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;

        let eps = -Tolerance::DEFAULT.linear;
        u >= eps && v >= eps && w >= eps
    }
}
