//! Volume predicates that octrees are built against.

use ocam_kernel_math::{BoundingBox, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::{OctreeError, Result};

/// How a cube relates to a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeClass {
    /// Every point of the cube is inside the volume.
    Inside,
    /// No point of the cube is inside the volume.
    Outside,
    /// The cube straddles the boundary, or the test could not decide.
    Mixed,
}

/// A solid that can answer point-containment queries.
///
/// The default [`classify_cube`](OctVolume::classify_cube) rejects cubes
/// that miss the bounding box and accepts cubes whose eight corners are all
/// inside, which is exact for convex volumes. Non-convex volumes must
/// override it.
pub trait OctVolume: Send + Sync {
    /// Check if `p` is inside the volume (boundary inclusive).
    fn is_inside(&self, p: &Point3) -> bool;

    /// A box containing the whole volume.
    fn bounding_box(&self) -> BoundingBox;

    /// Check the shape parameters before the volume is used.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Classify the cube with the given center and half-width.
    fn classify_cube(&self, center: &Point3, half: f64) -> CubeClass {
        let cube = BoundingBox::cube(*center, half);
        if !cube.overlaps(&self.bounding_box()) {
            return CubeClass::Outside;
        }
        if cube_corners(center, half).iter().all(|c| self.is_inside(c)) {
            CubeClass::Inside
        } else {
            CubeClass::Mixed
        }
    }
}

/// The eight corners of a cube.
pub(crate) fn cube_corners(center: &Point3, half: f64) -> [Point3; 8] {
    std::array::from_fn(|i| {
        Point3::new(
            center.x + if i & 1 == 0 { -half } else { half },
            center.y + if i & 2 == 0 { -half } else { half },
            center.z + if i & 4 == 0 { -half } else { half },
        )
    })
}

fn check_point(name: &str, p: &Point3) -> Result<()> {
    if p.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(OctreeError::InvalidArgument(format!(
            "{name} must be finite, got {p:?}"
        )))
    }
}

fn check_length(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OctreeError::InvalidArgument(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

/// A ball given by center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereVolume {
    /// Sphere center.
    pub center: Point3,
    /// Sphere radius.
    pub radius: f64,
}

impl SphereVolume {
    /// Create a sphere volume.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Default for SphereVolume {
    fn default() -> Self {
        Self::new(Point3::new(2.0, 0.0, 0.0), 3.0)
    }
}

impl OctVolume for SphereVolume {
    fn is_inside(&self, p: &Point3) -> bool {
        (p - self.center).norm_squared() <= self.radius * self.radius
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::cube(self.center, self.radius)
    }

    fn validate(&self) -> Result<()> {
        check_point("sphere center", &self.center)?;
        check_length("sphere radius", self.radius)
    }

    fn classify_cube(&self, center: &Point3, half: f64) -> CubeClass {
        let r_sq = self.radius * self.radius;
        let d = (self.center - center).abs();

        // Closest point of the cube to the sphere center
        let near = d.map(|c| (c - half).max(0.0));
        if near.norm_squared() > r_sq {
            return CubeClass::Outside;
        }

        // Farthest corner
        let far = d.map(|c| c + half);
        if far.norm_squared() <= r_sq {
            CubeClass::Inside
        } else {
            CubeClass::Mixed
        }
    }
}

/// An axis-aligned cube given by center and side length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeVolume {
    /// Cube center.
    pub center: Point3,
    /// Side length.
    pub side: f64,
}

impl CubeVolume {
    /// Create a cube volume.
    pub fn new(center: Point3, side: f64) -> Self {
        Self { center, side }
    }
}

impl Default for CubeVolume {
    fn default() -> Self {
        Self::new(Point3::origin(), 1.234)
    }
}

impl OctVolume for CubeVolume {
    fn is_inside(&self, p: &Point3) -> bool {
        let h = self.side / 2.0;
        (p - self.center).iter().all(|c| c.abs() <= h)
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::cube(self.center, self.side / 2.0)
    }

    fn validate(&self) -> Result<()> {
        check_point("cube center", &self.center)?;
        check_length("cube side", self.side)
    }

    fn classify_cube(&self, center: &Point3, half: f64) -> CubeClass {
        let h = self.side / 2.0;
        let d = (center - self.center).abs();
        // Touching faces share no interior, so they count as outside
        if d.iter().any(|&c| c >= h + half) {
            CubeClass::Outside
        } else if d.iter().all(|&c| c + half <= h) {
            CubeClass::Inside
        } else {
            CubeClass::Mixed
        }
    }
}

/// A finite cylinder around the segment `p1`-`p2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderVolume {
    /// Axis start point.
    pub p1: Point3,
    /// Axis end point.
    pub p2: Point3,
    /// Cylinder radius.
    pub radius: f64,
}

impl CylinderVolume {
    /// Create a cylinder volume.
    pub fn new(p1: Point3, p2: Point3, radius: f64) -> Self {
        Self { p1, p2, radius }
    }
}

impl Default for CylinderVolume {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0), 1.234)
    }
}

impl OctVolume for CylinderVolume {
    fn is_inside(&self, p: &Point3) -> bool {
        let axis = self.p2 - self.p1;
        let len_sq = axis.norm_squared();
        if len_sq == 0.0 {
            return false;
        }
        let t = (p - self.p1).dot(&axis) / len_sq;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let closest = self.p1 + t * axis;
        (p - closest).norm_squared() <= self.radius * self.radius
    }

    fn bounding_box(&self) -> BoundingBox {
        let r = Vec3::repeat(self.radius);
        let bb = BoundingBox::new(self.p1, self.p2);
        BoundingBox {
            min: bb.min - r,
            max: bb.max + r,
        }
    }

    fn validate(&self) -> Result<()> {
        check_point("cylinder start", &self.p1)?;
        check_point("cylinder end", &self.p2)?;
        check_length("cylinder radius", self.radius)?;
        if self.p1 == self.p2 {
            return Err(OctreeError::InvalidArgument(
                "cylinder axis has zero length".into(),
            ));
        }
        Ok(())
    }
}

/// The region swept by a vertical cylindrical cutter moving from `p1` to
/// `p2`. The cutter tip follows the segment and the cutter extends `length`
/// above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylMoveVolume {
    /// Tip position at the start of the move.
    pub p1: Point3,
    /// Tip position at the end of the move.
    pub p2: Point3,
    /// Cutter radius.
    pub radius: f64,
    /// Cutter length above the tip.
    pub length: f64,
}

impl CylMoveVolume {
    /// Create a swept-cutter volume.
    pub fn new(p1: Point3, p2: Point3, radius: f64, length: f64) -> Self {
        Self {
            p1,
            p2,
            radius,
            length,
        }
    }

    /// Parameter range along the move where the cutter axis is within
    /// `radius` of `p` in xy.
    fn xy_range(&self, p: &Point3) -> Option<(f64, f64)> {
        let (qx, qy) = (p.x - self.p1.x, p.y - self.p1.y);
        let (vx, vy) = (self.p2.x - self.p1.x, self.p2.y - self.p1.y);
        let vv = vx * vx + vy * vy;
        let qq = qx * qx + qy * qy;
        let r_sq = self.radius * self.radius;
        if vv == 0.0 {
            return (qq <= r_sq).then_some((f64::NEG_INFINITY, f64::INFINITY));
        }
        let qv = qx * vx + qy * vy;
        let disc = qv * qv - vv * (qq - r_sq);
        if disc < 0.0 {
            return None;
        }
        let s = disc.sqrt();
        Some(((qv - s) / vv, (qv + s) / vv))
    }

    /// Parameter range along the move where `p.z` lies between the tip and
    /// the top of the cutter.
    fn z_range(&self, p: &Point3) -> Option<(f64, f64)> {
        let dz = self.p2.z - self.p1.z;
        let lo = p.z - self.length - self.p1.z;
        let hi = p.z - self.p1.z;
        if dz == 0.0 {
            return (lo <= 0.0 && 0.0 <= hi).then_some((f64::NEG_INFINITY, f64::INFINITY));
        }
        let (a, b) = (lo / dz, hi / dz);
        Some((a.min(b), a.max(b)))
    }
}

impl OctVolume for CylMoveVolume {
    fn is_inside(&self, p: &Point3) -> bool {
        let (Some(xy), Some(z)) = (self.xy_range(p), self.z_range(p)) else {
            return false;
        };
        let lo = xy.0.max(z.0).max(0.0);
        let hi = xy.1.min(z.1).min(1.0);
        lo <= hi
    }

    fn bounding_box(&self) -> BoundingBox {
        let bb = BoundingBox::new(self.p1, self.p2);
        BoundingBox {
            min: bb.min - Vec3::new(self.radius, self.radius, 0.0),
            max: bb.max + Vec3::new(self.radius, self.radius, self.length),
        }
    }

    fn validate(&self) -> Result<()> {
        check_point("move start", &self.p1)?;
        check_point("move end", &self.p2)?;
        check_length("cutter radius", self.radius)?;
        check_length("cutter length", self.length)
    }
}

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A half-space bounded by an axis-aligned plane.
///
/// With `positive` set the volume is `coord >= offset`, otherwise
/// `coord <= offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneVolume {
    /// Axis normal to the plane.
    pub axis: Axis,
    /// Plane position along the axis.
    pub offset: f64,
    /// Which side of the plane is inside.
    pub positive: bool,
}

impl PlaneVolume {
    /// Create a half-space volume.
    pub fn new(axis: Axis, offset: f64, positive: bool) -> Self {
        Self {
            axis,
            offset,
            positive,
        }
    }
}

impl OctVolume for PlaneVolume {
    fn is_inside(&self, p: &Point3) -> bool {
        let c = p[self.axis.index()];
        if self.positive {
            c >= self.offset
        } else {
            c <= self.offset
        }
    }

    fn bounding_box(&self) -> BoundingBox {
        let mut min = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut max = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        if self.positive {
            min[self.axis.index()] = self.offset;
        } else {
            max[self.axis.index()] = self.offset;
        }
        BoundingBox { min, max }
    }

    fn validate(&self) -> Result<()> {
        if self.offset.is_finite() {
            Ok(())
        } else {
            Err(OctreeError::InvalidArgument(format!(
                "plane offset must be finite, got {}",
                self.offset
            )))
        }
    }

    fn classify_cube(&self, center: &Point3, half: f64) -> CubeClass {
        let c = center[self.axis.index()];
        let (lo, hi) = (c - half, c + half);
        let (inside, outside) = if self.positive {
            (lo >= self.offset, hi <= self.offset)
        } else {
            (hi <= self.offset, lo >= self.offset)
        };
        if inside {
            CubeClass::Inside
        } else if outside {
            CubeClass::Outside
        } else {
            CubeClass::Mixed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_inside() {
        let s = SphereVolume::new(Point3::new(4.0, 2.0, 3.0), 3.0);
        assert!(s.is_inside(&Point3::new(4.0, 2.0, 3.0)));
        assert!(s.is_inside(&Point3::new(7.0, 2.0, 3.0)));
        assert!(!s.is_inside(&Point3::new(7.1, 2.0, 3.0)));
    }

    #[test]
    fn test_sphere_classify() {
        let s = SphereVolume::new(Point3::origin(), 3.0);
        assert_eq!(s.classify_cube(&Point3::origin(), 1.0), CubeClass::Inside);
        assert_eq!(s.classify_cube(&Point3::new(10.0, 0.0, 0.0), 1.0), CubeClass::Outside);
        assert_eq!(s.classify_cube(&Point3::new(3.0, 0.0, 0.0), 1.0), CubeClass::Mixed);
        // corner of the cube pokes out although the face center is inside
        assert_eq!(s.classify_cube(&Point3::new(1.5, 1.5, 1.5), 0.5), CubeClass::Mixed);
    }

    #[test]
    fn test_cube_classify() {
        let c = CubeVolume::new(Point3::origin(), 6.0);
        assert!(c.is_inside(&Point3::new(3.0, -3.0, 0.0)));
        assert!(!c.is_inside(&Point3::new(3.01, 0.0, 0.0)));
        assert_eq!(c.classify_cube(&Point3::new(1.0, 1.0, 1.0), 2.0), CubeClass::Inside);
        assert_eq!(c.classify_cube(&Point3::new(5.0, 0.0, 0.0), 2.0), CubeClass::Outside);
        assert_eq!(c.classify_cube(&Point3::new(3.0, 0.0, 0.0), 1.0), CubeClass::Mixed);
    }

    #[test]
    fn test_default_classify_uses_corners() {
        let cyl = CylinderVolume::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0), 2.0);
        assert_eq!(cyl.classify_cube(&Point3::new(0.0, 0.0, 5.0), 1.0), CubeClass::Inside);
        assert_eq!(cyl.classify_cube(&Point3::new(10.0, 0.0, 5.0), 1.0), CubeClass::Outside);
        assert_eq!(cyl.classify_cube(&Point3::new(2.0, 0.0, 5.0), 1.0), CubeClass::Mixed);
    }

    #[test]
    fn test_cylinder_end_caps() {
        let cyl = CylinderVolume::new(Point3::origin(), Point3::new(0.0, 0.0, 10.0), 2.0);
        assert!(cyl.is_inside(&Point3::new(1.0, 1.0, 0.0)));
        assert!(!cyl.is_inside(&Point3::new(0.0, 0.0, -0.1)));
        assert!(!cyl.is_inside(&Point3::new(0.0, 0.0, 10.1)));
    }

    #[test]
    fn test_cyl_move_horizontal() {
        let mv = CylMoveVolume::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0), 1.0, 5.0);
        assert!(mv.is_inside(&Point3::new(5.0, 0.5, 2.0)));
        assert!(mv.is_inside(&Point3::new(-0.5, 0.0, 0.0)));
        assert!(!mv.is_inside(&Point3::new(5.0, 1.5, 2.0)));
        assert!(!mv.is_inside(&Point3::new(5.0, 0.0, -0.1)));
        assert!(!mv.is_inside(&Point3::new(5.0, 0.0, 5.1)));
        assert!(!mv.is_inside(&Point3::new(11.5, 0.0, 1.0)));
    }

    #[test]
    fn test_cyl_move_plunge() {
        // vertical plunge from z=5 down to z=0
        let mv = CylMoveVolume::new(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 1.0, 2.0);
        assert!(mv.is_inside(&Point3::new(0.5, 0.0, 0.0)));
        assert!(mv.is_inside(&Point3::new(0.0, 0.0, 7.0)));
        assert!(!mv.is_inside(&Point3::new(0.0, 0.0, 7.5)));
    }

    #[test]
    fn test_cyl_move_ramp() {
        // ramp rising 10 in x while climbing 10 in z, cutter 1 long
        let mv = CylMoveVolume::new(Point3::origin(), Point3::new(10.0, 0.0, 10.0), 0.5, 1.0);
        assert!(mv.is_inside(&Point3::new(5.0, 0.0, 5.5)));
        assert!(!mv.is_inside(&Point3::new(5.0, 0.0, 8.0)));
        assert!(!mv.is_inside(&Point3::new(5.0, 0.0, 3.0)));
    }

    #[test]
    fn test_plane_volume() {
        let p = PlaneVolume::new(Axis::Z, 1.0, false);
        assert!(p.is_inside(&Point3::new(100.0, -5.0, 0.5)));
        assert!(!p.is_inside(&Point3::new(0.0, 0.0, 1.5)));
        assert_eq!(p.classify_cube(&Point3::new(0.0, 0.0, -2.0), 1.0), CubeClass::Inside);
        assert_eq!(p.classify_cube(&Point3::new(0.0, 0.0, 3.0), 1.0), CubeClass::Outside);
        assert_eq!(p.classify_cube(&Point3::new(0.0, 0.0, 1.0), 1.0), CubeClass::Mixed);
    }

    #[test]
    fn test_validate_rejects_negative_radius() {
        let s = SphereVolume::new(Point3::origin(), -1.0);
        assert!(matches!(s.validate(), Err(OctreeError::InvalidArgument(_))));
        let c = CubeVolume::new(Point3::new(f64::NAN, 0.0, 0.0), 1.0);
        assert!(c.validate().is_err());
        assert!(SphereVolume::default().validate().is_ok());
    }
}
