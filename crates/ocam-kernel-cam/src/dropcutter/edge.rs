//! Edge contact: the cutter profile resting on a triangle edge.
//!
//! Each edge is moved into a canonical frame: `u` runs along the edge in the
//! xy plane with `u = 0` at the foot of the perpendicular from the cutter
//! axis, and the edge sits at horizontal offset `d` from the axis. The edge
//! height is then the line `z(u) = z1 + m (u - u1)`, and each profile reduces
//! to a one-dimensional problem in the vertical plane through the edge.

use ocam_kernel_math::{xy_closest_point_on_line, xy_distance, Point3, Tolerance, Triangle};

use crate::{CcType, ClPoint, Contact, Cutter};

/// Ternary search steps for the torus rim; shrinks the interval by (2/3)^n.
const TORUS_ITERATIONS: usize = 100;

impl Cutter {
    /// Highest edge contact at (x, y), or `None` if no edge is within
    /// reach or every contact falls outside its segment.
    pub fn edge_contact(&self, x: f64, y: f64, tri: &Triangle) -> Option<Contact> {
        if tri.is_degenerate() {
            return None;
        }
        let cl = Point3::new(x, y, 0.0);
        tri.edges()
            .iter()
            .filter_map(|(p1, p2)| self.single_edge_contact(&cl, p1, p2))
            .fold(None, |best, c| Contact::highest(best, Some(c)))
    }

    /// Lift `cl` onto the triangle's edges. Returns true if it moved.
    pub fn edge_drop(&self, cl: &mut ClPoint, tri: &Triangle) -> bool {
        self.edge_contact(cl.x(), cl.y(), tri)
            .is_some_and(|c| cl.lift(c))
    }

    fn single_edge_contact(&self, cl: &Point3, p1: &Point3, p2: &Point3) -> Option<Contact> {
        let tol = Tolerance::DEFAULT;
        let r = self.radius();

        let foot = xy_closest_point_on_line(cl, p1, p2)?;
        let d = xy_distance(cl, &foot);
        if !tol.within(d, r) {
            return None;
        }
        let frame = EdgeFrame::new(&foot, d.min(r), p1, p2);

        match *self {
            Cutter::Cylindrical { .. } => frame.cylinder(r),
            Cutter::Ball { .. } => frame.ball(r),
            Cutter::BullNose { corner_radius, .. } => {
                let a = r - corner_radius;
                if tol.is_zero(a) {
                    frame.ball(r)
                } else {
                    frame.torus(a, corner_radius)
                }
            }
            Cutter::Conical { half_angle, .. } => frame.cone(r, half_angle.tan()),
        }
    }
}

/// An edge expressed in the canonical frame of one cutter position.
struct EdgeFrame {
    foot: Point3,
    dir: (f64, f64),
    d: f64,
    u1: f64,
    u2: f64,
    z1: f64,
    m: f64,
    horizontal: bool,
}

impl EdgeFrame {
    fn new(foot: &Point3, d: f64, p1: &Point3, p2: &Point3) -> Self {
        let len = xy_distance(p1, p2);
        let dir = ((p2.x - p1.x) / len, (p2.y - p1.y) / len);
        let u1 = (p1.x - foot.x) * dir.0 + (p1.y - foot.y) * dir.1;
        let u2 = u1 + len;
        Self {
            foot: *foot,
            dir,
            d,
            u1,
            u2,
            z1: p1.z,
            m: (p2.z - p1.z) / len,
            horizontal: Tolerance::DEFAULT.is_zero(p2.z - p1.z),
        }
    }

    fn z_at(&self, u: f64) -> f64 {
        self.z1 + self.m * (u - self.u1)
    }

    /// A contact at parameter `u` on the edge, if that lies on the segment.
    fn contact(&self, u: f64, tip_z: f64) -> Option<Contact> {
        let eps = Tolerance::DEFAULT.linear;
        if u < self.u1 - eps || u > self.u2 + eps {
            return None;
        }
        let cc = Point3::new(
            self.foot.x + u * self.dir.0,
            self.foot.y + u * self.dir.1,
            self.z_at(u),
        );
        let kind = if self.horizontal {
            CcType::EdgeHorizontal
        } else {
            CcType::Edge
        };
        Some(Contact::new(tip_z, cc, kind))
    }

    /// Slope directions worth trying for a contact on the uphill side.
    fn uphill_signs(&self) -> &'static [f64] {
        if Tolerance::DEFAULT.is_zero(self.m) {
            &[1.0, -1.0]
        } else if self.m > 0.0 {
            &[1.0]
        } else {
            &[-1.0]
        }
    }

    /// The bottom disc cuts the edge's vertical plane in a chord of
    /// half-length `s`; either chord end may touch.
    fn cylinder(&self, r: f64) -> Option<Contact> {
        let s = (r * r - self.d * self.d).max(0.0).sqrt();
        Contact::highest(
            self.contact(s, self.z_at(s)),
            self.contact(-s, self.z_at(-s)),
        )
    }

    /// The sphere cuts the plane in a circle of radius `s` centered above
    /// `u = 0`; lower it until tangent to the line.
    fn ball(&self, r: f64) -> Option<Contact> {
        let s = (r * r - self.d * self.d).max(0.0).sqrt();
        let k = (1.0 + self.m * self.m).sqrt();
        let u = s * self.m / k;
        let center_z = self.z_at(0.0) + s * k;
        self.contact(u, center_z - r)
    }

    /// Bull-nose: the torus is the union of tube spheres of radius `rc`
    /// centered on the ring of radius `a`. A tube sphere at ring parameter
    /// `t = sin(theta)` lies `w = a t - d` from the plane and needs its center
    /// at `z(a cos) + sqrt(1 + m^2) sqrt(rc^2 - w^2)`; maximise over the ring.
    fn torus(&self, a: f64, rc: f64) -> Option<Contact> {
        let m = self.m;
        let k = (1.0 + m * m).sqrt();
        let d = self.d;

        let lo = ((d - rc) / a).max(-1.0);
        let hi = ((d + rc) / a).min(1.0);
        let rho = |t: f64| {
            let w = a * t - d;
            (rc * rc - w * w).max(0.0).sqrt()
        };
        // concave on [lo, hi]: both terms are concave
        let g = |t: f64| m.abs() * a * (1.0 - t * t).max(0.0).sqrt() + k * rho(t);
        let t = ternary_max(g, lo, hi);

        let cos = (1.0 - t * t).max(0.0).sqrt();
        let rho = rho(t);
        self.uphill_signs()
            .iter()
            .filter_map(|sign| {
                let u0 = sign * a * cos;
                let center_z = self.z_at(u0) + k * rho;
                self.contact(u0 + m * rho / k, center_z - rc)
            })
            .fold(None, |best, c| Contact::highest(best, Some(c)))
    }

    /// Cone: the plane cuts a hyperbola `h(u) = sqrt(u^2 + d^2) / tan`.
    /// The tangent point moves out to the rim once the edge is steeper than
    /// the cone.
    fn cone(&self, r: f64, tan: f64) -> Option<Contact> {
        let d = self.d;
        let rim = (r * r - d * d).max(0.0).sqrt();
        let mt2 = (self.m * tan).powi(2);
        let u = if mt2 < 1.0 {
            (mt2 * d * d / (1.0 - mt2)).sqrt().min(rim)
        } else {
            rim
        };
        let u = u * self.m.signum();
        let tip_z = self.z_at(u) - (u * u + d * d).sqrt() / tan;
        self.contact(u, tip_z)
    }
}

/// Maximise a concave function on `[lo, hi]`.
fn ternary_max(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    for _ in 0..TORUS_ITERATIONS {
        let a = lo + (hi - lo) / 3.0;
        let b = hi - (hi - lo) / 3.0;
        if f(a) < f(b) {
            lo = a;
        } else {
            hi = b;
        }
    }
    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    /// A triangle whose first edge runs from `a` to `b`, with the third
    /// vertex far away on the +y side.
    fn with_edge(a: Point3, b: Point3) -> Triangle {
        Triangle::new(a, b, Point3::new(0.0, 50.0, -100.0))
    }

    #[test]
    fn test_cylinder_horizontal_edge() {
        let tri = with_edge(Point3::new(-5.0, 0.0, 1.0), Point3::new(5.0, 0.0, 1.0));
        let cutter = Cutter::cylindrical(2.0).unwrap();
        let c = cutter.edge_contact(0.0, -0.5, &tri).unwrap();
        assert_relative_eq!(c.z, 1.0, epsilon = 1e-12);
        assert_eq!(c.cc.kind, CcType::EdgeHorizontal);
    }

    #[test]
    fn test_ball_sloped_edge() {
        let tri = with_edge(Point3::new(-5.0, 0.0, -5.0), Point3::new(5.0, 0.0, 5.0));
        let cutter = Cutter::ball(2.0).unwrap();
        let c = cutter.edge_contact(0.0, -0.6, &tri).unwrap();
        // center sits where its distance to the line z = x is exactly R
        let center_z = (2.0f64 * (1.0 - 0.36)).sqrt();
        assert_relative_eq!(c.z, center_z - 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.cc.position.x, 0.8 / 2.0f64.sqrt(), epsilon = 1e-12);
        assert_eq!(c.cc.kind, CcType::Edge);
    }

    #[test]
    fn test_torus_limits() {
        let tri = with_edge(Point3::new(-5.0, 0.0, -2.0), Point3::new(5.0, 0.0, 3.0));
        let ball = Cutter::ball(2.0).unwrap().edge_contact(0.3, -0.4, &tri).unwrap();
        let full = Cutter::bull_nose(2.0, 1.0).unwrap().edge_contact(0.3, -0.4, &tri).unwrap();
        assert_relative_eq!(full.z, ball.z, epsilon = 1e-12);

        let cyl = Cutter::cylindrical(2.0).unwrap().edge_contact(0.3, -0.4, &tri).unwrap();
        let sharp = Cutter::bull_nose(2.0, 0.0).unwrap().edge_contact(0.3, -0.4, &tri).unwrap();
        assert_relative_eq!(sharp.z, cyl.z, epsilon = 1e-9);

        let bull = Cutter::bull_nose(2.0, 0.4).unwrap().edge_contact(0.3, -0.4, &tri).unwrap();
        assert!(bull.z <= cyl.z + 1e-9);
        assert!(bull.z >= ball.z - 1e-9);
        // contact lies on the edge
        assert_relative_eq!(bull.cc.position.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_torus_horizontal_edge() {
        // flat corner profile at offset d: tip = z - height(d)
        let tri = with_edge(Point3::new(-5.0, 0.0, 1.0), Point3::new(5.0, 0.0, 1.0));
        let cutter = Cutter::bull_nose(2.0, 0.5).unwrap();
        let c = cutter.edge_contact(0.0, -0.8, &tri).unwrap();
        assert_relative_eq!(c.z, 1.0 - cutter.height(0.8), epsilon = 1e-9);
    }

    #[test]
    fn test_cone_edges() {
        let cutter = Cutter::conical(2.0, FRAC_PI_4).unwrap();
        let flat = with_edge(Point3::new(-5.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0));
        let c = cutter.edge_contact(0.0, -0.5, &flat).unwrap();
        assert_relative_eq!(c.z, -0.5, epsilon = 1e-12);

        // steeper than the cone: the rim touches
        let steep = with_edge(Point3::new(-5.0, 0.0, -10.0), Point3::new(5.0, 0.0, 10.0));
        let c = cutter.edge_contact(0.0, -0.5, &steep).unwrap();
        let rim = 0.75f64.sqrt();
        assert_relative_eq!(c.z, 2.0 * rim - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_contact_outside_segment() {
        let tri = Triangle::new(
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(3.0, 3.0, 0.0),
        );
        let cutter = Cutter::cylindrical(2.0).unwrap();
        assert!(cutter.edge_contact(0.0, -0.5, &tri).is_none());
        assert!(cutter.edge_contact(3.0, -1.5, &tri).is_none());
    }
}
