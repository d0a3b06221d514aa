//! Facet contact: the cutter resting on the triangle's plane.
//!
//! For a plane with upward unit normal `n`, every profile except the cone
//! touches at a single point: step `xy_normal_length` uphill, against the
//! xy part of `n`, and `normal_length` back along `n` from the cutter axis.
//! The cone touches with its tip or with its rim, whichever is higher.

use ocam_kernel_math::{xy_norm, Point3, Tolerance, Triangle};

use crate::{CcType, ClPoint, Contact, Cutter};

impl Cutter {
    /// Facet contact at (x, y), or `None` if the contact point falls
    /// outside the triangle or the facet is vertical.
    pub fn facet_contact(&self, x: f64, y: f64, tri: &Triangle) -> Option<Contact> {
        let tol = Tolerance::DEFAULT;
        let n = tri.up_normal()?;
        if tol.is_zero(n.z) {
            return None;
        }

        let nxy = xy_norm(&n);
        if tol.is_zero(nxy) {
            // horizontal: every profile bottoms out at its tip
            let kind = match self {
                Cutter::Conical { .. } => CcType::FacetTip,
                _ => CcType::Facet,
            };
            return tip_contact(x, y, tri, kind);
        }
        let (ux, uy) = (n.x / nxy, n.y / nxy);

        if let Cutter::Conical { .. } = self {
            let tip = tip_contact(x, y, tri, CcType::FacetTip);
            let r = self.radius();
            let rim = plane_contact(tri, x - r * ux, y - r * uy).map(|cc| {
                Contact::new(cc.z - self.center_height(), cc, CcType::FacetRim)
            });
            return Contact::highest(tip, rim);
        }

        let xnl = self.xy_normal_length();
        let nl = self.normal_length();
        let cc = plane_contact(tri, x - xnl * ux - nl * n.x, y - xnl * uy - nl * n.y)?;
        let z = cc.z + nl * n.z - self.center_height();
        Some(Contact::new(z, cc, CcType::Facet))
    }

    /// Lift `cl` onto the triangle's facet. Returns true if it moved.
    pub fn facet_drop(&self, cl: &mut ClPoint, tri: &Triangle) -> bool {
        self.facet_contact(cl.x(), cl.y(), tri)
            .is_some_and(|c| cl.lift(c))
    }
}

fn tip_contact(x: f64, y: f64, tri: &Triangle, kind: CcType) -> Option<Contact> {
    plane_contact(tri, x, y).map(|cc| Contact::new(cc.z, cc, kind))
}

/// The point of the facet above (x, y), if (x, y) is inside its footprint.
fn plane_contact(tri: &Triangle, x: f64, y: f64) -> Option<Point3> {
    if !tri.contains_xy(x, y) {
        return None;
    }
    let z = tri.z_at_xy(x, y)?;
    Some(Point3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    /// Plane z = x / 2 over a large footprint.
    fn ramp() -> Triangle {
        Triangle::new(
            Point3::new(-10.0, -10.0, -5.0),
            Point3::new(10.0, -10.0, 5.0),
            Point3::new(0.0, 10.0, 0.0),
        )
    }

    #[test]
    fn test_horizontal_facet() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(4.0, 0.0, 2.0),
            Point3::new(0.0, 4.0, 2.0),
        );
        for cutter in [
            Cutter::cylindrical(1.0).unwrap(),
            Cutter::ball(1.0).unwrap(),
            Cutter::bull_nose(1.0, 0.2).unwrap(),
            Cutter::conical(1.0, 0.5).unwrap(),
        ] {
            let c = cutter.facet_contact(1.0, 1.0, &tri).unwrap();
            assert_relative_eq!(c.z, 2.0);
            assert!(cutter.facet_contact(5.0, 5.0, &tri).is_none());
        }
    }

    #[test]
    fn test_cylinder_on_ramp() {
        // the uphill rim point touches: z = (x + R) / 2
        let cutter = Cutter::cylindrical(2.0).unwrap();
        let c = cutter.facet_contact(0.0, 0.0, &ramp()).unwrap();
        assert_relative_eq!(c.z, 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.cc.position.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ball_on_ramp() {
        // center sits R / cos(theta) above the plane
        let cutter = Cutter::ball(2.0).unwrap();
        let c = cutter.facet_contact(0.0, 0.0, &ramp()).unwrap();
        let secant = (1.0f64 + 0.25).sqrt();
        assert_relative_eq!(c.z, secant - 1.0, epsilon = 1e-12);
        assert_eq!(c.cc.kind, CcType::Facet);
    }

    #[test]
    fn test_bull_nose_between_cylinder_and_ball() {
        let tri = ramp();
        let cyl = Cutter::cylindrical(2.0).unwrap().facet_contact(0.0, 0.0, &tri).unwrap();
        let ball = Cutter::ball(2.0).unwrap().facet_contact(0.0, 0.0, &tri).unwrap();
        let bull = Cutter::bull_nose(2.0, 0.5).unwrap().facet_contact(0.0, 0.0, &tri).unwrap();
        assert!(bull.z <= cyl.z + 1e-12);
        assert!(bull.z >= ball.z - 1e-12);
    }

    #[test]
    fn test_cone_tip_or_rim() {
        let cutter = Cutter::conical(2.0, FRAC_PI_4).unwrap();
        // slope 1/2 is flatter than the cone: the tip touches
        let c = cutter.facet_contact(0.0, 0.0, &ramp()).unwrap();
        assert_eq!(c.cc.kind, CcType::FacetTip);
        assert_relative_eq!(c.z, 0.0, epsilon = 1e-12);

        // slope 2 is steeper: the rim touches
        let steep = Triangle::new(
            Point3::new(-10.0, -10.0, -20.0),
            Point3::new(10.0, -10.0, 20.0),
            Point3::new(0.0, 10.0, 0.0),
        );
        let c = cutter.facet_contact(0.0, 0.0, &steep).unwrap();
        assert_eq!(c.cc.kind, CcType::FacetRim);
        assert_relative_eq!(c.z, 2.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_and_degenerate() {
        let cutter = Cutter::ball(1.0).unwrap();
        let wall = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        assert!(cutter.facet_contact(0.2, 0.0, &wall).is_none());
        let line = Triangle::new(Point3::origin(), Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let mut cl = ClPoint::new(0.5, 0.5, -1.0);
        assert!(!cutter.facet_drop(&mut cl, &line));
    }
}
