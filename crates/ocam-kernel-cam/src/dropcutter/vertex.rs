//! Vertex contact: the cutter profile resting on a triangle corner.

use ocam_kernel_math::{xy_distance, Point3, Tolerance, Triangle};

use crate::{CcType, ClPoint, Contact, Cutter};

impl Cutter {
    /// Highest vertex contact at (x, y), or `None` if no vertex lies under
    /// the cutter.
    pub fn vertex_contact(&self, x: f64, y: f64, tri: &Triangle) -> Option<Contact> {
        if tri.is_degenerate() {
            return None;
        }
        let r = self.radius();
        let cl = Point3::new(x, y, 0.0);

        tri.vertices()
            .iter()
            .filter_map(|v| {
                let q = xy_distance(&cl, v);
                Tolerance::DEFAULT
                    .within(q, r)
                    .then(|| Contact::new(v.z - self.height(q), *v, CcType::Vertex))
            })
            .fold(None, |best, c| Contact::highest(best, Some(c)))
    }

    /// Lift `cl` onto the triangle's vertices. Returns true if it moved.
    pub fn vertex_drop(&self, cl: &mut ClPoint, tri: &Triangle) -> bool {
        self.vertex_contact(cl.x(), cl.y(), tri)
            .is_some_and(|c| cl.lift(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(4.0, 0.0, 1.0),
            Point3::new(0.0, 4.0, 1.0),
        )
    }

    #[test]
    fn test_cylinder_over_vertex_is_exact() {
        let cutter = Cutter::cylindrical(1.0).unwrap();
        let mut cl = ClPoint::new(0.0, 0.0, -5.0);
        assert!(cutter.vertex_drop(&mut cl, &flat()));
        assert_eq!(cl.z(), 1.0);
        assert_eq!(cl.cc.unwrap().kind, CcType::Vertex);
    }

    #[test]
    fn test_ball_off_vertex() {
        let cutter = Cutter::ball(2.0).unwrap();
        let c = cutter.vertex_contact(-0.6, 0.0, &flat()).unwrap();
        // 1 - (1 - sqrt(1 - 0.36))
        assert_relative_eq!(c.z, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_reach() {
        let cutter = Cutter::ball(2.0).unwrap();
        assert!(cutter.vertex_contact(-1.01, 0.0, &flat()).is_none());
        let mut cl = ClPoint::new(10.0, 10.0, 0.0);
        assert!(!cutter.vertex_drop(&mut cl, &flat()));
        assert_eq!(cl.z(), 0.0);
    }
}
