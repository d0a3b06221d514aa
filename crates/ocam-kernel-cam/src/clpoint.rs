//! Cutter-location and cutter-contact points.

use ocam_kernel_math::Point3;
use serde::{Deserialize, Serialize};

/// Which feature of a triangle the cutter touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CcType {
    /// A triangle vertex.
    Vertex,
    /// A sloped edge.
    Edge,
    /// An edge with both ends at the same height.
    EdgeHorizontal,
    /// The facet plane.
    Facet,
    /// The facet plane, touched by the tip of a conical cutter.
    FacetTip,
    /// The facet plane, touched by the rim of a conical cutter.
    FacetRim,
}

/// Cutter-contact point: where on the geometry the cutter rests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcPoint {
    /// Contact position on the triangle.
    pub position: Point3,
    /// Feature that was touched.
    pub kind: CcType,
}

impl CcPoint {
    /// Create a contact point.
    pub fn new(position: Point3, kind: CcType) -> Self {
        Self { position, kind }
    }
}

/// A candidate tip height together with the contact that implies it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Tip height of the cutter when resting on `cc`.
    pub z: f64,
    /// The touched point.
    pub cc: CcPoint,
}

impl Contact {
    /// Create a contact.
    pub fn new(z: f64, position: Point3, kind: CcType) -> Self {
        Self {
            z,
            cc: CcPoint::new(position, kind),
        }
    }

    /// The higher of two optional contacts.
    pub fn highest(a: Option<Contact>, b: Option<Contact>) -> Option<Contact> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.z > a.z { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Cutter-location point: sample position and current tip height.
///
/// Drop operations only ever raise `z`; the contact that produced the
/// current height is kept in `cc`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClPoint {
    /// Sample position; `z` is the tip height.
    pub position: Point3,
    /// Contact that last lifted this point, if any.
    pub cc: Option<CcPoint>,
}

impl ClPoint {
    /// Create a cl-point with no contact.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            cc: None,
        }
    }

    /// X coordinate.
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Y coordinate.
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Tip height.
    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Raise the point to `contact.z` if that is higher.
    ///
    /// Returns true if the point moved.
    pub fn lift(&mut self, contact: Contact) -> bool {
        if contact.z > self.position.z {
            self.position.z = contact.z;
            self.cc = Some(contact.cc);
            true
        } else {
            false
        }
    }
}

impl From<Point3> for ClPoint {
    fn from(p: Point3) -> Self {
        Self {
            position: p,
            cc: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lift_is_running_max() {
        let mut cl = ClPoint::new(1.0, 2.0, 0.0);
        assert!(cl.lift(Contact::new(0.5, Point3::origin(), CcType::Vertex)));
        assert!(!cl.lift(Contact::new(0.2, Point3::origin(), CcType::Facet)));
        assert_eq!(cl.z(), 0.5);
        assert_eq!(cl.cc.unwrap().kind, CcType::Vertex);
        // equal height keeps the first contact
        assert!(!cl.lift(Contact::new(0.5, Point3::origin(), CcType::Edge)));
        assert_eq!(cl.cc.unwrap().kind, CcType::Vertex);
    }

    #[test]
    fn test_highest() {
        let a = Contact::new(1.0, Point3::origin(), CcType::Vertex);
        let b = Contact::new(2.0, Point3::origin(), CcType::Edge);
        assert_eq!(Contact::highest(Some(a), Some(b)), Some(b));
        assert_eq!(Contact::highest(Some(a), None), Some(a));
        assert_eq!(Contact::highest(None, None), None);
    }
}
