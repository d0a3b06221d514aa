//! Cutter profiles.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::{CamError, Result};

/// A rotationally symmetric milling cutter.
///
/// All heights are measured from the cutter tip, the lowest point on the
/// axis. Use the checked constructors; the fields are public so that
/// deserialized cutters can be checked with [`Cutter::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Cutter {
    /// Flat end mill.
    Cylindrical {
        /// Cutter diameter.
        diameter: f64,
    },
    /// Ball end mill.
    Ball {
        /// Cutter diameter.
        diameter: f64,
    },
    /// Flat end mill with a toroidal corner.
    BullNose {
        /// Cutter diameter.
        diameter: f64,
        /// Corner (torus tube) radius, at most half the diameter.
        corner_radius: f64,
    },
    /// Cone with its point at the tip.
    Conical {
        /// Diameter at the top of the cone.
        diameter: f64,
        /// Angle between the axis and the cone surface, in radians.
        half_angle: f64,
    },
}

impl Cutter {
    /// Flat end mill of the given diameter.
    pub fn cylindrical(diameter: f64) -> Result<Self> {
        Self::Cylindrical { diameter }.checked()
    }

    /// Ball end mill of the given diameter.
    pub fn ball(diameter: f64) -> Result<Self> {
        Self::Ball { diameter }.checked()
    }

    /// Bull-nose cutter. `corner_radius` must lie in `[0, diameter / 2]`.
    pub fn bull_nose(diameter: f64, corner_radius: f64) -> Result<Self> {
        Self::BullNose {
            diameter,
            corner_radius,
        }
        .checked()
    }

    /// Conical cutter. `half_angle` must lie in `(0, pi/2)`.
    pub fn conical(diameter: f64, half_angle: f64) -> Result<Self> {
        Self::Conical {
            diameter,
            half_angle,
        }
        .checked()
    }

    fn checked(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Check the cutter parameters.
    pub fn validate(&self) -> Result<()> {
        let d = self.diameter();
        if !d.is_finite() || d <= 0.0 {
            return Err(CamError::InvalidArgument(format!(
                "cutter diameter must be positive, got {d}"
            )));
        }
        match *self {
            Cutter::BullNose { corner_radius, .. } => {
                if !(0.0..=d / 2.0).contains(&corner_radius) {
                    return Err(CamError::InvalidArgument(format!(
                        "corner radius {corner_radius} outside [0, {}]",
                        d / 2.0
                    )));
                }
            }
            Cutter::Conical { half_angle, .. } => {
                if !(half_angle > 0.0 && half_angle < FRAC_PI_2) {
                    return Err(CamError::InvalidArgument(format!(
                        "cone half-angle {half_angle} outside (0, pi/2)"
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Cutter diameter.
    pub fn diameter(&self) -> f64 {
        match *self {
            Cutter::Cylindrical { diameter }
            | Cutter::Ball { diameter }
            | Cutter::BullNose { diameter, .. }
            | Cutter::Conical { diameter, .. } => diameter,
        }
    }

    /// Cutter radius.
    pub fn radius(&self) -> f64 {
        self.diameter() / 2.0
    }

    /// Height of the cutter surface above the tip at radial offset `r`.
    ///
    /// Defined for `0 <= r <= radius()`; larger offsets are clamped.
    pub fn height(&self, r: f64) -> f64 {
        let big_r = self.radius();
        let r = r.clamp(0.0, big_r);
        match *self {
            Cutter::Cylindrical { .. } => 0.0,
            Cutter::Ball { .. } => big_r - (big_r * big_r - r * r).max(0.0).sqrt(),
            Cutter::BullNose { corner_radius, .. } => {
                let a = big_r - corner_radius;
                if r <= a {
                    0.0
                } else {
                    let w = r - a;
                    corner_radius - (corner_radius * corner_radius - w * w).max(0.0).sqrt()
                }
            }
            Cutter::Conical { half_angle, .. } => r / half_angle.tan(),
        }
    }

    /// Height of the cutting profile; above it the cutter is a cylinder.
    pub fn length(&self) -> f64 {
        self.height(self.radius())
    }

    /// Horizontal offset from the axis to the center of the contact
    /// profile used by the facet test.
    pub(crate) fn xy_normal_length(&self) -> f64 {
        match *self {
            Cutter::Cylindrical { .. } | Cutter::Conical { .. } => self.radius(),
            Cutter::Ball { .. } => 0.0,
            Cutter::BullNose { corner_radius, .. } => self.radius() - corner_radius,
        }
    }

    /// Offset along the facet normal from the contact to the profile center.
    pub(crate) fn normal_length(&self) -> f64 {
        match *self {
            Cutter::Cylindrical { .. } | Cutter::Conical { .. } => 0.0,
            Cutter::Ball { .. } => self.radius(),
            Cutter::BullNose { corner_radius, .. } => corner_radius,
        }
    }

    /// Height of the profile center above the tip.
    pub(crate) fn center_height(&self) -> f64 {
        match *self {
            Cutter::Cylindrical { .. } => 0.0,
            Cutter::Ball { .. } => self.radius(),
            Cutter::BullNose { corner_radius, .. } => corner_radius,
            Cutter::Conical { half_angle, .. } => self.radius() / half_angle.tan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_constructors_validate() {
        assert!(Cutter::cylindrical(1.0).is_ok());
        assert!(Cutter::cylindrical(0.0).is_err());
        assert!(Cutter::ball(f64::NAN).is_err());
        assert!(Cutter::bull_nose(1.0, 0.5).is_ok());
        assert!(Cutter::bull_nose(1.0, 0.0).is_ok());
        assert!(Cutter::bull_nose(1.0, 0.6).is_err());
        assert!(Cutter::bull_nose(1.0, -0.1).is_err());
        assert!(Cutter::conical(1.0, FRAC_PI_4).is_ok());
        assert!(Cutter::conical(1.0, 0.0).is_err());
        assert!(matches!(
            Cutter::conical(1.0, FRAC_PI_2),
            Err(CamError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_profile_heights() {
        let cyl = Cutter::cylindrical(2.0).unwrap();
        assert_eq!(cyl.height(0.7), 0.0);

        let ball = Cutter::ball(2.0).unwrap();
        assert_relative_eq!(ball.height(0.0), 0.0);
        assert_relative_eq!(ball.height(1.0), 1.0);

        let bull = Cutter::bull_nose(2.0, 0.25).unwrap();
        assert_eq!(bull.height(0.75), 0.0);
        assert_relative_eq!(bull.height(1.0), 0.25);

        let cone = Cutter::conical(2.0, FRAC_PI_4).unwrap();
        assert_relative_eq!(cone.height(0.5), 0.5, epsilon = 1e-12);
        assert_relative_eq!(cone.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_serde_tagged() {
        let cutter = Cutter::bull_nose(0.5234, 0.1).unwrap();
        let json = serde_json::to_string(&cutter).unwrap();
        assert!(json.contains("\"type\":\"BullNose\""));
        let back: Cutter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cutter);
    }
}
