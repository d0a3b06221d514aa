//! Adaptive drop-cutter along a path of line spans.
//!
//! Each span is sampled by recursive bisection. A sub-span is split while
//! its xy length exceeds `sampling`, and further down to `min_sampling`
//! while the three cl-points at its start, middle and end are not collinear
//! within `cos_limit`.

use log::{debug, trace};
use ocam_kernel_math::{xy_distance, Point3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{CamError, ClPoint, Cutter, Result, Surface, SurfaceIndex};

/// Sampling parameters for [`AdaptivePathDropCutter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSettings {
    /// Largest allowed xy distance between consecutive samples.
    pub sampling: f64,
    /// Smallest xy distance reached when refining non-flat regions.
    pub min_sampling: f64,
    /// Cosine of the largest turn angle still considered flat.
    pub cos_limit: f64,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            sampling: 0.1,
            min_sampling: 0.01,
            cos_limit: 0.999,
        }
    }
}

impl AdaptiveSettings {
    /// Check that the sampling distances are positive and ordered.
    pub fn validate(&self) -> Result<()> {
        if !(self.sampling.is_finite() && self.sampling > 0.0) {
            return Err(CamError::InvalidArgument(format!(
                "sampling must be positive, got {}",
                self.sampling
            )));
        }
        if !(self.min_sampling > 0.0 && self.min_sampling <= self.sampling) {
            return Err(CamError::InvalidArgument(format!(
                "min_sampling must lie in (0, {}], got {}",
                self.sampling, self.min_sampling
            )));
        }
        if !(-1.0..=1.0).contains(&self.cos_limit) {
            return Err(CamError::InvalidArgument(format!(
                "cos_limit must lie in [-1, 1], got {}",
                self.cos_limit
            )));
        }
        Ok(())
    }
}

/// A straight move from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Start point; its z is the initial cl height.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl Span {
    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point3 {
        self.start + (self.end - self.start) * t
    }

    /// Length of the span projected on the xy plane.
    pub fn xy_length(&self) -> f64 {
        xy_distance(&self.start, &self.end)
    }
}

/// An ordered list of spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// The spans, in machining order.
    pub spans: Vec<Span>,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line span.
    pub fn append_line(&mut self, start: Point3, end: Point3) {
        self.spans.push(Span { start, end });
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True if the path has no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Drops a cutter along a [`Path`], placing samples where the surface bends.
#[derive(Debug, Clone)]
pub struct AdaptivePathDropCutter {
    cutter: Cutter,
    index: SurfaceIndex,
    settings: AdaptiveSettings,
}

impl AdaptivePathDropCutter {
    /// Index `surface` for adaptive drops with `cutter`.
    pub fn new(cutter: Cutter, surface: Surface, settings: AdaptiveSettings) -> Result<Self> {
        cutter.validate()?;
        settings.validate()?;
        let index = SurfaceIndex::new(surface, cutter.diameter())?;
        Ok(Self {
            cutter,
            index,
            settings,
        })
    }

    /// Sampling parameters.
    pub fn settings(&self) -> &AdaptiveSettings {
        &self.settings
    }

    /// Sample every span of `path`. Each span contributes its start point
    /// followed by the refined samples up to and including its end point.
    pub fn run(&self, path: &Path) -> Vec<ClPoint> {
        let per_span: Vec<Vec<ClPoint>> = path
            .spans
            .par_iter()
            .map(|span| self.sample_span(span))
            .collect();
        let out: Vec<ClPoint> = per_span.into_iter().flatten().collect();
        debug!("adaptive drop: {} spans -> {} cl-points", path.len(), out.len());
        out
    }

    fn sample_span(&self, span: &Span) -> Vec<ClPoint> {
        let start = self.drop_at(span.point_at(0.0));
        let stop = self.drop_at(span.point_at(1.0));
        let mut out = vec![start];
        self.refine(span, 0.0, 1.0, start, stop, &mut out);
        trace!(
            "span {:?} -> {:?} ({:.4} long): {} samples",
            span.start,
            span.end,
            span.xy_length(),
            out.len()
        );
        out
    }

    fn refine(
        &self,
        span: &Span,
        t0: f64,
        t1: f64,
        cl0: ClPoint,
        cl1: ClPoint,
        out: &mut Vec<ClPoint>,
    ) {
        let step = xy_distance(&cl0.position, &cl1.position);
        if step > self.settings.min_sampling {
            let tm = t0 + (t1 - t0) / 2.0;
            let mid = self.drop_at(span.point_at(tm));
            if step > self.settings.sampling || !self.flat(&cl0, &mid, &cl1) {
                self.refine(span, t0, tm, cl0, mid, out);
                self.refine(span, tm, t1, mid, cl1, out);
                return;
            }
        }
        out.push(cl1);
    }

    fn flat(&self, a: &ClPoint, b: &ClPoint, c: &ClPoint) -> bool {
        let v1 = b.position - a.position;
        let v2 = c.position - b.position;
        match (v1.try_normalize(0.0), v2.try_normalize(0.0)) {
            (Some(v1), Some(v2)) => v1.dot(&v2) > self.settings.cos_limit,
            _ => true,
        }
    }

    fn drop_at(&self, p: Point3) -> ClPoint {
        let mut cl = ClPoint::from(p);
        self.cutter.drop_cutter_indexed(&mut cl, &self.index);
        cl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocam_kernel_math::Triangle;

    /// A ridge along y: flat at z = 0 for |x| > 1, peaking at x = 0.
    fn ridge() -> Surface {
        let mut s = Surface::new();
        let pts = [(-3.0, 0.0), (-1.0, 0.0), (0.0, 0.5), (1.0, 0.0), (3.0, 0.0)];
        for w in pts.windows(2) {
            let (x0, z0) = w[0];
            let (x1, z1) = w[1];
            s.add_triangle(Triangle::new(
                Point3::new(x0, -2.0, z0),
                Point3::new(x1, -2.0, z1),
                Point3::new(x1, 2.0, z1),
            ));
            s.add_triangle(Triangle::new(
                Point3::new(x0, -2.0, z0),
                Point3::new(x1, 2.0, z1),
                Point3::new(x0, 2.0, z0),
            ));
        }
        s
    }

    fn cutter() -> AdaptivePathDropCutter {
        AdaptivePathDropCutter::new(
            Cutter::ball(0.2).unwrap(),
            ridge(),
            AdaptiveSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_spacing_bounds() {
        let apdc = cutter();
        let mut path = Path::new();
        path.append_line(Point3::new(-2.5, 0.0, -1.0), Point3::new(2.5, 0.0, -1.0));
        let pts = apdc.run(&path);

        assert_eq!(pts.first().unwrap().x(), -2.5);
        assert_eq!(pts.last().unwrap().x(), 2.5);
        for w in pts.windows(2) {
            let step = xy_distance(&w[0].position, &w[1].position);
            assert!(step <= 0.1 + 1e-12, "step {step}");
            assert!(step > 0.005, "step {step}");
            assert!(w[1].x() > w[0].x());
        }
    }

    #[test]
    fn test_refines_near_bends() {
        let apdc = cutter();
        let mut path = Path::new();
        path.append_line(Point3::new(-2.5, 0.0, -1.0), Point3::new(2.5, 0.0, -1.0));
        let pts = apdc.run(&path);

        let near_peak = pts.iter().filter(|p| p.x().abs() < 0.25).count();
        let far_flat = pts.iter().filter(|p| p.x() > 1.75 && p.x() < 2.25).count();
        assert!(near_peak > far_flat, "{near_peak} vs {far_flat}");
    }

    #[test]
    fn test_spans_concatenate_in_order() {
        let apdc = cutter();
        let mut path = Path::new();
        path.append_line(Point3::new(-2.0, -1.0, -1.0), Point3::new(2.0, -1.0, -1.0));
        path.append_line(Point3::new(2.0, 1.0, -1.0), Point3::new(-2.0, 1.0, -1.0));
        let pts = apdc.run(&path);
        let split = pts.iter().position(|p| p.y() == 1.0).unwrap();
        assert!(pts[..split].iter().all(|p| p.y() == -1.0));
        assert!(pts[split..].iter().all(|p| p.y() == 1.0));
        assert_eq!(pts[split].x(), 2.0);
        assert!(pts.iter().all(|p| p.z() >= -1e-9));
    }

    #[test]
    fn test_invalid_settings() {
        let bad = AdaptiveSettings {
            min_sampling: 0.5,
            ..Default::default()
        };
        assert!(AdaptivePathDropCutter::new(Cutter::ball(0.2).unwrap(), ridge(), bad).is_err());
        let bad = AdaptiveSettings {
            sampling: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
