//! Regular grids of sample points.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::{CamError, ClPoint, Result};

/// Slack when counting steps, so that a span that is a whole number of
/// steps up to floating-point rounding does not get an extra sample.
const COUNT_EPS: f64 = 1e-9;

/// A regular grid of cl-points on the plane `z`.
///
/// Points are produced row-major: y is the outer loop and x the inner one.
/// Along each axis the samples are `min + i * step`, and the last one is
/// clamped onto `max`. The grid is a value; every [`ClPointGrid::iter`]
/// call starts a fresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClPointGrid {
    min_x: f64,
    dx: f64,
    max_x: f64,
    min_y: f64,
    dy: f64,
    max_y: f64,
    z: f64,
    nx: usize,
    ny: usize,
}

impl ClPointGrid {
    /// Create a grid covering `[min_x, max_x] x [min_y, max_y]`.
    pub fn new(
        min_x: f64,
        dx: f64,
        max_x: f64,
        min_y: f64,
        dy: f64,
        max_y: f64,
        z: f64,
    ) -> Result<Self> {
        let nx = axis_count("x", min_x, dx, max_x)?;
        let ny = axis_count("y", min_y, dy, max_y)?;
        if nx.checked_mul(ny).is_none() {
            return Err(CamError::InvalidArgument(format!(
                "grid of {nx} x {ny} points is too large"
            )));
        }
        if !z.is_finite() {
            return Err(CamError::InvalidArgument(format!("grid z must be finite, got {z}")));
        }
        Ok(Self {
            min_x,
            dx,
            max_x,
            min_y,
            dy,
            max_y,
            z,
            nx,
            ny,
        })
    }

    /// Samples along x.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Samples along y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of points.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// Always false: a valid grid has at least one point.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Step along x.
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Step along y.
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Height of the grid plane.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Bounds as `[min_x, min_y, max_x, max_y]`.
    pub fn bounds(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// X coordinate of column `ix`.
    pub fn x_at(&self, ix: usize) -> f64 {
        (self.min_x + ix as f64 * self.dx).min(self.max_x)
    }

    /// Y coordinate of row `iy`.
    pub fn y_at(&self, iy: usize) -> f64 {
        (self.min_y + iy as f64 * self.dy).min(self.max_y)
    }

    /// Point at column `ix`, row `iy`, or `None` outside the grid.
    pub fn get(&self, ix: usize, iy: usize) -> Option<ClPoint> {
        (ix < self.nx && iy < self.ny).then(|| ClPoint::new(self.x_at(ix), self.y_at(iy), self.z))
    }

    /// Iterate over all points, y outer and x inner.
    pub fn iter(&self) -> GridIter {
        GridIter {
            grid: *self,
            front: 0,
            back: self.len(),
        }
    }

    fn point(&self, i: usize) -> ClPoint {
        ClPoint::new(self.x_at(i % self.nx), self.y_at(i / self.nx), self.z)
    }
}

fn axis_count(axis: &str, min: f64, step: f64, max: f64) -> Result<usize> {
    if !(min.is_finite() && max.is_finite()) {
        return Err(CamError::InvalidArgument(format!(
            "{axis} bounds must be finite, got [{min}, {max}]"
        )));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(CamError::InvalidArgument(format!(
            "{axis} step must be positive, got {step}"
        )));
    }
    if max < min {
        return Err(CamError::InvalidArgument(format!(
            "{axis} range is inverted: {min} > {max}"
        )));
    }
    let steps = ((max - min) / step - COUNT_EPS).ceil().max(0.0);
    if steps >= usize::MAX as f64 {
        return Err(CamError::InvalidArgument(format!(
            "{axis} step {step} is too small for [{min}, {max}]"
        )));
    }
    (steps as usize).checked_add(1).ok_or_else(|| {
        CamError::InvalidArgument(format!("{axis} step {step} is too small for [{min}, {max}]"))
    })
}

impl IntoIterator for &ClPointGrid {
    type Item = ClPoint;
    type IntoIter = GridIter;

    fn into_iter(self) -> GridIter {
        self.iter()
    }
}

/// Iterator over the points of a [`ClPointGrid`].
#[derive(Debug, Clone)]
pub struct GridIter {
    grid: ClPointGrid,
    front: usize,
    back: usize,
}

impl Iterator for GridIter {
    type Item = ClPoint;

    fn next(&mut self) -> Option<ClPoint> {
        if self.front >= self.back {
            return None;
        }
        let p = self.grid.point(self.front);
        self.front += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<ClPoint> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for GridIter {
    fn next_back(&mut self) -> Option<ClPoint> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.grid.point(self.back))
    }
}

impl ExactSizeIterator for GridIter {}

impl FusedIterator for GridIter {}
