//! Drop-cutter algorithms.
//!
//! Drop-cutter determines the lowest tip height at which a cutter can sit
//! above an (x, y) position without penetrating a triangle. Three contact
//! sources are tested independently and combined with a running maximum:
//!
//! - **Vertex**: the profile touches a corner ([`Cutter::vertex_drop`])
//! - **Edge**: the profile touches an edge ([`Cutter::edge_drop`])
//! - **Facet**: the profile rests on the plane ([`Cutter::facet_drop`])
//!
//! Positions out of reach of a triangle, and degenerate triangles, give no
//! contact; [`Cutter::drop_height`] reports that as negative infinity.

mod edge;
mod facet;
mod surface;
mod vertex;

pub use surface::{Surface, SurfaceIndex};

use ocam_kernel_math::{BoundingBox, Point3, Triangle};
use serde::{Deserialize, Serialize};

use crate::{ClPoint, ClPointGrid, Contact, Cutter};

impl Cutter {
    /// Highest contact of any kind at (x, y).
    pub fn drop_contact(&self, x: f64, y: f64, tri: &Triangle) -> Option<Contact> {
        let c = Contact::highest(self.vertex_contact(x, y, tri), self.facet_contact(x, y, tri));
        Contact::highest(c, self.edge_contact(x, y, tri))
    }

    /// Drop height at (x, y), or `f64::NEG_INFINITY` when the cutter does
    /// not touch the triangle there.
    pub fn drop_height(&self, x: f64, y: f64, tri: &Triangle) -> f64 {
        self.drop_contact(x, y, tri)
            .map_or(f64::NEG_INFINITY, |c| c.z)
    }

    /// Run vertex, facet and edge drop. Returns true if `cl` moved.
    pub fn drop_cutter(&self, cl: &mut ClPoint, tri: &Triangle) -> bool {
        // no contact sits above the highest vertex
        if tri.max_z() <= cl.z() {
            return false;
        }
        let v = self.vertex_drop(cl, tri);
        let f = self.facet_drop(cl, tri);
        let e = self.edge_drop(cl, tri);
        v || f || e
    }

    /// Drop onto every triangle of `surface` whose footprint overlaps the
    /// cutter. Returns true if `cl` moved.
    pub fn drop_cutter_surface(&self, cl: &mut ClPoint, surface: &Surface) -> bool {
        let footprint = BoundingBox::new(cl.position, cl.position).expanded_xy(self.radius());
        let mut moved = false;
        for tri in surface.triangles() {
            if tri.bbox().overlaps_xy(&footprint) {
                moved |= self.drop_cutter(cl, tri);
            }
        }
        moved
    }

    /// Like [`Cutter::drop_cutter_surface`], testing only the index's
    /// candidate triangles.
    pub fn drop_cutter_indexed(&self, cl: &mut ClPoint, index: &SurfaceIndex) -> bool {
        let mut moved = false;
        for tri in index.candidates(cl.x(), cl.y(), self.radius()) {
            moved |= self.drop_cutter(cl, tri);
        }
        moved
    }
}

/// A 2D grid of drop heights.
///
/// Heights are stored row-major (y outer, x inner), matching the iteration
/// order of [`ClPointGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    /// Sample positions.
    pub grid: ClPointGrid,
    /// Tip heights, one per grid point.
    pub heights: Vec<f64>,
}

impl HeightField {
    /// Create a height field over `grid` filled with a constant value.
    pub fn new(grid: ClPointGrid, initial: f64) -> Self {
        Self {
            heights: vec![initial; grid.len()],
            grid,
        }
    }

    /// Collect the heights of cl-points produced in grid order.
    pub fn from_points(grid: ClPointGrid, points: &[ClPoint]) -> Self {
        debug_assert_eq!(points.len(), grid.len());
        Self {
            heights: points.iter().map(ClPoint::z).collect(),
            grid,
        }
    }

    /// Number of samples in X direction.
    pub fn nx(&self) -> usize {
        self.grid.nx()
    }

    /// Number of samples in Y direction.
    pub fn ny(&self) -> usize {
        self.grid.ny()
    }

    /// Get the index for (ix, iy).
    pub fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx() + ix
    }

    /// Get the height at a grid index.
    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.heights[self.index(ix, iy)]
    }

    /// Set the height at a grid index.
    pub fn set(&mut self, ix: usize, iy: usize, z: f64) {
        let i = self.index(ix, iy);
        self.heights[i] = z;
    }

    /// Sample position and height at a grid index.
    pub fn point_at(&self, ix: usize, iy: usize) -> Point3 {
        Point3::new(self.grid.x_at(ix), self.grid.y_at(iy), self.get(ix, iy))
    }

    /// Interpolate height at an arbitrary (x, y) position using bilinear
    /// interpolation. `None` outside the grid.
    pub fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        let [min_x, min_y, max_x, max_y] = self.grid.bounds();
        if x < min_x || x > max_x || y < min_y || y > max_y {
            return None;
        }

        let (ix0, ix1, tx) = bracket(x, min_x, self.grid.dx(), self.nx(), |i| self.grid.x_at(i));
        let (iy0, iy1, ty) = bracket(y, min_y, self.grid.dy(), self.ny(), |i| self.grid.y_at(i));

        let z00 = self.get(ix0, iy0);
        let z10 = self.get(ix1, iy0);
        let z01 = self.get(ix0, iy1);
        let z11 = self.get(ix1, iy1);

        let z0 = z00 * (1.0 - tx) + z10 * tx;
        let z1 = z01 * (1.0 - tx) + z11 * tx;

        Some(z0 * (1.0 - ty) + z1 * ty)
    }
}

/// Neighbouring sample indices around `v` and the blend factor between them.
fn bracket(
    v: f64,
    min: f64,
    step: f64,
    n: usize,
    coord: impl Fn(usize) -> f64,
) -> (usize, usize, f64) {
    if n <= 1 {
        return (0, 0, 0.0);
    }
    let i0 = (((v - min) / step).floor() as usize).min(n - 2);
    let i1 = i0 + 1;
    let (c0, c1) = (coord(i0), coord(i1));
    let t = if c1 > c0 { ((v - c0) / (c1 - c0)).clamp(0.0, 1.0) } else { 0.0 };
    (i0, i1, t)
}
