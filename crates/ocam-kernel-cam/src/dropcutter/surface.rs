//! Triangle surfaces and a 2D grid index for candidate lookup.

use std::collections::HashMap;

use ocam_kernel_math::{BoundingBox, Point3, Triangle};

use crate::{CamError, Result};

/// An unordered set of triangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    triangles: Vec<Triangle>,
    bbox: Option<BoundingBox>,
}

impl Surface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a surface from triangles.
    pub fn from_triangles(triangles: impl IntoIterator<Item = Triangle>) -> Self {
        let mut surface = Self::new();
        for tri in triangles {
            surface.add_triangle(tri);
        }
        surface
    }

    /// Build a surface from an indexed vertex list (groups of 3 indices).
    ///
    /// Trailing indices that do not form a full triangle are ignored.
    pub fn from_indexed(vertices: &[Point3], indices: &[u32]) -> Result<Self> {
        let mut surface = Self::new();
        for chunk in indices.chunks_exact(3) {
            let mut p = [Point3::origin(); 3];
            for (slot, &i) in p.iter_mut().zip(chunk) {
                *slot = *vertices.get(i as usize).ok_or_else(|| {
                    CamError::InvalidArgument(format!(
                        "vertex index {i} out of range ({} vertices)",
                        vertices.len()
                    ))
                })?;
            }
            surface.add_triangle(Triangle::new(p[0], p[1], p[2]));
        }
        Ok(surface)
    }

    /// Add a triangle.
    pub fn add_triangle(&mut self, tri: Triangle) {
        match &mut self.bbox {
            Some(bb) => {
                bb.add_point(&tri.bbox().min);
                bb.add_point(&tri.bbox().max);
            }
            None => self.bbox = Some(*tri.bbox()),
        }
        self.triangles.push(tri);
    }

    /// All triangles.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True if the surface has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of all triangles, `None` when empty.
    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }
}

/// 2D grid-based spatial index over a [`Surface`].
///
/// Each triangle is registered in every cell its xy bounding box touches.
#[derive(Debug, Clone)]
pub struct SurfaceIndex {
    surface: Surface,
    cell_size: f64,
    origin: (f64, f64),
    grid_nx: usize,
    grid_ny: usize,
    cells: HashMap<(usize, usize), Vec<usize>>,
}

impl SurfaceIndex {
    /// Index `surface` with square cells of side `cell_size`.
    pub fn new(surface: Surface, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(CamError::InvalidArgument(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        let Some(bb) = surface.bbox().copied() else {
            return Ok(Self {
                surface,
                cell_size,
                origin: (0.0, 0.0),
                grid_nx: 0,
                grid_ny: 0,
                cells: HashMap::new(),
            });
        };

        let padding = cell_size * 0.1;
        let origin = (bb.min.x - padding, bb.min.y - padding);
        let grid_nx = ((bb.max.x + padding - origin.0) / cell_size).ceil() as usize + 1;
        let grid_ny = ((bb.max.y + padding - origin.1) / cell_size).ceil() as usize + 1;

        let mut cells: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (tri_idx, tri) in surface.triangles().iter().enumerate() {
            let tb = tri.bbox();
            let x0 = ((tb.min.x - origin.0) / cell_size).floor() as usize;
            let y0 = ((tb.min.y - origin.1) / cell_size).floor() as usize;
            let x1 = ((tb.max.x - origin.0) / cell_size).floor() as usize;
            let y1 = ((tb.max.y - origin.1) / cell_size).floor() as usize;

            for iy in y0..=y1.min(grid_ny - 1) {
                for ix in x0..=x1.min(grid_nx - 1) {
                    cells.entry((ix, iy)).or_default().push(tri_idx);
                }
            }
        }

        Ok(Self {
            surface,
            cell_size,
            origin,
            grid_nx,
            grid_ny,
            cells,
        })
    }

    /// The indexed surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Cell side length.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Indices of triangles whose xy bounding box may overlap the circle at
    /// (x, y) with the given radius. Sorted, without duplicates.
    pub fn query_circle(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        let mut result = Vec::new();
        if self.grid_nx == 0 {
            return result;
        }

        let x0 = ((x - radius - self.origin.0) / self.cell_size).floor() as isize;
        let y0 = ((y - radius - self.origin.1) / self.cell_size).floor() as isize;
        let x1 = ((x + radius - self.origin.0) / self.cell_size).floor() as isize;
        let y1 = ((y + radius - self.origin.1) / self.cell_size).floor() as isize;

        for iy in y0.max(0)..=y1.min(self.grid_ny as isize - 1) {
            for ix in x0.max(0)..=x1.min(self.grid_nx as isize - 1) {
                if let Some(indices) = self.cells.get(&(ix as usize, iy as usize)) {
                    result.extend_from_slice(indices);
                }
            }
        }

        result.sort_unstable();
        result.dedup();
        result
    }

    /// Triangles whose xy bounding box overlaps the cutter footprint.
    pub fn candidates(&self, x: f64, y: f64, radius: f64) -> impl Iterator<Item = &Triangle> {
        let footprint = BoundingBox::new(Point3::new(x, y, 0.0), Point3::new(x, y, 0.0))
            .expanded_xy(radius);
        self.query_circle(x, y, radius)
            .into_iter()
            .map(move |i| &self.surface.triangles[i])
            .filter(move |tri| tri.bbox().overlaps_xy(&footprint))
    }
}
