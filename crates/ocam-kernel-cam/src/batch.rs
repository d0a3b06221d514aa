//! Drop a cutter at many sample points against a surface.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{ClPoint, ClPointGrid, Cutter, HeightField, Result, Surface, SurfaceIndex};

/// Settings for batch drop-cutter runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropCutterSettings {
    /// Floor for every sample: points start at `max(z, min_z)`.
    pub min_z: Option<f64>,
    /// Drop samples on the rayon thread pool.
    pub parallel: bool,
}

impl Default for DropCutterSettings {
    fn default() -> Self {
        Self {
            min_z: None,
            parallel: true,
        }
    }
}

/// Drops one cutter at many positions against an indexed surface.
#[derive(Debug, Clone)]
pub struct BatchDropCutter {
    cutter: Cutter,
    index: SurfaceIndex,
    settings: DropCutterSettings,
}

impl BatchDropCutter {
    /// Index `surface` for `cutter`. Index cells are one cutter diameter wide.
    pub fn new(cutter: Cutter, surface: Surface, settings: DropCutterSettings) -> Result<Self> {
        cutter.validate()?;
        let index = SurfaceIndex::new(surface, cutter.diameter())?;
        Ok(Self {
            cutter,
            index,
            settings,
        })
    }

    /// The cutter being dropped.
    pub fn cutter(&self) -> &Cutter {
        &self.cutter
    }

    /// The indexed surface.
    pub fn index(&self) -> &SurfaceIndex {
        &self.index
    }

    /// Run settings.
    pub fn settings(&self) -> &DropCutterSettings {
        &self.settings
    }

    /// Drop at every point, returning lifted copies in input order.
    pub fn run(&self, points: &[ClPoint]) -> Vec<ClPoint> {
        let drop_one = |p: &ClPoint| self.drop_point(*p);
        let out: Vec<ClPoint> = if self.settings.parallel {
            points.par_iter().map(drop_one).collect()
        } else {
            points.iter().map(drop_one).collect()
        };

        let contacts = out.iter().filter(|p| p.cc.is_some()).count();
        debug!(
            "batch drop: {} points against {} triangles, {} in contact",
            out.len(),
            self.index.surface().len(),
            contacts
        );
        out
    }

    /// Drop at every point of `grid`, in grid order.
    pub fn run_grid(&self, grid: &ClPointGrid) -> Vec<ClPoint> {
        let points: Vec<ClPoint> = grid.iter().collect();
        self.run(&points)
    }

    /// Drop over `grid` and collect the tip heights.
    pub fn height_field(&self, grid: &ClPointGrid) -> HeightField {
        HeightField::from_points(*grid, &self.run_grid(grid))
    }

    fn drop_point(&self, mut cl: ClPoint) -> ClPoint {
        if let Some(min_z) = self.settings.min_z {
            cl.position.z = cl.position.z.max(min_z);
        }
        self.cutter.drop_cutter_indexed(&mut cl, &self.index);
        cl
    }
}
