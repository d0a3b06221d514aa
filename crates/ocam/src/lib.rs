#![warn(missing_docs)]

//! ocam — octree volumes and drop-cutter toolpaths
//!
//! Re-exports the kernel crates behind one import:
//!
//! - [`math`]: points, triangles, bounding boxes, tolerances
//! - [`octree`]: volume octrees with condense and boolean combination
//! - [`cam`]: cutter profiles, sample grids, batch and adaptive drop-cutter
//!
//! # Example
//!
//! ```
//! use ocam::{ClPointGrid, Cutter, Octree, Point3, SphereVolume, Triangle};
//!
//! // stock minus a ball-shaped cut
//! let mut stock = Octree::new(4)?;
//! stock.build(&SphereVolume::new(Point3::new(0.0, 0.0, 0.0), 6.0))?;
//! stock.diff_volume(&SphereVolume::new(Point3::new(4.0, 0.0, 0.0), 3.0))?;
//! assert!(!stock.is_inside(&Point3::new(4.0, 0.0, 0.0)));
//!
//! // drop a ball cutter on a triangle
//! let tri = Triangle::new(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.5),
//! );
//! let cutter = Cutter::ball(0.25)?;
//! let grid = ClPointGrid::new(0.0, 0.1, 1.0, 0.0, 0.1, 1.0, -1.0)?;
//! for mut cl in &grid {
//!     cutter.drop_cutter(&mut cl, &tri);
//!     assert!(cl.z() <= 0.5 + 1e-9);
//! }
//! # Ok::<(), ocam::Error>(())
//! ```

use thiserror::Error;

pub use ocam_kernel_cam as cam;
pub use ocam_kernel_math as math;
pub use ocam_kernel_octree as octree;

pub use ocam_kernel_cam::{
    AdaptivePathDropCutter, AdaptiveSettings, BatchDropCutter, CamError, CcPoint, CcType,
    ClPoint, ClPointGrid, Cutter, DropCutterSettings, HeightField, Path, Surface, SurfaceIndex,
};
pub use ocam_kernel_math::{BoundingBox, Point3, Tolerance, Triangle, Vec3};
pub use ocam_kernel_octree::{
    BooleanOp, CubeVolume, CylMoveVolume, CylinderVolume, NodeColor, NodeInfo, OctVolume, Octree,
    OctreeError, OctreeNode, OctreeSettings, PlaneVolume, SphereVolume,
};

/// Errors from any ocam kernel.
#[derive(Error, Debug)]
pub enum Error {
    /// An octree operation failed.
    #[error(transparent)]
    Octree(#[from] OctreeError),
    /// A drop-cutter operation failed.
    #[error(transparent)]
    Cam(#[from] CamError),
}

/// Result type for ocam operations.
pub type Result<T> = std::result::Result<T, Error>;
