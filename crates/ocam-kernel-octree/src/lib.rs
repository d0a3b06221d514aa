#![warn(missing_docs)]

//! Volume octrees for the ocam kernel.
//!
//! An [`Octree`] subdivides a fixed root cube against a volume predicate
//! ([`OctVolume`]). Cubes entirely inside the volume become black leaves,
//! cubes entirely outside become white leaves, and boundary cubes are split
//! until the maximum depth is reached.
//!
//! # Features
//!
//! - Sphere, cube, cylinder, half-space and swept-cutter volumes
//! - Condensation of uniform subtrees
//! - Union, difference and intersection of compatible trees
//! - Pre-order node listing for external viewers
//!
//! # Example
//!
//! ```
//! use ocam_kernel_math::Point3;
//! use ocam_kernel_octree::{Octree, SphereVolume};
//!
//! let mut tree = Octree::new(4).unwrap();
//! tree.build(&SphereVolume::new(Point3::new(4.0, 2.0, 3.0), 3.0)).unwrap();
//! let before = tree.size();
//! tree.condense();
//! assert!(tree.size() <= before);
//! assert!(tree.is_inside(&Point3::new(4.0, 2.0, 3.0)));
//! ```

mod combine;
mod octree;
mod volume;

pub use combine::BooleanOp;
pub use octree::{NodeColor, NodeInfo, Octree, OctreeNode, OctreeSettings, MAX_DEPTH};
pub use volume::{
    Axis, CubeClass, CubeVolume, CylMoveVolume, CylinderVolume, OctVolume, PlaneVolume,
    SphereVolume,
};

use thiserror::Error;

/// Errors from octree operations.
#[derive(Debug, Clone, Error)]
pub enum OctreeError {
    /// Malformed construction parameters or incompatible trees.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for octree operations.
pub type Result<T> = std::result::Result<T, OctreeError>;
