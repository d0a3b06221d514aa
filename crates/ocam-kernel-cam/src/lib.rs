#![warn(missing_docs)]

//! Drop-cutter kernel for ocam.
//!
//! A cutter is lowered along its axis onto triangulated geometry until it
//! first touches a vertex, an edge or a facet. The resulting tip height is
//! the cutter-location (cl) point for that sample position.
//!
//! # Cutters
//!
//! - [`Cutter::Cylindrical`] - flat end mill
//! - [`Cutter::Ball`] - ball end mill
//! - [`Cutter::BullNose`] - flat end mill with a corner radius
//! - [`Cutter::Conical`] - V-bit / cone
//!
//! # Example
//!
//! ```
//! use ocam_kernel_cam::{ClPoint, ClPointGrid, Cutter};
//! use ocam_kernel_math::{Point3, Triangle};
//!
//! let tri = Triangle::new(
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 0.3),
//! );
//! let cutter = Cutter::bull_nose(0.5234, 0.1).unwrap();
//! let grid = ClPointGrid::new(-0.5, 0.01, 1.5, -0.5, 0.05, 1.5, -0.8).unwrap();
//!
//! let heights: Vec<f64> = grid
//!     .iter()
//!     .map(|mut cl| {
//!         cutter.drop_cutter(&mut cl, &tri);
//!         cl.z()
//!     })
//!     .collect();
//! assert_eq!(heights.len(), 201 * 41);
//! ```

mod adaptive;
mod batch;
mod clpoint;
mod cutter;
pub mod dropcutter;
mod grid;

pub use adaptive::{AdaptivePathDropCutter, AdaptiveSettings, Path, Span};
pub use batch::{BatchDropCutter, DropCutterSettings};
pub use clpoint::{CcPoint, CcType, ClPoint, Contact};
pub use cutter::Cutter;
pub use dropcutter::{HeightField, Surface, SurfaceIndex};
pub use grid::{ClPointGrid, GridIter};

use thiserror::Error;

/// Errors from drop-cutter operations.
#[derive(Debug, Clone, Error)]
pub enum CamError {
    /// Malformed cutter, grid, index or sampling parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for drop-cutter operations.
pub type Result<T> = std::result::Result<T, CamError>;
