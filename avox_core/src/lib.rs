//! # avox_core
//!
//! Numerical kernels for precomputing acoustic voxel metadata.
//!
//! This crate holds the pure math behind the waveguide precompute: no file
//! formats, no mesh parsing, no threading. Everything here is deterministic
//! and allocation-light so the higher layers can call it from any chunk of
//! the evaluation in any order.
//!
//! ## Feature Flags
//!
//! - `std` (default): Implements `std::error::Error` for [`CoreError`]
//!
//! Without `std` the crate is `no_std` and only needs `alloc`.
//!
//! ## Modules
//!
//! - [`types`]: `Point3` and the numerical tolerances
//! - [`grid`]: Dense voxel grid sizing and row-major index flattening
//! - [`geometry`]: Closest point on a triangle, face normals, the sign rule
//! - [`gradient`]: Finite-difference gradients and unit normals
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```ignore
//! use avox_core::prelude::*;
//!
//! let grid = GridSpec::from_bounds(Point3::splat(0.0), Point3::splat(1.0), 0.5, 1)?;
//! assert_eq!(grid.dims, [5, 5, 5]);
//!
//! let sdf: Vec<f32> = (0..grid.total_voxels())
//!     .map(|i| (grid.point_at(i) - Point3::splat(0.5)).length() as f32 - 0.5)
//!     .collect();
//! let normals = estimate_normals(&sdf, &grid)?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod geometry;
pub mod gradient;
pub mod grid;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::CoreError;
    pub use crate::geometry::{closest_point_on_triangle, signed_from_face_normal, triangle_normal};
    pub use crate::gradient::{estimate_normals, gradient_at, unit_normal};
    pub use crate::grid::GridSpec;
    pub use crate::types::{Point3, GRADIENT_EPSILON, MERGE_TOLERANCE};
}

pub use error::CoreError;
pub use geometry::{closest_point_on_triangle, signed_from_face_normal, triangle_normal};
pub use gradient::{estimate_normals, gradient_at, unit_normal};
pub use grid::GridSpec;
pub use types::{Point3, GRADIENT_EPSILON, MERGE_TOLERANCE};
