//! avox_io - mesh loading, voxel field evaluation and artifact output for
//! the waveguide precompute.
//!
//! A run turns one OBJ mesh into dense voxel volumes on a regular grid:
//!
//! - signed distance to the surface (negative inside),
//! - a unit normal per voxel from the distance gradient,
//! - the material label of the nearest face.
//!
//! The volumes are written as raw little-endian binaries plus a JSON sidecar
//! next to the mesh. An optional material config (DIF) is validated and
//! normalised alongside.
//!
//! # Core Types
//!
//! - [`PrecomputeJob`]: the whole pipeline, configured by [`PrecomputeConfig`]
//! - [`TriangleMesh`]: triangles in file order with face normals
//! - [`QueryStrategy`]: BVH or brute-force nearest-surface queries, chosen once
//! - [`FieldVolumes`]: SDF, normals and labels over a [`GridSpec`]
//!
//! # Example
//!
//! ```ignore
//! use avox_io::{PrecomputeConfig, PrecomputeJob};
//!
//! let report = PrecomputeJob::new("rooms/hall.obj")
//!     .with_config(PrecomputeConfig::new(0.05, 5))
//!     .with_dif("rooms/hall_materials.json", None)
//!     .run()?;
//!
//! println!("sidecar at {}", report.artifacts.sidecar.display());
//! ```
//!
//! # Crate Features
//!
//! - `bvh` (default): BVH-accelerated nearest-surface queries
//! - `rayon` (default): evaluate chunks in parallel
//! - `snapshot` (default): `.npz` debug snapshots via `ndarray-npy`

pub mod config;
pub mod convert;
pub mod dif;
pub mod error;
pub mod fields;
pub mod format;
pub mod pipeline;
pub mod spatial;

#[cfg(test)]
mod testing;

// Re-export core types from avox_core
pub use avox_core::{GridSpec, Point3};

// Re-export main types
pub use config::{PrecomputeConfig, StrategyPreference};
pub use convert::{parse_obj, parse_obj_file, scan_material_labels, MaterialLabels, TriangleMesh};
pub use dif::MaterialConfig;
pub use error::{AvoxError, Result};
pub use fields::{compute_fields, DistanceFieldEvaluator, FieldVolumes, LabelFieldAssigner};
pub use format::{read_artifacts, write_artifacts, ArtifactMetadata, ArtifactPaths};
#[cfg(feature = "snapshot")]
pub use format::write_snapshot;
pub use pipeline::{precompute, PrecomputeJob, PrecomputeReport};
pub use spatial::{BruteForce, NearestSurface, QueryStrategy, StrategyKind, SurfaceHit};
