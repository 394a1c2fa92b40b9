//! Output formats for computed volumes.
//!
//! - [`artifact`]: raw little-endian volumes plus a JSON sidecar (the
//!   artifact set consumed by the waveguide solver)
//! - `snapshot`: one compressed `.npz` archive for debugging (`snapshot`
//!   feature)
//!
//! # Example
//!
//! ```ignore
//! use avox_io::format::{read_artifacts, write_artifacts, ArtifactPaths};
//!
//! let paths = ArtifactPaths::beside(Path::new("rooms/hall.obj"))?;
//! write_artifacts(&fields, &material_names, &paths)?;
//!
//! let loaded = read_artifacts(&paths.sidecar)?;
//! assert_eq!(loaded.fields.grid, fields.grid);
//! ```

pub mod artifact;
#[cfg(feature = "snapshot")]
pub mod snapshot;

pub use artifact::{
    read_artifacts, write_artifacts, ArtifactFiles, ArtifactLayout, ArtifactMetadata,
    ArtifactPaths, LoadedArtifacts,
};
#[cfg(feature = "snapshot")]
pub use snapshot::{write_snapshot, write_snapshot_to};
