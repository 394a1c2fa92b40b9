//! Error types for avox_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std compatibility.

use core::fmt;

/// Errors that can occur during avox_core operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoreError {
    /// Voxel pitch was zero, negative or not finite.
    InvalidPitch {
        /// The rejected pitch.
        pitch: f64,
    },
    /// Bounding box corners were not finite.
    NonFiniteBounds,
    /// The grid would hold more voxels than can be addressed.
    GridTooLarge {
        /// Requested dimensions.
        dims: [u64; 3],
    },
    /// A volume's length does not match the grid it is paired with.
    VolumeSizeMismatch {
        /// Voxel count of the grid.
        expected: usize,
        /// Length of the volume.
        got: usize,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidPitch { pitch } => {
                write!(f, "voxel pitch must be > 0, got {}", pitch)
            }
            CoreError::NonFiniteBounds => write!(f, "bounding box is not finite"),
            CoreError::GridTooLarge { dims } => {
                write!(
                    f,
                    "grid of {}x{}x{} voxels is too large",
                    dims[0], dims[1], dims[2]
                )
            }
            CoreError::VolumeSizeMismatch { expected, got } => {
                write!(
                    f,
                    "volume has {} values but the grid has {} voxels",
                    got, expected
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}

/// Result type alias for avox_core operations.
pub type Result<T> = core::result::Result<T, CoreError>;
