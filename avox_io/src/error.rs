//! Error types for avox_io operations.
//!
//! One variant per failure class of a precompute run. Nothing is retried: the
//! computation is deterministic, so fixing the input and rerunning is the
//! recovery path.

use avox_core::CoreError;
use thiserror::Error;

/// Errors that can occur while loading inputs, computing fields or writing artifacts.
#[derive(Error, Debug)]
pub enum AvoxError {
    /// Invalid run parameters (pitch, chunk size, unsupported options).
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// Two views of the same input disagree (e.g. face counts).
    #[error("consistency error: {message}")]
    Consistency {
        /// Description of the mismatch.
        message: String,
    },

    /// An input could not be parsed or holds no usable geometry.
    #[error("load error: {message}")]
    Load {
        /// Description of the load failure.
        message: String,
    },

    /// A material config is missing required keys.
    #[error("schema error: {message}")]
    Schema {
        /// Description of the schema violation.
        message: String,
    },

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AvoxError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        AvoxError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn consistency(message: impl Into<String>) -> Self {
        AvoxError::Consistency {
            message: message.into(),
        }
    }

    pub(crate) fn load(message: impl Into<String>) -> Self {
        AvoxError::Load {
            message: message.into(),
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        AvoxError::Schema {
            message: message.into(),
        }
    }
}

impl From<CoreError> for AvoxError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::VolumeSizeMismatch { .. } => AvoxError::consistency(err.to_string()),
            CoreError::InvalidPitch { .. }
            | CoreError::NonFiniteBounds
            | CoreError::GridTooLarge { .. } => AvoxError::config(err.to_string()),
        }
    }
}

/// Result type alias for avox_io operations.
pub type Result<T> = std::result::Result<T, AvoxError>;
