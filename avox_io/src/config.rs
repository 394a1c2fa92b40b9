//! Run configuration for a precompute job.

use crate::error::{AvoxError, Result};

/// Default voxel pitch in metres.
pub const DEFAULT_VOXEL_PITCH: f64 = 0.05;
/// Default padding in voxels around the mesh bounds.
pub const DEFAULT_VOXEL_PAD: i64 = 5;
/// Default number of query points evaluated per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 250_000;

/// Which nearest-surface strategy a run may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyPreference {
    /// Use the accelerated strategy when it is compiled in, else the fallback.
    #[default]
    Auto,
    /// Always use the brute-force fallback.
    Fallback,
}

/// Grid and evaluation parameters (immutable once a run starts).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecomputeConfig {
    /// Voxel edge length in world units.
    pub voxel_pitch: f64,
    /// Extra voxels around the mesh bounds; negative values act as zero.
    pub voxel_pad: i64,
    /// Query points per evaluation chunk.
    pub chunk_size: usize,
    /// Strategy selection.
    pub strategy: StrategyPreference,
}

impl PrecomputeConfig {
    /// Create a configuration with the default chunk size and strategy.
    pub fn new(voxel_pitch: f64, voxel_pad: i64) -> Self {
        Self {
            voxel_pitch,
            voxel_pad,
            ..Default::default()
        }
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the strategy preference.
    pub fn with_strategy(mut self, strategy: StrategyPreference) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check the parameters before any work is done.
    pub fn validate(&self) -> Result<()> {
        if !(self.voxel_pitch.is_finite() && self.voxel_pitch > 0.0) {
            return Err(AvoxError::config(format!(
                "voxel pitch must be > 0, got {}",
                self.voxel_pitch
            )));
        }
        if self.chunk_size == 0 {
            return Err(AvoxError::config("chunk size must be > 0"));
        }
        Ok(())
    }
}

impl Default for PrecomputeConfig {
    fn default() -> Self {
        Self {
            voxel_pitch: DEFAULT_VOXEL_PITCH,
            voxel_pad: DEFAULT_VOXEL_PAD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            strategy: StrategyPreference::Auto,
        }
    }
}
