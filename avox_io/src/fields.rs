//! Volume evaluation over a dense grid.
//!
//! The grid's flat index space is cut into fixed-size chunks. Each chunk
//! materialises only its own query points and writes into its own slice of a
//! pre-sized output buffer, so peak memory beyond the output stays bounded by
//! the chunk size and the result is independent of chunk size or completion
//! order. With the `rayon` feature chunks run concurrently.

use avox_core::{estimate_normals, GridSpec, Point3};
use log::{debug, info};

use crate::error::{AvoxError, Result};
use crate::spatial::{NearestSurface, QueryStrategy, StrategyKind};

/// Label assigned where no nearest triangle resolves.
pub const NO_LABEL: i16 = -1;

/// SDF value where no nearest triangle resolves.
pub const NO_DISTANCE: f32 = f32::MAX;

fn check_chunk_size(chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(AvoxError::config("chunk size must be > 0"));
    }
    Ok(())
}

/// Fill `out` (one slot per voxel of `grid`) chunk by chunk.
fn fill_chunked<T, F>(grid: &GridSpec, chunk_size: usize, out: &mut [T], eval: F)
where
    T: Send,
    F: Fn(Point3) -> T + Sync,
{
    let total_chunks = out.len().div_ceil(chunk_size);
    let fill = |(chunk_idx, chunk): (usize, &mut [T])| {
        let start = chunk_idx * chunk_size;
        let points: Vec<Point3> = (start..start + chunk.len())
            .map(|flat| grid.point_at(flat))
            .collect();
        for (slot, point) in chunk.iter_mut().zip(points) {
            *slot = eval(point);
        }
        debug!("chunk {}/{} done ({} points)", chunk_idx + 1, total_chunks, chunk.len());
    };

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        out.par_chunks_mut(chunk_size).enumerate().for_each(fill);
    }

    #[cfg(not(feature = "rayon"))]
    out.chunks_mut(chunk_size).enumerate().for_each(fill);
}

/// Signed distance volume evaluator.
pub struct DistanceFieldEvaluator<'s, 'm> {
    strategy: &'s QueryStrategy<'m>,
    chunk_size: usize,
}

impl<'s, 'm> DistanceFieldEvaluator<'s, 'm> {
    /// Create an evaluator; fails on a zero chunk size.
    pub fn new(strategy: &'s QueryStrategy<'m>, chunk_size: usize) -> Result<Self> {
        check_chunk_size(chunk_size)?;
        Ok(Self {
            strategy,
            chunk_size,
        })
    }

    /// Signed distance at every voxel of `grid`, row-major.
    pub fn evaluate(&self, grid: &GridSpec) -> Vec<f32> {
        let mut sdf = vec![0.0f32; grid.total_voxels()];
        fill_chunked(grid, self.chunk_size, &mut sdf, |point| {
            self.strategy
                .signed_distance(point)
                .map_or(NO_DISTANCE, |d| d as f32)
        });
        sdf
    }
}

/// Nearest-face material label volume.
pub struct LabelFieldAssigner<'s, 'm> {
    strategy: &'s QueryStrategy<'m>,
    face_labels: &'s [i16],
    chunk_size: usize,
}

impl<'s, 'm> LabelFieldAssigner<'s, 'm> {
    /// Create an assigner; fails on a zero chunk size.
    pub fn new(
        strategy: &'s QueryStrategy<'m>,
        face_labels: &'s [i16],
        chunk_size: usize,
    ) -> Result<Self> {
        check_chunk_size(chunk_size)?;
        Ok(Self {
            strategy,
            face_labels,
            chunk_size,
        })
    }

    /// Material id of the nearest face at every voxel, [`NO_LABEL`] where none resolves.
    pub fn assign(&self, grid: &GridSpec) -> Vec<i16> {
        let mut labels = vec![NO_LABEL; grid.total_voxels()];
        fill_chunked(grid, self.chunk_size, &mut labels, |point| {
            self.strategy
                .nearest(point)
                .and_then(|hit| self.face_labels.get(hit.triangle).copied())
                .unwrap_or(NO_LABEL)
        });
        labels
    }
}

/// The three volumes of one grid, all row-major over `grid`.
#[derive(Debug, Clone)]
pub struct FieldVolumes {
    /// Grid the volumes are sampled on.
    pub grid: GridSpec,
    /// Signed distance per voxel.
    pub sdf: Vec<f32>,
    /// Unit SDF gradient per voxel (zero where flat).
    pub normals: Vec<[f32; 3]>,
    /// Material id per voxel.
    pub labels: Vec<i16>,
}

impl FieldVolumes {
    /// Check that every volume holds exactly one entry per voxel.
    pub fn check_lengths(&self) -> Result<()> {
        let expected = self.grid.total_voxels();
        for (name, len) in [
            ("sdf", self.sdf.len()),
            ("normals", self.normals.len()),
            ("labels", self.labels.len()),
        ] {
            if len != expected {
                return Err(AvoxError::consistency(format!(
                    "{} volume has {} entries, grid has {} voxels",
                    name, len, expected
                )));
            }
        }
        Ok(())
    }
}

/// Evaluate SDF, normals and labels for `grid`.
///
/// Normals are estimated only once the full SDF volume exists.
pub fn compute_fields(
    strategy: &QueryStrategy<'_>,
    face_labels: &[i16],
    grid: GridSpec,
    chunk_size: usize,
) -> Result<FieldVolumes> {
    let kind: StrategyKind = strategy.kind();
    info!(
        "evaluating {} voxels (dims {:?}, pitch {}) with the {} strategy",
        grid.total_voxels(),
        grid.dims,
        grid.pitch,
        kind
    );

    let sdf = DistanceFieldEvaluator::new(strategy, chunk_size)?.evaluate(&grid);
    info!("signed distance volume done");

    let normals = estimate_normals(&sdf, &grid)?;
    info!("normal volume done");

    let labels = LabelFieldAssigner::new(strategy, face_labels, chunk_size)?.assign(&grid);
    info!("label volume done");

    Ok(FieldVolumes {
        grid,
        sdf,
        normals,
        labels,
    })
}
