//! Dense voxel grid geometry.
//!
//! A [`GridSpec`] places voxel `(i, j, k)` at `origin + (i, j, k) * pitch`.
//! Volumes over the grid are flat, row-major arrays with the last axis
//! varying fastest, so voxel `(i, j, k)` lives at `(i * ny + j) * nz + k`.

use crate::error::{CoreError, Result};
use crate::types::Point3;

/// Origin, pitch and dimensions of a dense voxel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Position of voxel `(0, 0, 0)`.
    pub origin: Point3,
    /// Edge length of one voxel.
    pub pitch: f64,
    /// Voxel count per axis, each at least 1.
    pub dims: [usize; 3],
}

impl GridSpec {
    /// Create a grid from explicit geometry.
    ///
    /// # Errors
    /// `InvalidPitch` if `pitch` is not a positive finite number, and
    /// `GridTooLarge` if any axis is empty or the voxel count overflows.
    pub fn new(origin: Point3, pitch: f64, dims: [usize; 3]) -> Result<Self> {
        check_pitch(pitch)?;
        if !origin.is_finite() {
            return Err(CoreError::NonFiniteBounds);
        }
        let wide = dims.map(|d| d as u64);
        if dims.iter().any(|&d| d == 0) || checked_volume(wide).is_none() {
            return Err(CoreError::GridTooLarge { dims: wide });
        }
        Ok(Self {
            origin,
            pitch,
            dims,
        })
    }

    /// Derive a grid that encloses `[min, max]` grown by `pad` voxels per side.
    ///
    /// The voxel range spans `[min - pad*pitch, max + pad*pitch]` inclusive:
    /// the highest-index voxel sits at or beyond the padded maximum. Axes with
    /// zero extent still get one voxel. Negative `pad` is treated as zero.
    pub fn from_bounds(min: Point3, max: Point3, pitch: f64, pad: i64) -> Result<Self> {
        check_pitch(pitch)?;
        if !min.is_finite() || !max.is_finite() {
            return Err(CoreError::NonFiniteBounds);
        }

        let margin = pad.max(0) as f64 * pitch;
        let origin = min - Point3::splat(margin);
        let max_corner = max + Point3::splat(margin);

        let mut wide = [1u64; 3];
        for (axis, slot) in wide.iter_mut().enumerate() {
            let steps = libm::ceil((max_corner[axis] - origin[axis]) / pitch);
            if !steps.is_finite() || steps >= u32::MAX as f64 {
                return Err(CoreError::GridTooLarge {
                    dims: [u64::MAX; 3],
                });
            }
            *slot = if steps < 0.0 { 1 } else { steps as u64 + 1 };
        }

        if checked_volume(wide).is_none() {
            return Err(CoreError::GridTooLarge { dims: wide });
        }

        Ok(Self {
            origin,
            pitch,
            dims: wide.map(|d| d as usize),
        })
    }

    /// Total number of voxels.
    #[inline]
    pub fn total_voxels(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Flat row-major index of voxel `(i, j, k)`.
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims[1] + j) * self.dims[2] + k
    }

    /// Inverse of [`flat_index`](Self::flat_index).
    #[inline]
    pub fn unravel(&self, flat: usize) -> [usize; 3] {
        let k = flat % self.dims[2];
        let rest = flat / self.dims[2];
        [rest / self.dims[1], rest % self.dims[1], k]
    }

    /// World position of voxel `(i, j, k)`.
    #[inline]
    pub fn voxel_position(&self, i: usize, j: usize, k: usize) -> Point3 {
        self.origin + Point3::new(i as f64, j as f64, k as f64) * self.pitch
    }

    /// World position of the voxel at a flat index.
    #[inline]
    pub fn point_at(&self, flat: usize) -> Point3 {
        let [i, j, k] = self.unravel(flat);
        self.voxel_position(i, j, k)
    }

    /// World position of the highest-index voxel.
    #[inline]
    pub fn max_corner(&self) -> Point3 {
        self.voxel_position(self.dims[0] - 1, self.dims[1] - 1, self.dims[2] - 1)
    }

    /// Check that a flat volume has one entry per voxel.
    pub fn check_volume_len(&self, len: usize) -> Result<()> {
        let expected = self.total_voxels();
        if len != expected {
            return Err(CoreError::VolumeSizeMismatch { expected, got: len });
        }
        Ok(())
    }
}

fn check_pitch(pitch: f64) -> Result<()> {
    if pitch.is_finite() && pitch > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidPitch { pitch })
    }
}

fn checked_volume(dims: [u64; 3]) -> Option<usize> {
    let total = dims[0].checked_mul(dims[1])?.checked_mul(dims[2])?;
    usize::try_from(total).ok()
}
