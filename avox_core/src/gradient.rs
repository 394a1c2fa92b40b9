//! Finite-difference gradients and unit normals over a dense scalar volume.
//!
//! Interior voxels use central differences; boundary voxels use the
//! second-order one-sided stencils, so the estimate is second-order accurate
//! everywhere an axis has at least three samples. Differences are divided by
//! the physical pitch, so gradients of a true distance field have unit length.
//!
//! The whole volume must be available: a voxel's gradient reads its neighbours
//! along every axis, which can fall in a different evaluation chunk.

use alloc::vec::Vec;

use crate::error::Result;
use crate::grid::GridSpec;
use crate::types::{Point3, GRADIENT_EPSILON};

/// Derivative along one axis at position `coord` of an axis with `n` samples.
///
/// `at(offset)` returns the sample `offset` steps away along the axis.
#[inline]
fn axis_derivative<F>(coord: usize, n: usize, h: f64, at: F) -> f64
where
    F: Fn(isize) -> f64,
{
    match n {
        0 | 1 => 0.0,
        2 => {
            if coord == 0 {
                (at(1) - at(0)) / h
            } else {
                (at(0) - at(-1)) / h
            }
        }
        _ if coord == 0 => (-3.0 * at(0) + 4.0 * at(1) - at(2)) / (2.0 * h),
        _ if coord == n - 1 => (3.0 * at(0) - 4.0 * at(-1) + at(-2)) / (2.0 * h),
        _ => (at(1) - at(-1)) / (2.0 * h),
    }
}

/// Gradient of `volume` at voxel `(i, j, k)`.
///
/// `volume` must hold `grid.total_voxels()` values in row-major order.
pub fn gradient_at(volume: &[f32], grid: &GridSpec, i: usize, j: usize, k: usize) -> Point3 {
    let [nx, ny, nz] = grid.dims;
    let strides = [ny * nz, nz, 1];
    let flat = grid.flat_index(i, j, k);
    let h = grid.pitch;

    let sample = |stride: usize| {
        move |offset: isize| {
            let idx = flat as isize + offset * stride as isize;
            volume[idx as usize] as f64
        }
    };

    Point3::new(
        axis_derivative(i, nx, h, sample(strides[0])),
        axis_derivative(j, ny, h, sample(strides[1])),
        axis_derivative(k, nz, h, sample(strides[2])),
    )
}

/// Normalize a gradient, keeping the zero vector for negligible magnitudes.
#[inline]
pub fn unit_normal(gradient: Point3) -> [f32; 3] {
    let len = gradient.length();
    if !len.is_finite() || len <= GRADIENT_EPSILON {
        return [0.0; 3];
    }
    (gradient / len).to_f32_array()
}

/// Estimate one unit normal per voxel from a completed scalar volume.
///
/// # Errors
/// `VolumeSizeMismatch` if `volume` does not cover the grid exactly.
pub fn estimate_normals(volume: &[f32], grid: &GridSpec) -> Result<Vec<[f32; 3]>> {
    grid.check_volume_len(volume.len())?;

    let [nx, ny, nz] = grid.dims;
    let mut normals = Vec::with_capacity(volume.len());
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                normals.push(unit_normal(gradient_at(volume, grid, i, j, k)));
            }
        }
    }
    Ok(normals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use alloc::vec;

    fn sample_volume<F: Fn(Point3) -> f64>(grid: &GridSpec, f: F) -> Vec<f32> {
        (0..grid.total_voxels())
            .map(|flat| f(grid.point_at(flat)) as f32)
            .collect()
    }

    #[test]
    fn test_linear_field_gradient_is_exact() {
        let grid = GridSpec::new(Point3::new(-1.0, 0.0, 2.0), 0.5, [4, 5, 6]).unwrap();
        let volume = sample_volume(&grid, |p| 2.0 * p.x - 3.0 * p.y + 0.5 * p.z);

        for (i, j, k) in [(0, 0, 0), (3, 4, 5), (1, 2, 3), (0, 4, 2)] {
            let g = gradient_at(&volume, &grid, i, j, k);
            assert!((g.x - 2.0).abs() < 1e-4, "gx at {:?}: {}", (i, j, k), g.x);
            assert!((g.y + 3.0).abs() < 1e-4, "gy at {:?}: {}", (i, j, k), g.y);
            assert!((g.z - 0.5).abs() < 1e-4, "gz at {:?}: {}", (i, j, k), g.z);
        }
    }

    #[test]
    fn test_quadratic_boundary_is_second_order() {
        // f = x^2 on a 1D-ish grid: second-order stencils are exact for quadratics.
        let grid = GridSpec::new(Point3::splat(0.0), 0.25, [5, 1, 1]).unwrap();
        let volume = sample_volume(&grid, |p| p.x * p.x);

        for i in 0..5 {
            let g = gradient_at(&volume, &grid, i, 0, 0);
            let expected = 2.0 * (i as f64 * 0.25);
            assert!((g.x - expected).abs() < 1e-5, "i={} g={} expected={}", i, g.x, expected);
            assert_eq!(g.y, 0.0);
            assert_eq!(g.z, 0.0);
        }
    }

    #[test]
    fn test_two_sample_axis_uses_first_difference() {
        let grid = GridSpec::new(Point3::splat(0.0), 0.5, [1, 1, 2]).unwrap();
        let volume = vec![1.0f32, 2.0];
        assert_eq!(gradient_at(&volume, &grid, 0, 0, 0).z, 2.0);
        assert_eq!(gradient_at(&volume, &grid, 0, 0, 1).z, 2.0);
    }

    #[test]
    fn test_normals_are_unit_or_zero() {
        let grid = GridSpec::new(Point3::splat(-1.0), 0.25, [9, 9, 9]).unwrap();
        let volume = sample_volume(&grid, |p| p.length() - 0.5);
        let normals = estimate_normals(&volume, &grid).unwrap();

        assert_eq!(normals.len(), grid.total_voxels());
        for n in &normals {
            let len = libm::sqrtf(n[0] * n[0] + n[1] * n[1] + n[2] * n[2]);
            assert!(len == 0.0 || (len - 1.0).abs() < 1e-5, "len = {}", len);
        }

        // Away from the centre the normal points radially outward.
        let n = normals[grid.flat_index(8, 4, 4)];
        assert!(n[0] > 0.99, "normal = {:?}", n);
    }

    #[test]
    fn test_constant_volume_yields_zero_normals() {
        let grid = GridSpec::new(Point3::splat(0.0), 0.1, [3, 3, 3]).unwrap();
        let volume = vec![0.7f32; 27];
        let normals = estimate_normals(&volume, &grid).unwrap();
        assert!(normals.iter().all(|n| *n == [0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_single_voxel_grid() {
        let grid = GridSpec::new(Point3::splat(0.0), 1.0, [1, 1, 1]).unwrap();
        let normals = estimate_normals(&[3.0], &grid).unwrap();
        assert_eq!(normals, vec![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_size_mismatch() {
        let grid = GridSpec::new(Point3::splat(0.0), 1.0, [2, 2, 2]).unwrap();
        let err = estimate_normals(&[0.0; 7], &grid).unwrap_err();
        assert_eq!(
            err,
            CoreError::VolumeSizeMismatch {
                expected: 8,
                got: 7
            }
        );
    }
}
