//! Compressed `.npz` snapshot of one artifact set, for inspection with numpy.
//!
//! Arrays: `origin` (f32, 3), `dims` (i32, 3), `voxel_pitch` (f32, 1),
//! `sdf` (f32, dims), `normals` (f32, dims x 3) and `labels` (i16, dims).

use std::io::{self, Seek, Write};
use std::path::Path;

use log::info;
use ndarray::{Array1, Array3, Array4};
use ndarray_npy::NpzWriter;

use super::artifact::write_atomic;
use crate::error::Result;
use crate::fields::FieldVolumes;

fn to_io<E>(err: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::other(err)
}

/// Write `fields` as an npz archive to any seekable writer.
pub fn write_snapshot_to<W: Write + Seek>(fields: &FieldVolumes, writer: W) -> io::Result<()> {
    let [nx, ny, nz] = fields.grid.dims;
    let mut npz = NpzWriter::new_compressed(writer);

    let origin = Array1::from_vec(fields.grid.origin.to_f32_array().to_vec());
    let dims = Array1::from_iter(fields.grid.dims.iter().map(|&d| d as i32));
    let pitch = Array1::from_vec(vec![fields.grid.pitch as f32]);
    let sdf = Array3::from_shape_vec((nx, ny, nz), fields.sdf.clone()).map_err(to_io)?;
    let normals = Array4::from_shape_vec(
        (nx, ny, nz, 3),
        fields.normals.iter().flatten().copied().collect(),
    )
    .map_err(to_io)?;
    let labels = Array3::from_shape_vec((nx, ny, nz), fields.labels.clone()).map_err(to_io)?;

    npz.add_array("origin", &origin).map_err(to_io)?;
    npz.add_array("dims", &dims).map_err(to_io)?;
    npz.add_array("voxel_pitch", &pitch).map_err(to_io)?;
    npz.add_array("sdf", &sdf).map_err(to_io)?;
    npz.add_array("normals", &normals).map_err(to_io)?;
    npz.add_array("labels", &labels).map_err(to_io)?;
    npz.finish().map_err(to_io)?;
    Ok(())
}

/// Write the snapshot to `path`, creating parent directories.
pub fn write_snapshot(fields: &FieldVolumes, path: &Path) -> Result<()> {
    fields.check_lengths()?;
    write_atomic(path, |w| write_snapshot_to(fields, w))?;
    info!("wrote snapshot => {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avox_core::{GridSpec, Point3};

    #[test]
    fn test_snapshot_arrays() {
        let grid = GridSpec::new(Point3::new(0.0, -1.0, 2.0), 0.5, [2, 2, 1]).unwrap();
        let fields = FieldVolumes {
            grid,
            sdf: vec![0.5, -0.5, 1.0, 0.0],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            labels: vec![0, 1, 1, -1],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug").join("room.npz");
        write_snapshot(&fields, &path).unwrap();

        let mut npz = ndarray_npy::NpzReader::new(std::fs::File::open(&path).unwrap()).unwrap();
        let mut names: Vec<String> = npz
            .names()
            .unwrap()
            .iter()
            .map(|n| n.trim_end_matches(".npy").to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            ["dims", "labels", "normals", "origin", "sdf", "voxel_pitch"]
        );

        let sdf: Array3<f32> = npz.by_name("sdf").unwrap();
        assert_eq!(sdf.shape(), &[2, 2, 1]);
        assert_eq!(sdf[[0, 1, 0]], -0.5);

        let normals: Array4<f32> = npz.by_name("normals").unwrap();
        assert_eq!(normals.shape(), &[2, 2, 1, 3]);

        let labels: Array3<i16> = npz.by_name("labels").unwrap();
        assert_eq!(labels[[1, 1, 0]], -1);

        let dims: Array1<i32> = npz.by_name("dims").unwrap();
        assert_eq!(dims.to_vec(), vec![2, 2, 1]);
    }
}
