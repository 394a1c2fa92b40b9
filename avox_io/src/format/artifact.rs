//! Raw voxel artifacts: three little-endian volumes plus a JSON sidecar.
//!
//! # Layout
//!
//! ```text
//! <stem>.sdf.bin      f32 LE per voxel
//! <stem>.normals.bin  3 x f32 LE per voxel (x, y, z)
//! <stem>.labels.bin   i16 LE per voxel
//! <stem>.sdf.json     sidecar: origin, dims, voxel_pitch, labels, files, layout
//! ```
//!
//! Voxels are flattened row-major with the last axis fastest, so voxel
//! `(i, j, k)` is element `(i * ny + j) * nz + k` of each volume. File names in
//! the sidecar are relative to the sidecar's directory.
//!
//! Every file is written to a temporary sibling and renamed into place. The
//! sidecar goes last, so an interrupted run never leaves a sidecar that
//! points at missing or partial volumes.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use avox_core::{GridSpec, Point3};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{AvoxError, Result};
use crate::fields::FieldVolumes;

/// Bytes per SDF element.
pub const SDF_ELEMENT_SIZE: usize = 4;
/// Bytes per normal element (three f32).
pub const NORMAL_ELEMENT_SIZE: usize = 12;
/// Bytes per label element.
pub const LABEL_ELEMENT_SIZE: usize = 2;

/// Binary file names recorded in the sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFiles {
    /// SDF volume file name.
    pub sdf: String,
    /// Normal volume file name.
    pub normals: String,
    /// Label volume file name.
    pub labels: String,
}

/// Element encodings of the binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLayout {
    /// Always `"little"`.
    pub byte_order: String,
    /// SDF element type.
    pub sdf: String,
    /// Normal element type.
    pub normals: String,
    /// Label element type.
    pub labels: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            byte_order: "little".to_string(),
            sdf: "f32".to_string(),
            normals: "f32x3".to_string(),
            labels: "i16".to_string(),
        }
    }
}

/// Contents of the JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Position of voxel `(0, 0, 0)`.
    pub origin: [f64; 3],
    /// Voxel count per axis.
    pub dims: [usize; 3],
    /// Voxel edge length.
    pub voxel_pitch: f64,
    /// Material names; a label value indexes this list.
    pub labels: Vec<String>,
    /// Binary file names.
    pub files: ArtifactFiles,
    /// Binary encodings. Sidecars without this block use the defaults.
    #[serde(default)]
    pub layout: ArtifactLayout,
}

impl ArtifactMetadata {
    /// Grid described by this sidecar.
    pub fn grid(&self) -> Result<GridSpec> {
        Ok(GridSpec::new(
            Point3::from(self.origin),
            self.voxel_pitch,
            self.dims,
        )?)
    }
}

/// Destination paths of one artifact set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// SDF volume.
    pub sdf: PathBuf,
    /// Normal volume.
    pub normals: PathBuf,
    /// Label volume.
    pub labels: PathBuf,
    /// JSON sidecar.
    pub sidecar: PathBuf,
}

impl ArtifactPaths {
    /// Paths for `<dir>/<stem>.*`.
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            sdf: dir.join(format!("{}.sdf.bin", stem)),
            normals: dir.join(format!("{}.normals.bin", stem)),
            labels: dir.join(format!("{}.labels.bin", stem)),
            sidecar: dir.join(format!("{}.sdf.json", stem)),
        }
    }

    /// Paths next to `mesh`, named after its file stem.
    pub fn beside(mesh: &Path) -> Result<Self> {
        let stem = mesh.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
            AvoxError::config(format!("mesh path {} has no usable file name", mesh.display()))
        })?;
        let dir = mesh.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::new(dir, stem))
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn files(&self) -> ArtifactFiles {
        ArtifactFiles {
            sdf: Self::file_name(&self.sdf),
            normals: Self::file_name(&self.normals),
            labels: Self::file_name(&self.labels),
        }
    }
}

/// Write `contents` to `path` via a temporary sibling and a rename.
pub(crate) fn write_atomic<F>(path: &Path, contents: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> std::io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let result = (|| {
        let mut writer = BufWriter::new(fs::File::create(&tmp)?);
        contents(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    Ok(result?)
}

/// Remove `path` if it exists.
fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

fn write_sdf<W: Write>(sdf: &[f32], writer: &mut W) -> std::io::Result<()> {
    for value in sdf {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn write_normals<W: Write>(normals: &[[f32; 3]], writer: &mut W) -> std::io::Result<()> {
    for normal in normals {
        for component in normal {
            writer.write_all(&component.to_le_bytes())?;
        }
    }
    Ok(())
}

fn write_labels<W: Write>(labels: &[i16], writer: &mut W) -> std::io::Result<()> {
    for value in labels {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Write the three volumes and the sidecar.
///
/// # Errors
/// `Consistency` if any volume does not match the grid; nothing is written
/// in that case. Any existing sidecar is removed before the binaries are
/// replaced, so a failure part way through leaves no sidecar behind.
pub fn write_artifacts(
    fields: &FieldVolumes,
    material_names: &[String],
    paths: &ArtifactPaths,
) -> Result<ArtifactMetadata> {
    fields.check_lengths()?;

    // A sidecar left from an earlier run must not describe a half-replaced set
    remove_stale(&paths.sidecar)?;

    write_atomic(&paths.sdf, |w| write_sdf(&fields.sdf, w))?;
    write_atomic(&paths.normals, |w| write_normals(&fields.normals, w))?;
    write_atomic(&paths.labels, |w| write_labels(&fields.labels, w))?;

    let metadata = ArtifactMetadata {
        origin: fields.grid.origin.as_array(),
        dims: fields.grid.dims,
        voxel_pitch: fields.grid.pitch,
        labels: material_names.to_vec(),
        files: paths.files(),
        layout: ArtifactLayout::default(),
    };
    write_atomic(&paths.sidecar, |w| {
        serde_json::to_writer_pretty(&mut *w, &metadata)?;
        w.write_all(b"\n")
    })?;

    info!("wrote SDF sidecar => {}", paths.sidecar.display());
    Ok(metadata)
}

/// An artifact set read back from disk.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    /// Parsed sidecar.
    pub metadata: ArtifactMetadata,
    /// Volumes on the sidecar's grid.
    pub fields: FieldVolumes,
}

fn read_volume(path: &Path, voxels: usize, element_size: usize) -> Result<Vec<u8>> {
    let bytes = fs::read(path)
        .map_err(|e| AvoxError::load(format!("cannot read {}: {}", path.display(), e)))?;
    let expected = voxels * element_size;
    if bytes.len() != expected {
        return Err(AvoxError::load(format!(
            "{} holds {} bytes, expected {} ({} voxels x {} bytes)",
            path.display(),
            bytes.len(),
            expected,
            voxels,
            element_size
        )));
    }
    Ok(bytes)
}

fn f32_at(chunk: &[u8]) -> f32 {
    f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
}

/// Read an artifact set from its sidecar.
///
/// # Errors
/// `Load` if the sidecar is malformed or a binary's size does not equal
/// `product(dims) * element_size`.
pub fn read_artifacts<P: AsRef<Path>>(sidecar: P) -> Result<LoadedArtifacts> {
    let sidecar = sidecar.as_ref();
    let text = fs::read_to_string(sidecar)
        .map_err(|e| AvoxError::load(format!("cannot read {}: {}", sidecar.display(), e)))?;
    let metadata: ArtifactMetadata = serde_json::from_str(&text)
        .map_err(|e| AvoxError::load(format!("invalid sidecar {}: {}", sidecar.display(), e)))?;
    let grid = metadata
        .grid()
        .map_err(|e| AvoxError::load(format!("invalid grid in {}: {}", sidecar.display(), e)))?;

    let dir = sidecar.parent().unwrap_or_else(|| Path::new(""));
    let voxels = grid.total_voxels();

    let sdf = read_volume(&dir.join(&metadata.files.sdf), voxels, SDF_ELEMENT_SIZE)?
        .chunks_exact(SDF_ELEMENT_SIZE)
        .map(f32_at)
        .collect();
    let normals = read_volume(&dir.join(&metadata.files.normals), voxels, NORMAL_ELEMENT_SIZE)?
        .chunks_exact(NORMAL_ELEMENT_SIZE)
        .map(|c| [f32_at(&c[0..4]), f32_at(&c[4..8]), f32_at(&c[8..12])])
        .collect();
    let labels = read_volume(&dir.join(&metadata.files.labels), voxels, LABEL_ELEMENT_SIZE)?
        .chunks_exact(LABEL_ELEMENT_SIZE)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect();

    Ok(LoadedArtifacts {
        metadata,
        fields: FieldVolumes {
            grid,
            sdf,
            normals,
            labels,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_fields() -> FieldVolumes {
        let grid = GridSpec::new(Point3::new(-0.25, 0.5, 1.0), 0.125, [2, 3, 1]).unwrap();
        FieldVolumes {
            grid,
            sdf: vec![-1.5, 0.0, 0.25, 2.0, f32::MAX, -0.125],
            normals: vec![
                [1.0, 0.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, 0.0],
                [0.6, 0.8, 0.0],
                [0.0, 0.0, 1.0],
                [-1.0, 0.0, 0.0],
            ],
            labels: vec![0, 1, -1, 2, 0, 1],
        }
    }

    fn names() -> Vec<String> {
        ["default", "brick", "glass"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_paths_beside_mesh() {
        let paths = ArtifactPaths::beside(Path::new("/data/rooms/hall.obj")).unwrap();
        assert_eq!(paths.sdf, Path::new("/data/rooms/hall.sdf.bin"));
        assert_eq!(paths.normals, Path::new("/data/rooms/hall.normals.bin"));
        assert_eq!(paths.labels, Path::new("/data/rooms/hall.labels.bin"));
        assert_eq!(paths.sidecar, Path::new("/data/rooms/hall.sdf.json"));
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(&dir.path().join("nested"), "room");
        let fields = small_fields();

        let written = write_artifacts(&fields, &names(), &paths).unwrap();
        assert_eq!(written.files.sdf, "room.sdf.bin");
        assert_eq!(fs::metadata(&paths.sdf).unwrap().len(), 6 * 4);
        assert_eq!(fs::metadata(&paths.normals).unwrap().len(), 6 * 12);
        assert_eq!(fs::metadata(&paths.labels).unwrap().len(), 6 * 2);

        let loaded = read_artifacts(&paths.sidecar).unwrap();
        assert_eq!(loaded.metadata, written);
        assert_eq!(loaded.fields.grid, fields.grid);
        assert_eq!(loaded.fields.sdf, fields.sdf);
        assert_eq!(loaded.fields.normals, fields.normals);
        assert_eq!(loaded.fields.labels, fields.labels);
    }

    #[test]
    fn test_binaries_are_little_endian() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "le");
        write_artifacts(&small_fields(), &names(), &paths).unwrap();

        let sdf = fs::read(&paths.sdf).unwrap();
        assert_eq!(&sdf[0..4], &(-1.5f32).to_le_bytes());
        let labels = fs::read(&paths.labels).unwrap();
        assert_eq!(&labels[4..6], &[0xff, 0xff]);
    }

    #[test]
    fn test_sidecar_keys() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "keys");
        write_artifacts(&small_fields(), &names(), &paths).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.sidecar).unwrap()).unwrap();
        assert_eq!(json["dims"], serde_json::json!([2, 3, 1]));
        assert_eq!(json["voxel_pitch"], serde_json::json!(0.125));
        assert_eq!(json["labels"], serde_json::json!(["default", "brick", "glass"]));
        assert_eq!(json["files"]["labels"], "keys.labels.bin");
        assert_eq!(json["layout"]["byte_order"], "little");
    }

    #[test]
    fn test_length_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "bad");
        let mut fields = small_fields();
        fields.labels.pop();

        let err = write_artifacts(&fields, &names(), &paths).unwrap_err();
        assert!(matches!(err, AvoxError::Consistency { .. }));
        assert!(!paths.sdf.exists());
        assert!(!paths.sidecar.exists());
    }

    #[test]
    fn test_failed_rewrite_drops_old_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "again");
        write_artifacts(&small_fields(), &names(), &paths).unwrap();
        assert!(read_artifacts(&paths.sidecar).is_ok());

        // Block the labels write after sdf and normals were replaced
        fs::create_dir(dir.path().join("again.labels.bin.tmp")).unwrap();
        let mut fields = small_fields();
        fields.sdf.iter_mut().for_each(|d| *d = -*d);

        let err = write_artifacts(&fields, &names(), &paths).unwrap_err();
        assert!(matches!(err, AvoxError::Io(_)));
        assert!(!paths.sidecar.exists());
        assert!(read_artifacts(&paths.sidecar).is_err());
    }

    #[test]
    fn test_truncated_binary_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "cut");
        write_artifacts(&small_fields(), &names(), &paths).unwrap();

        let normals = fs::read(&paths.normals).unwrap();
        fs::write(&paths.normals, &normals[..normals.len() - 1]).unwrap();
        assert!(matches!(
            read_artifacts(&paths.sidecar),
            Err(AvoxError::Load { .. })
        ));
    }

    #[test]
    fn test_sidecar_without_layout_block() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "old");
        write_artifacts(&small_fields(), &names(), &paths).unwrap();

        let mut json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.sidecar).unwrap()).unwrap();
        json.as_object_mut().unwrap().remove("layout");
        fs::write(&paths.sidecar, json.to_string()).unwrap();

        let loaded = read_artifacts(&paths.sidecar).unwrap();
        assert_eq!(loaded.metadata.layout, ArtifactLayout::default());
    }
}
