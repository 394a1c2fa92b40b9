//! End-to-end precompute: mesh in, artifact set (and optional DIF) out.

use std::path::{Path, PathBuf};

use avox_core::GridSpec;
use log::info;

use crate::config::PrecomputeConfig;
use crate::convert::{parse_obj_file, scan_material_labels_file};
use crate::dif::MaterialConfig;
use crate::error::{AvoxError, Result};
use crate::fields::{compute_fields, FieldVolumes};
use crate::format::{write_artifacts, ArtifactPaths};
use crate::spatial::{QueryStrategy, StrategyKind};

/// One precompute run.
#[derive(Debug, Clone)]
pub struct PrecomputeJob {
    /// Input OBJ mesh; artifacts are written beside it.
    pub mesh_path: PathBuf,
    /// Grid and evaluation parameters.
    pub config: PrecomputeConfig,
    /// Optional `.npz` snapshot destination.
    pub snapshot_path: Option<PathBuf>,
    /// Optional material config to validate and normalise.
    pub dif_config: Option<PathBuf>,
    /// DIF destination; defaults to `<mesh stem>.dif.json` beside the mesh.
    pub dif_out: Option<PathBuf>,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct PrecomputeReport {
    /// Artifact set paths.
    pub artifacts: ArtifactPaths,
    /// Snapshot path, if one was written.
    pub snapshot: Option<PathBuf>,
    /// DIF path and material count, if a config was given.
    pub dif: Option<(PathBuf, usize)>,
    /// Grid the volumes were sampled on.
    pub grid: GridSpec,
    /// Strategy used for nearest-surface queries.
    pub strategy: StrategyKind,
    /// Material names in label order.
    pub material_names: Vec<String>,
}

impl PrecomputeJob {
    /// A job for `mesh_path` with default parameters.
    pub fn new<P: Into<PathBuf>>(mesh_path: P) -> Self {
        Self {
            mesh_path: mesh_path.into(),
            config: PrecomputeConfig::default(),
            snapshot_path: None,
            dif_config: None,
            dif_out: None,
        }
    }

    /// Set the grid and evaluation parameters.
    pub fn with_config(mut self, config: PrecomputeConfig) -> Self {
        self.config = config;
        self
    }

    /// Also write an `.npz` snapshot.
    pub fn with_snapshot<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Validate and emit a material config.
    pub fn with_dif<P: Into<PathBuf>>(mut self, config: P, out: Option<PathBuf>) -> Self {
        self.dif_config = Some(config.into());
        self.dif_out = out;
        self
    }

    fn default_dif_path(&self) -> PathBuf {
        self.mesh_path.with_extension("dif.json")
    }

    /// Run every stage in order; any failure aborts before the artifact set
    /// is written.
    pub fn run(&self) -> Result<PrecomputeReport> {
        self.config.validate()?;
        if cfg!(not(feature = "snapshot")) && self.snapshot_path.is_some() {
            return Err(AvoxError::config(
                "snapshot output requested but the `snapshot` feature is not compiled in",
            ));
        }

        // Validate the material config before spending time on fields
        let dif = self
            .dif_config
            .as_deref()
            .map(MaterialConfig::from_path)
            .transpose()?;

        let mesh = parse_obj_file(&self.mesh_path)?;
        let (min, max) = mesh.bounding_box().ok_or_else(|| {
            AvoxError::load(format!("mesh {} has no faces", self.mesh_path.display()))
        })?;
        info!(
            "loaded {} ({} vertices, {} triangles)",
            self.mesh_path.display(),
            mesh.vertices.len(),
            mesh.face_count()
        );

        let labels = scan_material_labels_file(&self.mesh_path)?;
        labels.check_face_count(mesh.face_count())?;
        info!("materials: {:?}", labels.names());

        let strategy = QueryStrategy::probe(&mesh, self.config.strategy);
        let grid = GridSpec::from_bounds(min, max, self.config.voxel_pitch, self.config.voxel_pad)?;
        let fields = compute_fields(&strategy, &labels.face_labels, grid, self.config.chunk_size)?;

        let artifacts = ArtifactPaths::beside(&self.mesh_path)?;
        write_artifacts(&fields, labels.names(), &artifacts)?;

        // Only snapshot a run whose artifact set landed
        let snapshot = self.write_snapshot(&fields)?;

        let dif = match dif {
            Some(config) => {
                let out = self.dif_out.clone().unwrap_or_else(|| self.default_dif_path());
                config.write_to(&out)?;
                Some((out, config.material_count()))
            }
            None => None,
        };

        Ok(PrecomputeReport {
            artifacts,
            snapshot,
            dif,
            grid,
            strategy: strategy.kind(),
            material_names: labels.names().to_vec(),
        })
    }

    #[cfg(feature = "snapshot")]
    fn write_snapshot(&self, fields: &FieldVolumes) -> Result<Option<PathBuf>> {
        match &self.snapshot_path {
            Some(path) => {
                crate::format::write_snapshot(fields, path)?;
                Ok(Some(path.clone()))
            }
            None => Ok(None),
        }
    }

    #[cfg(not(feature = "snapshot"))]
    fn write_snapshot(&self, _fields: &FieldVolumes) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Convenience wrapper: run with default parameters.
pub fn precompute<P: AsRef<Path>>(mesh_path: P) -> Result<PrecomputeReport> {
    PrecomputeJob::new(mesh_path.as_ref()).run()
}
