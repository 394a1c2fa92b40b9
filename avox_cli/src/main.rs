//! waveguide-precompute: bake SDF, normal and material-label volumes next to
//! an OBJ mesh, and optionally normalise a material (DIF) config.

use std::path::PathBuf;
use std::process::ExitCode;

use avox_io::config::{DEFAULT_CHUNK_SIZE, DEFAULT_VOXEL_PAD, DEFAULT_VOXEL_PITCH};
use avox_io::{PrecomputeConfig, PrecomputeJob, PrecomputeReport, StrategyPreference};
use clap::Parser;
use log::LevelFilter;

/// Precompute voxel metadata for the waveguide solver.
#[derive(Parser, Debug)]
#[command(name = "waveguide-precompute")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Precompute SDF, normal and material-label volumes for a mesh", long_about = None)]
struct Cli {
    /// Input OBJ mesh
    #[arg(long)]
    mesh: PathBuf,

    /// Voxel pitch in metres
    #[arg(long, default_value_t = DEFAULT_VOXEL_PITCH, allow_negative_numbers = true)]
    voxel_pitch: f64,

    /// Padding voxels around the mesh
    #[arg(long, default_value_t = DEFAULT_VOXEL_PAD, allow_negative_numbers = true)]
    voxel_pad: i64,

    /// Points per evaluation chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Optional .npz snapshot of all volumes
    #[arg(long)]
    sdf_out: Option<PathBuf>,

    /// Material JSON describing absorption per band
    #[arg(long)]
    dif_config: Option<PathBuf>,

    /// Output path for the normalised DIF JSON
    #[arg(long, requires = "dif_config")]
    dif_out: Option<PathBuf>,

    /// Use brute-force nearest-surface queries even when the BVH is available
    #[arg(long)]
    force_fallback: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    fn job(&self) -> PrecomputeJob {
        let strategy = if self.force_fallback {
            StrategyPreference::Fallback
        } else {
            StrategyPreference::Auto
        };
        let config = PrecomputeConfig::new(self.voxel_pitch, self.voxel_pad)
            .with_chunk_size(self.chunk_size)
            .with_strategy(strategy);

        let mut job = PrecomputeJob::new(&self.mesh).with_config(config);
        if let Some(path) = &self.sdf_out {
            job = job.with_snapshot(path);
        }
        if let Some(path) = &self.dif_config {
            job = job.with_dif(path, self.dif_out.clone());
        }
        job
    }
}

fn print_report(report: &PrecomputeReport) {
    let [nx, ny, nz] = report.grid.dims;
    if let Some(path) = &report.snapshot {
        println!("wrote snapshot => {}", path.display());
    }
    println!(
        "wrote SDF binaries => {}, {}, {}",
        report.artifacts.sdf.display(),
        report.artifacts.normals.display(),
        report.artifacts.labels.display()
    );
    println!(
        "wrote SDF metadata => {} (dims={}x{}x{}, labels={}, strategy={})",
        report.artifacts.sidecar.display(),
        nx,
        ny,
        nz,
        report.material_names.len(),
        report.strategy
    );
    if let Some((path, materials)) = &report.dif {
        println!("wrote DIF => {} (materials={})", path.display(), materials);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    match cli.job().run() {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("[waveguide-precompute] error: {}", err);
            ExitCode::FAILURE
        }
    }
}
