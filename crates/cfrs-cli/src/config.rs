//! Command-line configuration: artifact locations and logging.

use std::path::PathBuf;

use cfrs_ai::ArtifactPaths;
use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Where to find the four artifacts.
///
/// Each artifact defaults to its standard file name inside `--model-dir`;
/// the per-artifact flags override individual files.
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Directory holding crop.onnx, crop_scaler.json, fertilizer.onnx, fertilizer_scaler.json
    #[arg(long, env = "CFRS_MODEL_DIR", default_value = "models", global = true)]
    pub model_dir: PathBuf,

    /// Crop classifier (.onnx or .json)
    #[arg(long, env = "CFRS_CROP_MODEL", global = true)]
    pub crop_model: Option<PathBuf>,

    /// Crop feature scaler (.json)
    #[arg(long, env = "CFRS_CROP_SCALER", global = true)]
    pub crop_scaler: Option<PathBuf>,

    /// Fertilizer classifier (.onnx or .json)
    #[arg(long, env = "CFRS_FERTILIZER_MODEL", global = true)]
    pub fertilizer_model: Option<PathBuf>,

    /// Fertilizer feature scaler (.json)
    #[arg(long, env = "CFRS_FERTILIZER_SCALER", global = true)]
    pub fertilizer_scaler: Option<PathBuf>,
}

impl ArtifactArgs {
    pub fn resolve(&self) -> ArtifactPaths {
        let mut paths = ArtifactPaths::in_dir(&self.model_dir);
        if let Some(p) = &self.crop_model {
            paths.crop_model = p.clone();
        }
        if let Some(p) = &self.crop_scaler {
            paths.crop_scaler = p.clone();
        }
        if let Some(p) = &self.fertilizer_model {
            paths.fertilizer_model = p.clone();
        }
        if let Some(p) = &self.fertilizer_scaler {
            paths.fertilizer_scaler = p.clone();
        }
        paths
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for results. `RUST_LOG` takes precedence over `--verbose`.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logger: {e}"))
}
