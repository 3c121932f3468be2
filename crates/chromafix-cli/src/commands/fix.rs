use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use chromafix_core::config::{CorrectionConfig, CorrectionParams, EngineConfig};
use chromafix_core::engine::CorrectionEngine;
use chromafix_core::io::{load_raster, save_raster};
use tracing::info;

use super::shift_args::{parse_region, ShiftArgs};
use crate::progress::BarReporter;
use crate::summary::print_correction_summary;

#[derive(Args)]
pub struct FixArgs {
    /// Input image (PNG or TIFF, 8 or 16 bit)
    pub file: Option<PathBuf>,

    /// Job config file (TOML); shift options on the command line are
    /// ignored when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub shift: ShiftArgs,

    /// Only correct X,Y,W,H; the rest of the image is copied unchanged
    #[arg(long, value_delimiter = ',')]
    pub region: Option<Vec<usize>>,

    /// Processing tile size in pixels
    #[arg(long)]
    pub tile_size: Option<usize>,

    /// Process on a single thread
    #[arg(long)]
    pub no_parallel: bool,

    /// Output file path (.png for 8 bit, .tiff for 16 bit)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &FixArgs) -> Result<()> {
    let job = match args.config {
        Some(ref config_path) => {
            let contents = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config {}", config_path.display()))?;
            Some(toml::from_str::<CorrectionConfig>(&contents).context("Invalid job config")?)
        }
        None => None,
    };

    let input = match (&args.file, &job) {
        (Some(file), _) => file.clone(),
        (None, Some(job)) => job.input.clone(),
        (None, None) => bail!("an input image is required (positional or via --config)"),
    };
    let output = args
        .output
        .clone()
        .or_else(|| job.as_ref().map(|j| j.output.clone()))
        .unwrap_or_else(|| PathBuf::from("corrected.tiff"));

    let raster = load_raster(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let size = (raster.width(), raster.height());
    info!(input = %input.display(), width = size.0, height = size.1, "Loaded image");

    let params: CorrectionParams = match job {
        Some(ref job) => {
            job.params
                .validate(size.0, size.1)
                .context("Invalid shift parameters in config")?;
            job.params.clone()
        }
        None => args.shift.to_params(size.0, size.1)?,
    };

    let mut engine_config: EngineConfig = job.map(|j| j.engine).unwrap_or_default();
    if let Some(tile) = args.tile_size {
        engine_config.tile_size = tile;
    }
    if args.no_parallel {
        engine_config.parallel = false;
    }
    let region = args.region.as_deref().map(parse_region).transpose()?;

    print_correction_summary(&input, &output, size, &params, &engine_config, region);

    let engine = CorrectionEngine::new(engine_config).context("Invalid engine config")?;
    let reporter = BarReporter::new();
    let corrected = match region {
        Some(region) => engine.process_region_reported(&raster, region, &params, &reporter)?,
        None => engine.process_final_reported(&raster, &params, &reporter)?,
    };
    reporter.finish();

    save_raster(&corrected, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("\nOutput saved to {}", output.display());

    Ok(())
}
