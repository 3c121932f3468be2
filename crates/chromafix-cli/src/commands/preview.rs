use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use chromafix_core::config::{EngineConfig, PreviewConfig};
use chromafix_core::engine::{CorrectionEngine, Viewport};
use chromafix_core::geom::Rect;
use chromafix_core::io::{load_raster, save_raster};

use super::shift_args::{parse_region, ShiftArgs};

#[derive(Args)]
pub struct PreviewArgs {
    /// Input image
    pub file: PathBuf,

    #[command(flatten)]
    pub shift: ShiftArgs,

    /// Part of the image to show as X,Y,W,H (default: whole image)
    #[arg(long, value_delimiter = ',')]
    pub region: Option<Vec<usize>>,

    /// Show every Nth source pixel (1 = full resolution)
    #[arg(long, default_value = "1")]
    pub step: usize,

    /// Display saturation change in percent (-100..100); never affects
    /// `fix` output
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub saturation: f32,

    /// Output file path
    #[arg(short, long, default_value = "preview.png")]
    pub output: PathBuf,
}

pub fn run(args: &PreviewArgs) -> Result<()> {
    let raster = load_raster(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let params = args.shift.to_params(raster.width(), raster.height())?;

    let region = match args.region.as_deref() {
        Some(values) => parse_region(values)?,
        None => Rect::full(raster.width(), raster.height()),
    };
    let viewport = Viewport::new(region).with_step(args.step);
    let display = PreviewConfig {
        saturation: args.saturation,
    };

    let mut engine = CorrectionEngine::new(EngineConfig::default())?;
    let preview = engine
        .process_preview_display(&raster, &viewport, &params, &display)
        .context("Failed to render preview")?;

    save_raster(&preview, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Preview {}x{} (step {}) saved to {}",
        preview.width(),
        preview.height(),
        args.step,
        args.output.display()
    );

    Ok(())
}
