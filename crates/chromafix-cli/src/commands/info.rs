use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use chromafix_core::cache::margin_for;
use chromafix_core::frame::SourceRaster;
use chromafix_core::io::load_raster;
use chromafix_core::resample::Interpolation;
use chromafix_core::shift::ShiftModel;

use super::shift_args::ShiftArgs;
use crate::summary::{print_title, Styles};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image
    pub file: PathBuf,

    #[command(flatten)]
    pub shift: ShiftArgs,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let raster = load_raster(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let (width, height) = raster.dimensions();
    let params = args.shift.to_params(width, height)?;
    let model = ShiftModel::new(&params.shift, width, height);
    let s = Styles::new();

    print_title(&s, "Image");
    println!("  {:<14}{}", s.label.apply_to("File"), s.path.apply_to(args.file.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Dimensions"),
        s.value.apply_to(format!("{width}x{height}"))
    );
    println!("  {:<14}{}", s.label.apply_to("Bit depth"), s.value.apply_to(raster.bit_depth()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Alpha"),
        s.value.apply_to(if raster.has_alpha() { "yes" } else { "no" })
    );

    print_title(&s, "Shift");
    println!("  {:<14}{}", s.label.apply_to("Mode"), s.method.apply_to(params.shift.mode));
    if model.is_identity() {
        println!("  {:<14}{}", s.label.apply_to("Displacement"), s.disabled.apply_to("none"));
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Displacement"),
            s.value.apply_to(format!("{:.3} px max", model.max_displacement()))
        );
    }
    for interpolation in [Interpolation::Nearest, Interpolation::Linear, Interpolation::Cubic] {
        let label = format!("Margin ({interpolation})");
        println!(
            "  {:<24}{}",
            s.label.apply_to(label),
            s.value.apply_to(format!("{} px", margin_for(&model, interpolation)))
        );
    }
    println!();

    Ok(())
}
