mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chromafix",
    about = "Chromatic aberration correction for RGB images",
    long_about = "Chromatic aberration correction for RGB images.\n\n\
        Red and blue are resampled against the green channel. Lateral shifts \
        grow from zero at the center to the given amount at the border; a \
        positive amount moves the channel outward. Directional shifts are \
        constant over the frame; a positive amount moves the channel toward \
        +x (right) or +y (down)."
)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct an image and write the result
    Fix(commands::fix::FixArgs),
    /// Render a (decimated) viewport of the corrected image
    Preview(commands::preview::PreviewArgs),
    /// Print or save a default job configuration (TOML)
    Config(commands::config::ConfigArgs),
    /// Show image metadata and the margins implied by a set of shifts
    Info(commands::info::InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Fix(args) => commands::fix::run(args),
        Commands::Preview(args) => commands::preview::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
