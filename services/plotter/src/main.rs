//! Plot NAME concentration files on a map.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use plotter::{Args, PlotConfig, PlotOptions};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; RUST_LOG wins over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => PlotConfig::load(path)?,
        None => PlotConfig::default(),
    };
    let options = PlotOptions::resolve(&args, config)?;
    info!(input = ?options.input, selector = ?options.selector, "Starting plotter");

    plotter::run(&options)?;
    Ok(())
}
