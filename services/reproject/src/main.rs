//! Shapefile reprojection tool.
//!
//! Writes `<stem>_EPSG<code>.shp` into the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use projection::{reproject_shapefile, Projection};

#[derive(Parser, Debug)]
#[command(name = "reproject")]
#[command(about = "Reproject a polygon shapefile to another EPSG code")]
struct Args {
    /// Shapefile to reproject
    shp: PathBuf,

    /// Target EPSG code (4326 or 3857)
    #[arg(short, long, default_value_t = 4326)]
    projection: u32,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let target = Projection::from_epsg(args.projection)?;
    let out = reproject_shapefile(&args.shp, target, &args.outdir)
        .with_context(|| format!("Failed to reproject {}", args.shp.display()))?;
    info!(output = %out.display(), "Done");
    Ok(())
}
