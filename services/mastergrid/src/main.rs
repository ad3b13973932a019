//! Master grid builder.
//!
//! Reads the grid from a NAME file header, loads the zones of a shape list,
//! computes the covering factor of every zone over every cell and writes the
//! result as a JSON master grid.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use coverage::{load_zones, MasterGrid};
use name_common::Crs;
use name_parser::load_header;

#[derive(Parser, Debug)]
#[command(name = "makemastergrid")]
#[command(about = "Compute zone covering factors for every cell of a NAME grid")]
struct Args {
    /// NAME file whose header defines the grid
    #[arg(short = 'n', long = "namefile")]
    name_file: PathBuf,

    /// Shape list: one `shapefile,colour` per line
    #[arg(short = 's', long = "shapelist")]
    shape_list: PathBuf,

    /// Output master grid file
    #[arg(short = 'o', long = "outfile", default_value = "mastergrid.json")]
    outfile: PathBuf,

    /// CRS descriptor (default: .prj of the first shapefile, else EPSG:4326)
    #[arg(long)]
    crs: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let started = Instant::now();
    let header = load_header(&args.name_file)
        .with_context(|| format!("Failed to read NAME header from {}", args.name_file.display()))?;
    let grid = header
        .grid_spec()
        .with_context(|| format!("Invalid grid in {}", args.name_file.display()))?;
    info!(nx = grid.nx, ny = grid.ny, dx = grid.dx, dy = grid.dy, "Read grid definition");

    let zones = load_zones(&args.shape_list)
        .with_context(|| format!("Failed to load zones from {}", args.shape_list.display()))?;
    info!(zones = zones.len(), "Loaded zones");

    let crs = match args.crs {
        Some(descriptor) => Crs::new(descriptor),
        None => zones.iter().find_map(|z| z.crs.clone()).unwrap_or_default(),
    };
    info!(crs = %crs, "Using coordinate reference system");

    let master = MasterGrid::build(&grid, &zones, crs)?;
    master
        .save(&args.outfile)
        .with_context(|| format!("Failed to write master grid to {}", args.outfile.display()))?;

    info!(
        path = %args.outfile.display(),
        cells = master.cells.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Wrote master grid"
    );
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    // RUST_LOG wins over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
