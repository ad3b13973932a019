//! Command-line arguments.

use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use name_common::{parse_day, BoundingBox, CommonError, IsoWeek, TimeSelector, YearMonth};

use crate::config::OverlaySpec;

#[derive(Parser, Debug, Clone)]
#[command(name = "plotter")]
#[command(about = "Plot NAME concentration files on a map")]
#[command(group(ArgGroup::new("input").args(["infile", "indir"])))]
#[command(group(
    ArgGroup::new("time").args(["timestamp", "day", "week", "month", "year", "sumall"])
))]
pub struct Args {
    /// YAML plot configuration; command-line values take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// NAME file; several files are handled like a directory of them
    #[arg(short, long, num_args = 1..)]
    pub infile: Vec<PathBuf>,

    /// Directory of NAME files
    #[arg(short = 'd', long)]
    pub indir: Option<PathBuf>,

    /// Plot one timestamp column of --infile (DD/MM/YYYY HH:mm)
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Sum files dated on this day (YYYYMMDD)
    #[arg(long, value_parser = parse_day)]
    pub day: Option<NaiveDate>,

    /// Sum files dated in this ISO week (YYYY-Www)
    #[arg(long, value_parser = IsoWeek::parse)]
    pub week: Option<IsoWeek>,

    /// Sum files dated in this month (YYYY-MM)
    #[arg(long, value_parser = YearMonth::parse)]
    pub month: Option<YearMonth>,

    /// Sum files dated in this year (YYYY)
    #[arg(long, value_parser = TimeSelector::parse_year)]
    pub year: Option<i32>,

    /// Sum every file in --indir
    #[arg(long)]
    pub sumall: bool,

    /// Output directory, created when missing
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Output file name (single-map runs only)
    #[arg(long)]
    pub outfile: Option<String>,

    /// Replace the whole caption
    #[arg(long)]
    pub caption: Option<String>,

    /// Replace the run name part of the caption
    #[arg(long)]
    pub runname: Option<String>,

    /// Colormap: rainbow, viridis or greys
    #[arg(long)]
    pub colormap: Option<String>,

    /// Fixed concentration scale MIN,MAX
    #[arg(long, value_parser = BoundingBox::parse_range, conflicts_with = "autoscale")]
    pub scale: Option<(f64, f64)>,

    /// Scale the colormap to the plotted values
    #[arg(long)]
    pub autoscale: bool,

    /// Paint every non-zero cell in one colour
    #[arg(long)]
    pub solid: bool,

    /// Colour for --solid (name or #rrggbb)
    #[arg(long)]
    pub color1: Option<String>,

    /// Shape list of zones to overlay
    #[arg(long)]
    pub shapelist: Option<PathBuf>,

    /// Draw zone boundary lines
    #[arg(long)]
    pub shapelines: bool,

    /// Fill zones in their shape-list colour
    #[arg(long)]
    pub shapecolors: bool,

    /// Longitude extent MIN,MAX
    #[arg(long, value_parser = BoundingBox::parse_range, allow_hyphen_values = true)]
    pub lon_bounds: Option<(f64, f64)>,

    /// Latitude extent MIN,MAX
    #[arg(long, value_parser = BoundingBox::parse_range, allow_hyphen_values = true)]
    pub lat_bounds: Option<(f64, f64)>,

    /// Longitude gridlines, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub lon_axis: Option<Vec<f64>>,

    /// Latitude gridlines, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub lat_axis: Option<Vec<f64>>,

    /// Extra dataset PATH,COLOUR drawn in a solid colour over the map;
    /// PATH is a NAME file or directory (repeatable)
    #[arg(long = "overlay", value_parser = parse_overlay)]
    pub overlays: Vec<OverlaySpec>,

    /// Station marker LON,LAT (repeatable)
    #[arg(long = "station", value_parser = parse_point, allow_hyphen_values = true)]
    pub stations: Vec<(f64, f64)>,

    /// Map resolution
    #[arg(long)]
    pub pixels_per_degree: Option<f64>,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Time selector given on the command line, if any.
    pub fn selector(&self) -> Option<TimeSelector> {
        if let Some(t) = &self.timestamp {
            Some(TimeSelector::Timestamp(t.clone()))
        } else if let Some(day) = self.day {
            Some(TimeSelector::Day(day))
        } else if let Some(week) = self.week {
            Some(TimeSelector::Week(week))
        } else if let Some(month) = self.month {
            Some(TimeSelector::Month(month))
        } else if let Some(year) = self.year {
            Some(TimeSelector::Year(year))
        } else if self.sumall {
            Some(TimeSelector::All)
        } else {
            None
        }
    }
}

/// Parse a `lon,lat` pair.
pub fn parse_point(s: &str) -> Result<(f64, f64), CommonError> {
    BoundingBox::parse_range(s)
}

/// Parse `PATH,COLOUR`; the colour follows the last comma.
pub fn parse_overlay(s: &str) -> Result<OverlaySpec, String> {
    match s.rsplit_once(',') {
        Some((path, colour)) if !path.trim().is_empty() && !colour.trim().is_empty() => Ok(OverlaySpec {
            path: PathBuf::from(path.trim()),
            colour: colour.trim().to_string(),
        }),
        _ => Err(format!("expected PATH,COLOUR, got '{s}'")),
    }
}
