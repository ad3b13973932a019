//! Drawing maps for single files, timestamps and period sums.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use aggregation::{Fileset, Summation, SummedSet};
use coverage::{load_zones, Zone};
use name_common::{BoundingBox, GridSpec, TimeSelector};
use name_parser::{min_max, NameFile};
use renderer::{
    sum_caption, sum_filename, timestamp_caption, timestamp_filename, Color, MapCanvas,
};

use crate::config::{Input, Overlay, PlotOptions};

const SEA: Color = Color::rgb(0x44, 0x44, 0x44);
const GRIDLINE: Color = Color::rgb(255, 255, 255);
const MARKER: Color = Color::rgb(0, 0, 0);
const ZONE_LINE: Color = Color::new(0, 0, 0, 128);
const ZONE_FILL_OPACITY: f32 = 0.5;
const OVERLAY_OPACITY: f32 = 0.3;

/// Longest map side when no resolution is configured.
const DEFAULT_MAP_SIDE: f64 = 1600.0;

/// Cell values of one map together with its default caption and file name.
#[derive(Debug, Clone)]
pub struct MapField {
    pub grid: GridSpec,
    pub cells: Vec<(BoundingBox, f64)>,
    pub caption: String,
    pub filename: String,
    pub overlays: Vec<OverlayLayer>,
}

/// Cells where an extra dataset is positive, drawn in one colour.
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    /// Run name of the dataset
    pub label: String,
    pub colour: Color,
    pub cells: Vec<BoundingBox>,
}

impl MapField {
    /// One timestamp column of a NAME file.
    pub fn from_column(name: &NameFile, column: &str, runname: Option<&str>) -> Result<Self> {
        let values = name.data.column(column)?;
        let run = name.run_info();
        let cells = name
            .data
            .rows()
            .iter()
            .zip(values)
            .map(|(row, value)| (name.grid.cell_bbox(row.lon, row.lat), value))
            .collect();
        Ok(Self {
            grid: name.grid,
            cells,
            caption: timestamp_caption(&run, runname, column)?,
            filename: timestamp_filename(&name.stem(), &run, column)?,
            overlays: Vec::new(),
        })
    }

    /// Totals of a summed file set.
    pub fn from_sum(set: &SummedSet, runname: Option<&str>) -> Self {
        let cells = set
            .trimmed()
            .iter()
            .map(|row| (set.grid.cell_bbox(row.lon, row.lat), row.total))
            .collect();
        Self {
            grid: set.grid,
            cells,
            caption: sum_caption(&set.run, runname, &set.selector),
            filename: sum_filename(&set.run.run_name, &set.selector),
            overlays: Vec::new(),
        }
    }

    /// Smallest positive and largest value.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(self.cells.iter().map(|(_, v)| *v))
    }
}

/// An overlay dataset, scanned once per run.
struct OverlaySource {
    colour: Color,
    fileset: Fileset,
    /// A single file is used for every map; a directory is matched by date
    single: bool,
}

impl OverlaySource {
    fn open(overlay: &Overlay) -> Result<Self> {
        let single = !overlay.path.is_dir();
        let fileset = if single {
            Fileset::from_paths([&overlay.path])
        } else {
            Fileset::scan(&overlay.path)
        };
        let fileset =
            fileset.with_context(|| format!("Failed to open overlay {}", overlay.path.display()))?;
        Ok(Self {
            colour: overlay.colour,
            fileset,
            single,
        })
    }

    /// Overlay file for maps of a NAME file stamped `date`.
    fn load_for(&self, date: Option<NaiveDate>) -> Option<OverlayFile> {
        let path = if self.single {
            self.fileset.files().first().map(|f| f.path.clone())
        } else {
            date.and_then(|d| self.fileset.find_date(d)).map(Path::to_path_buf)
        };
        let Some(path) = path else {
            debug!(overlay = %self.fileset.dir().display(), date = ?date, "No overlay file for date");
            return None;
        };
        match NameFile::open(&path) {
            Ok(name) => Some(OverlayFile {
                colour: self.colour,
                name,
            }),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable overlay file");
                None
            }
        }
    }

    /// Positive cells of the overlay summed over `selector`.
    fn sum_layer(&self, selector: &TimeSelector) -> Option<OverlayLayer> {
        let set = match sum(Summation::from_fileset(self.fileset.clone()), selector) {
            Ok(set) => set,
            Err(e) => {
                warn!(overlay = %self.fileset.dir().display(), error = %e, "Skipping overlay");
                return None;
            }
        };
        let cells = set
            .trimmed()
            .iter()
            .filter(|row| row.total > 0.0)
            .map(|row| set.grid.cell_bbox(row.lon, row.lat))
            .collect();
        Some(OverlayLayer {
            label: set.run.run_name.clone(),
            colour: self.colour,
            cells,
        })
    }
}

struct OverlayFile {
    colour: Color,
    name: NameFile,
}

impl OverlayFile {
    /// Positive cells of `column`, if the file has it.
    fn layer(&self, column: &str) -> Option<OverlayLayer> {
        let values = match self.name.data.column(column) {
            Ok(values) => values,
            Err(_) => {
                debug!(file = %self.name.path.display(), column, "Overlay file lacks column");
                return None;
            }
        };
        let cells = self
            .name
            .data
            .rows()
            .iter()
            .zip(values)
            .filter(|(_, value)| *value > 0.0)
            .map(|(row, _)| self.name.grid.cell_bbox(row.lon, row.lat))
            .collect();
        Some(OverlayLayer {
            label: self.name.run_info().run_name,
            colour: self.colour,
            cells,
        })
    }
}

/// Run a plotting job; returns the images written.
pub fn run(opts: &PlotOptions) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&opts.outdir)
        .with_context(|| format!("Failed to create output directory {}", opts.outdir.display()))?;

    let zones = match &opts.shapes {
        Some(overlay) => load_zones(&overlay.shape_list).with_context(|| {
            format!("Failed to load zones from {}", overlay.shape_list.display())
        })?,
        None => Vec::new(),
    };
    let overlays = opts
        .overlays
        .iter()
        .map(OverlaySource::open)
        .collect::<Result<Vec<_>>>()?;

    let written = match (&opts.input, &opts.selector) {
        (Input::File(path), None) => {
            let name = open(path)?;
            plot_columns(opts, &zones, &overlays, &name, name.timestamps())?
        }
        (Input::File(path), Some(TimeSelector::Timestamp(column))) => {
            let name = open(path)?;
            plot_columns(opts, &zones, &overlays, &name, std::slice::from_ref(column))?
        }
        (Input::File(_), Some(selector)) => {
            bail!("Summing by {} needs an input directory", selector.kind())
        }
        (input, None) => plot_fileset(opts, &zones, &overlays, &input_fileset(input)?)?,
        (input, Some(selector)) => {
            let set = sum(Summation::from_fileset(input_fileset(input)?), selector)?;
            let mut field = MapField::from_sum(&set, opts.runname.as_deref());
            field.overlays = overlays.iter().filter_map(|o| o.sum_layer(selector)).collect();
            let filename = opts.outfile.clone().unwrap_or_else(|| field.filename.clone());
            vec![draw_map(opts, &zones, &field, &filename)?]
        }
    };

    info!(maps = written.len(), outdir = %opts.outdir.display(), "Plotting complete");
    Ok(written)
}

fn open(path: &Path) -> Result<NameFile> {
    NameFile::open(path).with_context(|| format!("Failed to read NAME file {}", path.display()))
}

fn input_fileset(input: &Input) -> Result<Fileset> {
    let fileset = match input {
        Input::File(path) => Fileset::from_paths([path]),
        Input::Files(paths) => Fileset::from_paths(paths),
        Input::Dir(dir) => Fileset::scan(dir),
    };
    fileset.with_context(|| format!("Failed to collect input files from {input:?}"))
}

fn sum(summation: Summation, selector: &TimeSelector) -> Result<SummedSet> {
    let set = match selector {
        TimeSelector::Day(day) => summation.sum_day(*day)?,
        TimeSelector::Week(week) => summation.sum_week(*week)?,
        TimeSelector::Month(month) => summation.sum_month(*month)?,
        TimeSelector::Year(year) => summation.sum_year(*year)?,
        TimeSelector::All => summation.sum_all()?,
        TimeSelector::Timestamp(_) => {
            bail!("A timestamp can only be plotted from a single input file")
        }
    };
    Ok(set)
}

fn column_field(
    opts: &PlotOptions,
    name: &NameFile,
    overlays: &[OverlayFile],
    column: &str,
) -> Result<MapField> {
    let mut field = MapField::from_column(name, column, opts.runname.as_deref())?;
    field.overlays = overlays.iter().filter_map(|o| o.layer(column)).collect();
    Ok(field)
}

fn plot_columns(
    opts: &PlotOptions,
    zones: &[Zone],
    overlays: &[OverlaySource],
    name: &NameFile,
    columns: &[String],
) -> Result<Vec<PathBuf>> {
    let single = columns.len() == 1;
    if !single && opts.outfile.is_some() {
        warn!(columns = columns.len(), "Ignoring output file name for a multi-map run");
    }
    let overlay_files: Vec<OverlayFile> =
        overlays.iter().filter_map(|o| o.load_for(name.date)).collect();
    let mut written = Vec::with_capacity(columns.len());
    for column in columns {
        let field = column_field(opts, name, &overlay_files, column)?;
        let filename = match &opts.outfile {
            Some(outfile) if single => outfile.clone(),
            _ => field.filename.clone(),
        };
        written.push(draw_map(opts, zones, &field, &filename)?);
    }
    Ok(written)
}

/// Every timestamp of every file; unreadable files are skipped.
fn plot_fileset(
    opts: &PlotOptions,
    zones: &[Zone],
    overlays: &[OverlaySource],
    fileset: &Fileset,
) -> Result<Vec<PathBuf>> {
    if opts.outfile.is_some() {
        warn!(files = fileset.len(), "Ignoring output file name for a multi-map run");
    }
    let mut written = Vec::new();
    for path in fileset.all() {
        let name = match NameFile::open(&path) {
            Ok(name) => name,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable NAME file");
                continue;
            }
        };
        let overlay_files: Vec<OverlayFile> =
            overlays.iter().filter_map(|o| o.load_for(name.date)).collect();
        for column in name.timestamps() {
            match column_field(opts, &name, &overlay_files, column)
                .and_then(|field| draw_map(opts, zones, &field, &field.filename))
            {
                Ok(path) => written.push(path),
                Err(e) => warn!(file = %name.path.display(), column = %column, error = %e, "Failed to plot column"),
            }
        }
    }
    Ok(written)
}

/// Draw one map and save it under `opts.outdir`.
///
/// Layers, back to front: sea, cells, gridlines, overlays, stations, zone
/// fills, zone lines.
pub fn draw_map(
    opts: &PlotOptions,
    zones: &[Zone],
    field: &MapField,
    filename: &str,
) -> Result<PathBuf> {
    let bounds = match (opts.lon_bounds, opts.lat_bounds) {
        (Some(lon), Some(lat)) => BoundingBox::from_ranges(lon, lat),
        _ => field.grid.bounds(),
    };
    let pixels_per_degree = opts
        .pixels_per_degree
        .unwrap_or_else(|| DEFAULT_MAP_SIDE / bounds.width().max(bounds.height()));
    let mut canvas = MapCanvas::new(bounds, pixels_per_degree)?;
    canvas.fill_background(SEA);

    let paint = opts.style.paint(field.min_max());
    let painted = canvas.paint_cells(field.cells.iter().copied(), &paint);

    let lons = opts.lon_axis.clone().unwrap_or_else(|| field.grid.lon_gridlines());
    let lats = opts.lat_axis.clone().unwrap_or_else(|| field.grid.lat_gridlines());
    canvas.draw_gridlines(&lons, &lats, GRIDLINE);

    for layer in &field.overlays {
        let fill = layer.colour.with_opacity(OVERLAY_OPACITY);
        for cell in &layer.cells {
            canvas.fill_rect(cell, fill);
        }
    }

    for &(lon, lat) in &opts.stations {
        canvas.draw_marker(lon, lat, MARKER);
    }

    if let Some(overlay) = &opts.shapes {
        if overlay.colours {
            for zone in zones {
                match Color::parse(&zone.colour) {
                    Ok(colour) => {
                        let fill = colour.with_opacity(ZONE_FILL_OPACITY);
                        for polygon in &zone.geometry.0 {
                            canvas.fill_polygon(polygon, fill);
                        }
                    }
                    Err(e) => warn!(zone = %zone.short_name, error = %e, "Skipping zone fill"),
                }
            }
        }
        if overlay.lines {
            for zone in zones {
                for ring in zone.outlines() {
                    canvas.draw_linestring(ring, ZONE_LINE);
                }
            }
        }
    }

    let caption = opts.caption.as_deref().unwrap_or(&field.caption);
    let filename = if filename.ends_with(".png") {
        filename.to_string()
    } else {
        format!("{filename}.png")
    };
    let path = opts.outdir.join(filename);
    let legend = overlay_legend(&field.overlays);
    let extra: Vec<(&str, &str)> = legend.iter().map(|l| ("Description", l.as_str())).collect();
    canvas
        .save_with_text(&path, caption, &extra)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!(cells = field.cells.len(), painted, "Painted cells");
    info!(path = %path.display(), caption = %caption, "Saved map");
    Ok(path)
}

/// `Overlays: RUN (#rrggbb), ...` for the PNG description.
fn overlay_legend(overlays: &[OverlayLayer]) -> Option<String> {
    if overlays.is_empty() {
        return None;
    }
    let entries: Vec<String> = overlays
        .iter()
        .map(|o| format!("{} (#{:02x}{:02x}{:02x})", o.label, o.colour.r, o.colour.g, o.colour.b))
        .collect();
    Some(format!("Overlays: {}", entries.join(", ")))
}
