//! NAME file loader.

use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use name_common::{
    cell_polygon, date_from_filename, format_name_timestamp, parse_name_timestamp, shortname, Crs,
    GridSpec, RunDirection, RunInfo,
};

use crate::data::{CellRecord, Concentration, NameData};
use crate::error::{NameError, NameResult};
use crate::fields::{FieldInfo, FIELD_HEADER_LINE, FIELD_ROWS};
use crate::header::{self, Header, HEADER_LINES};

/// 1-based line carrying the per-column timestamps (the `T` row).
pub const TIMESTAMP_LINE: usize = 33;
/// 1-based line of the first data row.
pub const DATA_FIRST_LINE: usize = 37;
/// X-Index, Y-Index, Longitude, Latitude.
const PRELIMINARY_COLS: usize = 4;

/// A fully parsed NAME file.
#[derive(Debug, Clone)]
pub struct NameFile {
    pub path: PathBuf,
    pub crs: Crs,
    pub header: Header,
    pub grid: GridSpec,
    pub run_name: String,
    /// `Start of release`, verbatim
    pub release: String,
    /// `End of release`, verbatim
    pub end_release: String,
    /// Normalised run duration
    pub duration: String,
    pub fields: FieldInfo,
    pub direction: RunDirection,
    /// Date stamp embedded in the file name, if any
    pub date: Option<NaiveDate>,
    pub data: NameData,
}

impl NameFile {
    /// Open a NAME file in the default CRS (EPSG:4326).
    pub fn open(path: impl AsRef<Path>) -> NameResult<Self> {
        Self::open_with_crs(path, Crs::default())
    }

    pub fn open_with_crs(path: impl AsRef<Path>, crs: Crs) -> NameResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(NameError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let file = Self::parse(&text, path, crs)?;
        info!(
            path = %path.display(),
            run = %file.run_name,
            direction = %file.direction,
            columns = file.data.timestamps().len(),
            rows = file.data.len(),
            "Loaded NAME file"
        );
        Ok(file)
    }

    /// Parse NAME file contents; `path` is used for the date stamp only.
    pub fn parse(text: &str, path: &Path, crs: Crs) -> NameResult<Self> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < DATA_FIRST_LINE - 1 {
            return Err(NameError::InvalidLayout {
                line: lines.len(),
                message: format!(
                    "file has {} lines, expected at least {}",
                    lines.len(),
                    DATA_FIRST_LINE - 1
                ),
            });
        }

        let header = Header::from_lines(lines[..HEADER_LINES].iter().copied());
        let grid = header.grid_spec()?;
        let run_name = header.require(header::RUN_NAME)?.to_string();
        let release = header.require(header::START_OF_RELEASE)?.to_string();
        let end_release = header.require(header::END_OF_RELEASE)?.to_string();
        let duration = crate::fields::normalise_duration(header.require(header::RUN_DURATION)?);

        let field_rows = &lines[FIELD_HEADER_LINE..FIELD_HEADER_LINE + FIELD_ROWS];
        let fields = FieldInfo::from_rows(field_rows);

        let direction = RunDirection::from_release(
            parse_name_timestamp(&release)?,
            parse_name_timestamp(&end_release)?,
        );

        let (columns, raw_labels) = timestamp_columns(lines[TIMESTAMP_LINE - 1]);
        let timestamps = match direction {
            RunDirection::Forwards => raw_labels,
            RunDirection::Backwards => shift_to_release_end(&raw_labels, &end_release)?,
        };

        let mut rows = Vec::new();
        for (offset, line) in lines[DATA_FIRST_LINE - 1..].iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = DATA_FIRST_LINE + offset;
            rows.push(parse_row(line, line_no, &columns, &grid)?);
        }

        let stem = shortname(path);
        let date = date_from_filename(&stem);
        if date.is_none() {
            debug!(file = %stem, "No YYYYMMDD date stamp in file name");
        }

        Ok(Self {
            path: path.to_path_buf(),
            crs,
            header,
            grid,
            run_name,
            release,
            end_release,
            duration,
            fields,
            direction,
            date,
            data: NameData::new(timestamps, rows),
        })
    }

    pub fn timestamps(&self) -> &[String] {
        self.data.timestamps()
    }

    pub fn run_info(&self) -> RunInfo {
        RunInfo {
            run_name: self.run_name.clone(),
            averaging: self.fields.averaging.clone(),
            altitude: self.fields.altitude.clone(),
            direction: self.direction,
            release: self.release.clone(),
            end_release: self.end_release.clone(),
        }
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        shortname(&self.path)
    }

    /// `(YYYY, MM, DD)` strings of the file date stamp.
    pub fn date_parts(&self) -> Option<(String, String, String)> {
        self.date.map(|d| {
            (
                format!("{:04}", d.year()),
                format!("{:02}", d.month()),
                format!("{:02}", d.day()),
            )
        })
    }

    pub fn lon_bounds(&self) -> (f64, f64) {
        self.grid.lon_bounds()
    }

    pub fn lat_bounds(&self) -> (f64, f64) {
        self.grid.lat_bounds()
    }

    pub fn lon_gridlines(&self) -> Vec<f64> {
        self.grid.lon_gridlines()
    }

    pub fn lat_gridlines(&self) -> Vec<f64> {
        self.grid.lat_gridlines()
    }

    pub fn add_all(&mut self) {
        self.data.add_all();
    }

    pub fn add_range<S: AsRef<str>>(&mut self, labels: &[S]) -> NameResult<()> {
        self.data.add_range(labels)
    }
}

/// Column positions and labels of the timestamp columns.
///
/// Columns whose label is blank (the trailing comma) are dropped.
fn timestamp_columns(line: &str) -> (Vec<usize>, Vec<String>) {
    line.split(',')
        .enumerate()
        .skip(PRELIMINARY_COLS)
        .filter_map(|(pos, label)| {
            let label = label.trim();
            (!label.is_empty()).then(|| (pos, label.to_string()))
        })
        .unzip()
}

/// Shift every label by `end_release - first label`, computed once.
fn shift_to_release_end(labels: &[String], end_release: &str) -> NameResult<Vec<String>> {
    let Some(first) = labels.first() else {
        return Ok(Vec::new());
    };
    let delta = parse_name_timestamp(end_release)? - parse_name_timestamp(first)?;
    debug!(hours = delta.num_hours(), "Shifting backward-run timestamps to end of release");
    labels
        .iter()
        .map(|label| Ok(format_name_timestamp(&(parse_name_timestamp(label)? + delta))))
        .collect()
}

fn parse_row(line: &str, line_no: usize, columns: &[usize], grid: &GridSpec) -> NameResult<CellRecord> {
    let cells: Vec<&str> = line.split(',').collect();
    if cells.len() < PRELIMINARY_COLS {
        return Err(NameError::InvalidLayout {
            line: line_no,
            message: format!("expected at least {PRELIMINARY_COLS} columns"),
        });
    }

    let number = |k: usize, what: &str| -> NameResult<f64> {
        cells[k].trim().parse::<f64>().map_err(|_| NameError::InvalidLayout {
            line: line_no,
            message: format!("{what} '{}' is not numeric", cells[k].trim()),
        })
    };

    let x_index = number(0, "X-Index")? as i64;
    let y_index = number(1, "Y-Index")? as i64;
    let lon = number(2, "Longitude")?;
    let lat = number(3, "Latitude")?;

    let values: Vec<Concentration> = columns
        .iter()
        .map(|&c| cells.get(c).map_or(Concentration::Missing, |v| Concentration::parse(v)))
        .collect();
    if values.iter().any(|v| matches!(v, Concentration::Text(_))) {
        warn!(line = line_no, "Non-numeric concentration kept as text");
    }

    Ok(CellRecord {
        x_index,
        y_index,
        lon,
        lat,
        values,
        geometry: cell_polygon(lon, lat, grid.dx, grid.dy),
    })
}
