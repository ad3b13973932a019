//! Synthetic NAME files for tests.
//!
//! The layout mirrors NAME III field output: an 18 line `key: value` header,
//! a `Fields:` descriptor block whose `T` row carries the column timestamps,
//! a column label row, then one data row per grid cell.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Descriptor rows of the field block, in file order (lines 21-35).
const DESCRIPTOR_ROWS: [&str; 15] = [
    "Species Category",
    "Species",
    "Quantity",
    "Units",
    "Source/Source group",
    "Ensemble Av",
    "Time Av or Int",
    "Horizontal Av or Int",
    "Vertical Av or Int",
    "Prob Perc",
    "Prob Perc Ens",
    "Prob Perc Time",
    "T",
    "Z",
    "D",
];

/// One data row: indices, centre and raw value strings.
#[derive(Debug, Clone)]
struct DataRow {
    i: i64,
    j: i64,
    lon: f64,
    lat: f64,
    values: Vec<String>,
}

/// Builder for NAME file text.
#[derive(Debug, Clone)]
pub struct NameFileBuilder {
    run_name: String,
    start_of_release: String,
    end_of_release: String,
    duration: String,
    averaging: String,
    altitude: String,
    origin: (f64, f64),
    step: (f64, f64),
    size: (usize, usize),
    timestamps: Vec<String>,
    rows: Vec<DataRow>,
}

impl Default for NameFileBuilder {
    fn default() -> Self {
        Self {
            run_name: "TEST_RUN".to_string(),
            start_of_release: "13/01/2017 09:00 UTC".to_string(),
            end_of_release: "13/01/2017 12:00 UTC".to_string(),
            duration: "1day 0hr 0min".to_string(),
            averaging: "3hr 0min integral".to_string(),
            altitude: "Z = 50.0 m agl".to_string(),
            origin: (0.5, 50.5),
            step: (1.0, 1.0),
            size: (2, 2),
            timestamps: vec!["13/01/2017 12:00 UTC".to_string()],
            rows: Vec::new(),
        }
    }
}

impl NameFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_name(mut self, name: &str) -> Self {
        self.run_name = name.to_string();
        self
    }

    pub fn release(mut self, start: &str, end: &str) -> Self {
        self.start_of_release = start.to_string();
        self.end_of_release = end.to_string();
        self
    }

    pub fn duration(mut self, duration: &str) -> Self {
        self.duration = duration.to_string();
        self
    }

    pub fn averaging(mut self, averaging: &str) -> Self {
        self.averaging = averaging.to_string();
        self
    }

    pub fn altitude(mut self, altitude: &str) -> Self {
        self.altitude = altitude.to_string();
        self
    }

    /// Grid origin (centre of first cell), step and size.
    pub fn grid(mut self, origin: (f64, f64), step: (f64, f64), size: (usize, usize)) -> Self {
        self.origin = origin;
        self.step = step;
        self.size = size;
        self
    }

    pub fn timestamps(mut self, labels: &[&str]) -> Self {
        self.timestamps = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a data row for grid indices `(i, j)` (1-based, as NAME writes them).
    pub fn row(self, i: i64, j: i64, values: &[f64]) -> Self {
        let raw: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let refs: Vec<&str> = raw.iter().map(String::as_str).collect();
        self.raw_row(i, j, &refs)
    }

    /// Add a data row with verbatim value strings.
    pub fn raw_row(mut self, i: i64, j: i64, values: &[&str]) -> Self {
        let lon = self.origin.0 + (i - 1) as f64 * self.step.0;
        let lat = self.origin.1 + (j - 1) as f64 * self.step.1;
        self.rows.push(DataRow {
            i,
            j,
            lon,
            lat,
            values: values.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Fill every grid cell, computing each value from `(i, j, column)`.
    pub fn fill_with(mut self, f: impl Fn(usize, usize, usize) -> f64) -> Self {
        let columns = self.timestamps.len();
        for i in 1..=self.size.0 {
            for j in 1..=self.size.1 {
                let values: Vec<f64> = (0..columns).map(|c| f(i, j, c)).collect();
                self = self.row(i as i64, j as i64, &values);
            }
        }
        self
    }

    /// Render the file contents.
    pub fn build(&self) -> String {
        let mut out = String::new();
        let n = self.timestamps.len();

        // Header, lines 1-18
        let _ = writeln!(out, "NAME III (version 6.5)");
        let _ = writeln!(out, "Run name:                   {}", self.run_name);
        let _ = writeln!(out, "Run time:                   01/02/2017 09:14:25.677 UTC");
        let _ = writeln!(out, "Met data:                   NWP Flow.Global_PT1_flow");
        let _ = writeln!(out, "Start of release:           {}", self.start_of_release);
        let _ = writeln!(out, "End of release:             {}", self.end_of_release);
        let _ = writeln!(out, "Source strength:            1.0000 g / s");
        let _ = writeln!(out, "Release location:           1.5000E,51.5000N");
        let _ = writeln!(out, "Release height:             0.000m agl");
        let _ = writeln!(out, "Run duration:               {}", self.duration);
        let _ = writeln!(out, "X grid origin:              {}", self.origin.0);
        let _ = writeln!(out, "Y grid origin:              {}", self.origin.1);
        let _ = writeln!(out, "X grid size:                {}", self.size.0);
        let _ = writeln!(out, "Y grid size:                {}", self.size.1);
        let _ = writeln!(out, "X grid resolution:          {}", self.step.0);
        let _ = writeln!(out, "Y grid resolution:          {}", self.step.1);
        let _ = writeln!(out, "Number of preliminary cols: 4");
        let _ = writeln!(out, "Number of field cols:       {}", n);

        // Field block, lines 19-35
        let _ = writeln!(out, "Fields:");
        descriptor_line(&mut out, "Field Name", &vec!["TOTAL_DEPOSITION".to_string(); n]);
        for label in DESCRIPTOR_ROWS {
            let values = match label {
                "Time Av or Int" => vec![self.averaging.clone(); n],
                "T" => self.timestamps.clone(),
                "Z" => vec![self.altitude.clone(); n],
                "Units" => vec!["g s / m^3".to_string(); n],
                _ => vec![String::new(); n],
            };
            descriptor_line(&mut out, label, &values);
        }

        // Column labels, line 36
        let _ = writeln!(out, "X grid, Y grid, Longitude, Latitude,{}", ",".repeat(n));

        // Data rows from line 37
        for row in &self.rows {
            let _ = write!(out, "{:5},{:5},{:10},{:10},", row.i, row.j, row.lon, row.lat);
            for v in &row.values {
                let _ = write!(out, " {},", v);
            }
            out.push('\n');
        }
        out
    }

    /// Write the file into `dir` and return its path.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).expect("failed to write NAME fixture");
        path
    }
}

fn descriptor_line(out: &mut String, label: &str, values: &[String]) {
    let _ = write!(out, "{:>20},{:>13},{:>13},{:>13},", label, "", "", "");
    for v in values {
        let _ = write!(out, "{:>24},", v);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_line_numbers() {
        let text = NameFileBuilder::new()
            .timestamps(&["13/01/2017 12:00 UTC", "13/01/2017 15:00 UTC"])
            .row(1, 1, &[1.0, 2.0])
            .build();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("Run name:"));
        assert!(lines[15].starts_with("Y grid resolution:"));
        assert_eq!(lines[18], "Fields:");
        assert!(lines[26].contains("Time Av or Int"));
        assert!(lines[32].trim_start().starts_with("T,"));
        assert!(lines[33].contains("Z = 50.0"));
        assert!(lines[35].starts_with("X grid"));
        assert!(lines[36].contains(" 1,"));
        assert_eq!(lines.len(), 37);
    }

    #[test]
    fn test_fill_with_covers_grid() {
        let text = NameFileBuilder::new()
            .grid((0.5, 0.5), (1.0, 1.0), (3, 2))
            .fill_with(|i, j, _| (i * 10 + j) as f64)
            .build();
        assert_eq!(text.lines().count(), 36 + 6);
    }
}
