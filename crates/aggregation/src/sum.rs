//! Summation of NAME files over a time period.
//!
//! A [`Summation`] holds a scanned directory or file list. Exactly one `sum_*` call
//! consumes it and yields a [`SummedSet`], which cannot be summed again.

use chrono::{Datelike, NaiveDate};
use geo::Polygon;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use name_common::{GridSpec, IsoWeek, RunInfo, TimeSelector, YearMonth};
use name_parser::{min_max, CellKey, NameFile};

use crate::error::{AggregationError, Result};
use crate::fileset::Fileset;

/// A file set, ready to be summed once.
#[derive(Debug, Clone)]
pub struct Summation {
    fileset: Fileset,
}

impl Summation {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            fileset: Fileset::scan(dir)?,
        })
    }

    pub fn from_fileset(fileset: Fileset) -> Self {
        Self { fileset }
    }

    pub fn fileset(&self) -> &Fileset {
        &self.fileset
    }

    pub fn sum_day(self, day: NaiveDate) -> Result<SummedSet> {
        self.sum(TimeSelector::Day(day))
    }

    pub fn sum_week(self, week: IsoWeek) -> Result<SummedSet> {
        self.sum(TimeSelector::Week(week))
    }

    pub fn sum_month(self, month: YearMonth) -> Result<SummedSet> {
        self.sum(TimeSelector::Month(month))
    }

    pub fn sum_year(self, year: i32) -> Result<SummedSet> {
        self.sum(TimeSelector::Year(year))
    }

    pub fn sum_all(self) -> Result<SummedSet> {
        self.sum(TimeSelector::All)
    }

    fn sum(self, selector: TimeSelector) -> Result<SummedSet> {
        let files = self.fileset.select(&selector);
        if files.is_empty() {
            return Err(AggregationError::NoFilesSelected {
                selection: selection_label(&selector),
            });
        }

        let mut acc: Option<Accumulator> = None;
        let mut summed = Vec::with_capacity(files.len());
        let mut last_error = None;
        for path in files {
            // each file is dropped before the next one is read
            let mut name = match NameFile::open(&path) {
                Ok(name) => name,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable NAME file");
                    last_error = Some(e);
                    continue;
                }
            };
            name.add_all();
            match acc.as_mut() {
                Some(acc) => acc.add(&name),
                None => acc = Some(Accumulator::first(&name)),
            }
            summed.push(path);
        }

        let Some(acc) = acc else {
            return Err(match last_error {
                Some(e) => e.into(),
                None => AggregationError::NoFilesSelected {
                    selection: selection_label(&selector),
                },
            });
        };

        info!(
            selection = %selection_label(&selector),
            files = summed.len(),
            cells = acc.cells.len(),
            "Summed NAME files"
        );
        Ok(SummedSet {
            selector,
            run: acc.run,
            date: acc.date,
            grid: acc.grid,
            files: summed,
            cells: acc.cells,
            total: acc.total,
        })
    }
}

/// Cell of a summed set.
#[derive(Debug, Clone)]
pub struct SummedCell {
    pub lon: f64,
    pub lat: f64,
    pub geometry: Polygon<f64>,
}

/// Geometry and total of one summed cell.
#[derive(Debug, Clone, Copy)]
pub struct TotalRow<'a> {
    pub lon: f64,
    pub lat: f64,
    pub geometry: &'a Polygon<f64>,
    pub total: f64,
}

/// Result of a summation.
///
/// Run metadata and date come from the first file summed.
#[derive(Debug, Clone)]
pub struct SummedSet {
    pub selector: TimeSelector,
    pub run: RunInfo,
    pub date: Option<NaiveDate>,
    pub grid: GridSpec,
    /// Files that went into the total, in summation order
    pub files: Vec<PathBuf>,
    cells: Vec<SummedCell>,
    total: Vec<f64>,
}

impl SummedSet {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[SummedCell] {
        &self.cells
    }

    pub fn total(&self) -> &[f64] {
        &self.total
    }

    /// Smallest positive and largest total.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(self.total.iter().copied())
    }

    pub fn trimmed(&self) -> Vec<TotalRow<'_>> {
        self.cells
            .iter()
            .zip(&self.total)
            .map(|(cell, &total)| TotalRow {
                lon: cell.lon,
                lat: cell.lat,
                geometry: &cell.geometry,
                total,
            })
            .collect()
    }

    /// `(YYYY, MM, DD)` strings of the first file's date stamp.
    pub fn date_parts(&self) -> Option<(String, String, String)> {
        self.date.map(|d| {
            (
                format!("{:04}", d.year()),
                format!("{:02}", d.month()),
                format!("{:02}", d.day()),
            )
        })
    }
}

/// Running total aligned by cell centre.
struct Accumulator {
    run: RunInfo,
    date: Option<NaiveDate>,
    grid: GridSpec,
    cells: Vec<SummedCell>,
    total: Vec<f64>,
    index: HashMap<CellKey, usize>,
}

impl Accumulator {
    fn first(name: &NameFile) -> Self {
        let mut acc = Self {
            run: name.run_info(),
            date: name.date,
            grid: name.grid,
            cells: Vec::with_capacity(name.data.len()),
            total: Vec::with_capacity(name.data.len()),
            index: HashMap::with_capacity(name.data.len()),
        };
        acc.add(name);
        acc
    }

    fn add(&mut self, name: &NameFile) {
        if name.grid != self.grid {
            warn!(file = %name.path.display(), "Grid differs from first file, aligning by cell centre");
        }
        let Some(subtotal) = name.data.subtotal() else {
            return;
        };
        let mut added = 0usize;
        for (row, &value) in name.data.rows().iter().zip(subtotal) {
            let key = CellKey::new(row.lon, row.lat);
            match self.index.get(&key) {
                Some(&pos) => self.total[pos] += value,
                None => {
                    self.index.insert(key, self.cells.len());
                    self.cells.push(SummedCell {
                        lon: row.lon,
                        lat: row.lat,
                        geometry: row.geometry.clone(),
                    });
                    self.total.push(value);
                    added += 1;
                }
            }
        }
        debug!(file = %name.path.display(), new_cells = added, "Added file to total");
    }
}

fn selection_label(selector: &TimeSelector) -> String {
    match selector {
        TimeSelector::Timestamp(t) => format!("timestamp {t}"),
        TimeSelector::Day(d) => format!("day {}", d.format("%Y%m%d")),
        TimeSelector::Week(w) => format!("week {w}"),
        TimeSelector::Month(m) => format!("month {}-{:02}", m.year, m.month),
        TimeSelector::Year(y) => format!("year {y}"),
        TimeSelector::All => "all files".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_labels() {
        let day = NaiveDate::from_ymd_opt(2017, 1, 13).unwrap();
        assert_eq!(selection_label(&TimeSelector::Day(day)), "day 20170113");
        assert_eq!(
            selection_label(&TimeSelector::Week(IsoWeek::new(2017, 2).unwrap())),
            "week 2017-W02"
        );
        assert_eq!(selection_label(&TimeSelector::All), "all files");
    }

    #[test]
    fn test_empty_directory_sums_nothing() {
        let dir = test_utils::temp_dir();
        let err = Summation::new(dir.path()).unwrap().sum_all().unwrap_err();
        assert!(matches!(err, AggregationError::NoFilesSelected { .. }));
        assert!(err.to_string().contains("all files"));
    }
}
