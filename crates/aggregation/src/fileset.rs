//! Directory of NAME files grouped by the date stamp in each file name.

use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use name_common::{date_from_filename, shortname, IsoWeek, TimeSelector, YearMonth};

use crate::error::{AggregationError, Result};

/// A NAME file found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// `YYYYMMDD` stamp from the file name
    pub date: Option<NaiveDate>,
}

/// NAME files sorted by name: the `*.txt` files directly inside one
/// directory, or an explicit list.
#[derive(Debug, Clone)]
pub struct Fileset {
    dir: PathBuf,
    files: Vec<ScannedFile>,
}

impl Fileset {
    /// List `*.txt` files in `dir` (not recursive).
    ///
    /// Files without a date stamp stay in [`Fileset::all`] but are left out
    /// of every date query.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(AggregationError::NotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(AggregationError::NotADirectory(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| AggregationError::Walk(e.to_string()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt")
            {
                continue;
            }
            let date = date_from_filename(&shortname(path));
            if date.is_none() {
                warn!(file = %path.display(), "No YYYYMMDD date in file name, excluded from date groups");
            }
            files.push(ScannedFile {
                path: path.to_path_buf(),
                date,
            });
        }

        debug!(dir = %dir.display(), files = files.len(), "Scanned NAME directory");
        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    /// File set from an explicit list of NAME files.
    ///
    /// Every path must name an existing file; duplicates are dropped. The
    /// set's directory is the parent of the first file after sorting.
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                return Err(AggregationError::NotFound(path.to_path_buf()));
            }
            let date = date_from_filename(&shortname(path));
            if date.is_none() {
                warn!(file = %path.display(), "No YYYYMMDD date in file name, excluded from date groups");
            }
            files.push(ScannedFile {
                path: path.to_path_buf(),
                date,
            });
        }
        files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()).then(a.path.cmp(&b.path)));
        files.dedup_by(|a, b| a.path == b.path);

        let dir = files
            .first()
            .and_then(|f| f.path.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        debug!(files = files.len(), "Collected NAME file list");
        Ok(Self { dir, files })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[ScannedFile] {
        &self.files
    }

    /// Every file found.
    pub fn all(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn day(&self, day: NaiveDate) -> Vec<PathBuf> {
        self.dated(|d| d == day)
    }

    /// Files dated within an ISO week, across month and year boundaries.
    pub fn week(&self, week: IsoWeek) -> Vec<PathBuf> {
        self.dated(|d| week.contains(d))
    }

    pub fn month(&self, month: YearMonth) -> Vec<PathBuf> {
        self.dated(|d| YearMonth::of(d) == month)
    }

    pub fn year(&self, year: i32) -> Vec<PathBuf> {
        self.dated(|d| d.year() == year)
    }

    /// Files dated between `start` and `stop`, both inclusive.
    pub fn between(&self, start: NaiveDate, stop: NaiveDate) -> Vec<PathBuf> {
        self.dated(|d| d >= start && d <= stop)
    }

    /// Files for a time selector; a single timestamp selects every file.
    pub fn select(&self, selector: &TimeSelector) -> Vec<PathBuf> {
        match selector {
            TimeSelector::Day(day) => self.day(*day),
            TimeSelector::Week(week) => self.week(*week),
            TimeSelector::Month(month) => self.month(*month),
            TimeSelector::Year(year) => self.year(*year),
            TimeSelector::Timestamp(_) | TimeSelector::All => self.all(),
        }
    }

    /// First file stamped with `date`.
    pub fn find_date(&self, date: NaiveDate) -> Option<&Path> {
        self.files
            .iter()
            .find(|f| f.date == Some(date))
            .map(|f| f.path.as_path())
    }

    fn dated(&self, keep: impl Fn(NaiveDate) -> bool) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| f.date.is_some_and(&keep))
            .map(|f| f.path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = test_utils::temp_dir();
        touch(
            dir.path(),
            &["b_20170102.txt", "a_20170101.txt", "notes.md", "undated.txt"],
        );
        fs::create_dir(dir.path().join("nested_20170103.txt")).unwrap();

        let set = Fileset::scan(dir.path()).unwrap();
        let names: Vec<String> = set.all().iter().map(|p| shortname(p)).collect();
        assert_eq!(names, vec!["a_20170101", "b_20170102", "undated"]);
        assert_eq!(set.files()[2].date, None);
    }

    #[test]
    fn test_between_is_inclusive() {
        let dir = test_utils::temp_dir();
        touch(dir.path(), &["r_20170101.txt", "r_20170105.txt", "r_20170110.txt"]);
        let set = Fileset::scan(dir.path()).unwrap();
        let d = |s| NaiveDate::parse_from_str(s, "%Y%m%d").unwrap();
        assert_eq!(set.between(d("20170101"), d("20170105")).len(), 2);
        assert_eq!(set.between(d("20170106"), d("20170109")).len(), 0);
    }

    #[test]
    fn test_explicit_file_list() {
        let dir = test_utils::temp_dir();
        touch(dir.path(), &["r_20170105.txt", "r_20170101.txt", "other.txt"]);
        let p = |name: &str| dir.path().join(name);

        let set =
            Fileset::from_paths([p("r_20170105.txt"), p("r_20170101.txt"), p("r_20170105.txt")]).unwrap();
        let names: Vec<String> = set.all().iter().map(|p| shortname(p)).collect();
        assert_eq!(names, vec!["r_20170101", "r_20170105"]);
        assert_eq!(set.dir(), dir.path());

        let d = NaiveDate::from_ymd_opt(2017, 1, 5).unwrap();
        assert_eq!(set.find_date(d), Some(p("r_20170105.txt").as_path()));
        assert_eq!(set.find_date(d.succ_opt().unwrap()), None);

        assert!(matches!(
            Fileset::from_paths([p("missing_20170101.txt")]),
            Err(AggregationError::NotFound(_))
        ));
    }

    #[test]
    fn test_not_a_directory() {
        let dir = test_utils::temp_dir();
        touch(dir.path(), &["file.txt"]);
        assert!(matches!(
            Fileset::scan(dir.path().join("file.txt")),
            Err(AggregationError::NotADirectory(_))
        ));
        assert!(matches!(
            Fileset::scan(dir.path().join("missing")),
            Err(AggregationError::NotFound(_))
        ));
    }
}
