//! Concentration table: one row per grid cell, one column per timestamp.

use geo::Polygon;
use std::collections::{BTreeMap, HashMap};

use crate::error::{NameError, NameResult};

/// A single table value.
///
/// Values that do not parse as numbers are kept verbatim instead of failing
/// the whole file.
#[derive(Debug, Clone, PartialEq)]
pub enum Concentration {
    Value(f64),
    /// Empty cell
    Missing,
    /// Non-numeric text
    Text(String),
}

impl Concentration {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Concentration::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Concentration::Value(v),
            Err(_) => Concentration::Text(trimmed.to_string()),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Concentration::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Contribution to a row sum: missing counts as zero, text as NaN.
    pub fn summand(&self) -> f64 {
        match self {
            Concentration::Value(v) => *v,
            Concentration::Missing => 0.0,
            Concentration::Text(_) => f64::NAN,
        }
    }
}

/// Exact (lon, lat) index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey(u64, u64);

impl CellKey {
    pub fn new(lon: f64, lat: f64) -> Self {
        // fold -0.0 into 0.0 so both spellings index the same cell
        CellKey((lon + 0.0).to_bits(), (lat + 0.0).to_bits())
    }
}

/// One grid cell row of the table.
#[derive(Debug, Clone)]
pub struct CellRecord {
    pub x_index: i64,
    pub y_index: i64,
    pub lon: f64,
    pub lat: f64,
    pub values: Vec<Concentration>,
    /// Grid square around the cell centre
    pub geometry: Polygon<f64>,
}

/// Geometry and subtotal of one row.
#[derive(Debug, Clone, Copy)]
pub struct TrimmedRow<'a> {
    pub lon: f64,
    pub lat: f64,
    pub geometry: &'a Polygon<f64>,
    pub subtotal: f64,
}

/// Parsed concentration table.
#[derive(Debug, Clone, Default)]
pub struct NameData {
    timestamps: Vec<String>,
    rows: Vec<CellRecord>,
    index: HashMap<CellKey, usize>,
    subtotal: Option<Vec<f64>>,
    covers: BTreeMap<String, Vec<f64>>,
}

impl NameData {
    /// Build from rows; a repeated (lon, lat) keeps the first row's index slot.
    pub fn new(timestamps: Vec<String>, rows: Vec<CellRecord>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (pos, row) in rows.iter().enumerate() {
            index.entry(CellKey::new(row.lon, row.lat)).or_insert(pos);
        }
        Self {
            timestamps,
            rows,
            index,
            subtotal: None,
            covers: BTreeMap::new(),
        }
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    pub fn rows(&self) -> &[CellRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.timestamps.iter().position(|t| t == label)
    }

    /// Row for the cell centred exactly on `(lon, lat)`.
    pub fn get(&self, lon: f64, lat: f64) -> Option<&CellRecord> {
        self.index
            .get(&CellKey::new(lon, lat))
            .map(|&pos| &self.rows[pos])
    }

    /// Numeric view of a timestamp column.
    pub fn column(&self, label: &str) -> NameResult<Vec<f64>> {
        let col = self
            .column_index(label)
            .ok_or_else(|| NameError::UnknownColumn(label.to_string()))?;
        Ok(self.rows.iter().map(|r| r.values[col].summand()).collect())
    }

    /// Sum the given timestamp columns into the subtotal column.
    pub fn add_range<S: AsRef<str>>(&mut self, labels: &[S]) -> NameResult<()> {
        let cols = labels
            .iter()
            .map(|l| {
                self.column_index(l.as_ref())
                    .ok_or_else(|| NameError::UnknownColumn(l.as_ref().to_string()))
            })
            .collect::<NameResult<Vec<_>>>()?;
        self.subtotal = Some(self.sum_columns(&cols));
        Ok(())
    }

    /// Sum every timestamp column into the subtotal column.
    pub fn add_all(&mut self) {
        let cols: Vec<usize> = (0..self.timestamps.len()).collect();
        self.subtotal = Some(self.sum_columns(&cols));
    }

    fn sum_columns(&self, cols: &[usize]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| cols.iter().map(|&c| row.values[c].summand()).sum())
            .collect()
    }

    pub fn subtotal(&self) -> Option<&[f64]> {
        self.subtotal.as_deref()
    }

    /// Smallest positive and largest value over every timestamp column.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(
            self.rows
                .iter()
                .flat_map(|r| r.values.iter().filter_map(Concentration::value)),
        )
    }

    /// Smallest positive and largest value of one column (`subtotal` allowed).
    pub fn min_max_column(&self, label: &str) -> NameResult<Option<(f64, f64)>> {
        if label == "subtotal" {
            let subtotal = self.subtotal.as_ref().ok_or(NameError::MissingSubtotal)?;
            return Ok(min_max(subtotal.iter().copied()));
        }
        let col = self
            .column_index(label)
            .ok_or_else(|| NameError::UnknownColumn(label.to_string()))?;
        Ok(min_max(self.rows.iter().filter_map(|r| r.values[col].value())))
    }

    /// Geometry and subtotal only.
    pub fn trimmed(&self) -> NameResult<Vec<TrimmedRow<'_>>> {
        let subtotal = self.subtotal.as_ref().ok_or(NameError::MissingSubtotal)?;
        Ok(self
            .rows
            .iter()
            .zip(subtotal)
            .map(|(row, &subtotal)| TrimmedRow {
                lon: row.lon,
                lat: row.lat,
                geometry: &row.geometry,
                subtotal,
            })
            .collect())
    }

    /// Attach a per-row covering-factor column for a zone.
    pub fn set_cover(&mut self, zone: &str, factors: Vec<f64>) {
        debug_assert_eq!(factors.len(), self.rows.len());
        self.covers.insert(zone.to_string(), factors);
    }

    pub fn cover(&self, zone: &str) -> Option<&[f64]> {
        self.covers.get(zone).map(Vec::as_slice)
    }
}

/// Smallest positive and largest value, ignoring NaN.
pub fn min_max(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_positive: Option<f64> = None;
    let mut max: Option<f64> = None;
    for v in values.into_iter().filter(|v| !v.is_nan()) {
        if v > 0.0 {
            min_positive = Some(min_positive.map_or(v, |m| m.min(v)));
        }
        max = Some(max.map_or(v, |m| m.max(v)));
    }
    Some((min_positive?, max?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use name_common::cell_polygon;

    fn record(lon: f64, lat: f64, values: &[&str]) -> CellRecord {
        CellRecord {
            x_index: 1,
            y_index: 1,
            lon,
            lat,
            values: values.iter().map(|v| Concentration::parse(v)).collect(),
            geometry: cell_polygon(lon, lat, 1.0, 1.0),
        }
    }

    fn sample() -> NameData {
        NameData::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                record(0.5, 0.5, &["1.0", "2.0", "0.0"]),
                record(1.5, 0.5, &["0.0", "", "4e-9"]),
                record(0.5, 1.5, &["3.0", "bad", "1.0"]),
            ],
        )
    }

    #[test]
    fn test_parse_concentration() {
        assert_eq!(Concentration::parse(" 1.5E-08 "), Concentration::Value(1.5e-8));
        assert_eq!(Concentration::parse("  "), Concentration::Missing);
        assert_eq!(Concentration::parse("n/a"), Concentration::Text("n/a".into()));
    }

    #[test]
    fn test_add_all_and_range() {
        let mut data = sample();
        data.add_all();
        let subtotal = data.subtotal().unwrap();
        assert_eq!(subtotal[0], 3.0);
        assert_eq!(subtotal[1], 4e-9);
        assert!(subtotal[2].is_nan());

        data.add_range(&["a", "c"]).unwrap();
        assert_eq!(data.subtotal().unwrap(), &[1.0, 4e-9, 4.0]);

        assert!(matches!(
            data.add_range(&["zzz"]),
            Err(NameError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_min_max_ignores_zero_for_minimum() {
        let data = sample();
        assert_eq!(data.min_max(), Some((4e-9, 3.0)));
        assert_eq!(data.min_max_column("a").unwrap(), Some((1.0, 3.0)));
        assert!(data.min_max_column("subtotal").is_err());
    }

    #[test]
    fn test_trimmed_requires_subtotal() {
        let mut data = sample();
        assert!(matches!(data.trimmed(), Err(NameError::MissingSubtotal)));
        data.add_range(&["a"]).unwrap();
        let trimmed = data.trimmed().unwrap();
        assert_eq!(trimmed.len(), 3);
        assert_eq!((trimmed[2].lon, trimmed[2].lat, trimmed[2].subtotal), (0.5, 1.5, 3.0));
    }

    #[test]
    fn test_lookup_by_centre() {
        let data = sample();
        assert_eq!(data.get(1.5, 0.5).unwrap().values[2], Concentration::Value(4e-9));
        assert!(data.get(9.0, 9.0).is_none());
        assert_eq!(CellKey::new(-0.0, 1.0), CellKey::new(0.0, 1.0));
    }
}
