//! Master grid: covering factors of every zone over every cell of a grid.
//!
//! Stored as JSON. Only non-zero factors are written; lookups zero-fill.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

use name_common::{Crs, GridSpec};
use name_parser::CellKey;

use crate::error::{CoverageError, Result};
use crate::factor::cover_factor;
use crate::zone::Zone;

/// Sparse (cell, zone) covering-factor table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterGrid {
    pub crs: Crs,
    pub grid: GridSpec,
    /// Zone short names, in shape-list order
    pub zones: Vec<String>,
    /// Cell centres `[lon, lat]`, lon-major
    pub cells: Vec<[f64; 2]>,
    /// Zone name to `[cell index, factor]` pairs with factor > 0
    pub coverage: BTreeMap<String, Vec<(usize, f64)>>,
    #[serde(skip)]
    index: HashMap<CellKey, usize>,
}

impl MasterGrid {
    /// Compute coverage of every zone over every cell of `grid`.
    pub fn build(grid: &GridSpec, zones: &[Zone], crs: Crs) -> Result<Self> {
        let mut names: Vec<String> = Vec::with_capacity(zones.len());
        for zone in zones {
            if names.contains(&zone.short_name) {
                return Err(CoverageError::DuplicateZone(zone.short_name.clone()));
            }
            names.push(zone.short_name.clone());
        }

        let cells: Vec<[f64; 2]> = grid.centres().iter().map(|c| [c.lon, c.lat]).collect();
        let mut coverage = BTreeMap::new();
        for zone in zones {
            let factors = zone_factors(grid, zone, &cells);
            debug!(zone = %zone.short_name, cells = factors.len(), "Computed zone coverage");
            coverage.insert(zone.short_name.clone(), factors);
        }

        let master = Self::from_parts(crs, *grid, names, cells, coverage);
        info!(
            cells = master.cells.len(),
            zones = master.zones.len(),
            "Built master grid"
        );
        Ok(master)
    }

    fn from_parts(
        crs: Crs,
        grid: GridSpec,
        zones: Vec<String>,
        cells: Vec<[f64; 2]>,
        coverage: BTreeMap<String, Vec<(usize, f64)>>,
    ) -> Self {
        let mut master = Self {
            crs,
            grid,
            zones,
            cells,
            coverage,
            index: HashMap::new(),
        };
        master.rebuild_index();
        master
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .cells
            .iter()
            .enumerate()
            .map(|(k, &[lon, lat])| (CellKey::new(lon, lat), k))
            .collect();
    }

    pub fn cell_index(&self, lon: f64, lat: f64) -> Option<usize> {
        self.index.get(&CellKey::new(lon, lat)).copied()
    }

    /// Covering factor of `zone` at the cell centred on `(lon, lat)`.
    ///
    /// `None` when the cell or zone is unknown; `0.0` for cells the zone
    /// does not reach.
    pub fn factor(&self, lon: f64, lat: f64, zone: &str) -> Option<f64> {
        let cell = self.cell_index(lon, lat)?;
        let entries = self.coverage.get(zone)?;
        Some(
            entries
                .binary_search_by_key(&cell, |&(k, _)| k)
                .map_or(0.0, |pos| entries[pos].1),
        )
    }

    /// Dense per-cell factors of one zone.
    pub fn zone_column(&self, zone: &str) -> Option<Vec<f64>> {
        let entries = self.coverage.get(zone)?;
        let mut column = vec![0.0; self.cells.len()];
        for &(k, f) in entries {
            if let Some(slot) = column.get_mut(k) {
                *slot = f;
            }
        }
        Some(column)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut master: Self = serde_json::from_str(text)?;
        master.normalise();
        Ok(master)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        info!(path = %path.display(), "Wrote master grid");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CoverageError::NotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let mut master: Self = serde_json::from_reader(reader)?;
        master.normalise();
        Ok(master)
    }

    fn normalise(&mut self) {
        for entries in self.coverage.values_mut() {
            entries.sort_by_key(|&(k, _)| k);
        }
        self.rebuild_index();
    }
}

/// Non-zero factors of one zone, sorted by cell index.
fn zone_factors(grid: &GridSpec, zone: &Zone, cells: &[[f64; 2]]) -> Vec<(usize, f64)> {
    cells
        .iter()
        .enumerate()
        .filter_map(|(k, &[lon, lat])| {
            let cell = grid.cell_bbox(lon, lat);
            zone.first_match(&cell)?;
            let f = cover_factor(&cell, &zone.geometry);
            (f > 0.0).then_some((k, f))
        })
        .collect()
}
