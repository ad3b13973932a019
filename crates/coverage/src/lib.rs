//! Covering factors of zone polygons over NAME grid cells.
//!
//! A zone is loaded from a polygon shapefile, its records merged into one
//! multipolygon and repaired once with a zero-width buffer when invalid. The
//! covering factor of a cell is the share of the cell's area inside the zone.
//!
//! Factors are either attached to a loaded NAME table ([`cover_name_data`])
//! or precomputed for a whole grid and stored as a [`MasterGrid`].

pub mod error;
pub mod factor;
pub mod master;
pub mod shapelist;
pub mod zone;

pub use error::{CoverageError, Result};
pub use factor::{cover_factor, intersection_area};
pub use master::MasterGrid;
pub use shapelist::{parse_shape_list, read_shape_list, ShapeListEntry};
pub use zone::{check_validity, load_zones, ValidityReport, Zone};

use geo::{BoundingRect, Polygon};
use name_common::BoundingBox;
use name_parser::NameData;
use tracing::debug;

/// Attach a covering-factor column for `zone` to every row of `data`.
///
/// The column is keyed by the zone's short name.
pub fn cover_name_data(data: &mut NameData, zone: &Zone) {
    let factors: Vec<f64> = data
        .rows()
        .iter()
        .map(|row| {
            let cell = cell_bounds(&row.geometry);
            if zone.first_match(&cell).is_none() {
                return 0.0;
            }
            cover_factor(&cell, &zone.geometry)
        })
        .collect();
    let covered = factors.iter().filter(|&&f| f > 0.0).count();
    debug!(zone = %zone.short_name, covered, "Attached zone coverage");
    data.set_cover(&zone.short_name, factors);
}

fn cell_bounds(cell: &Polygon<f64>) -> BoundingBox {
    cell.bounding_rect()
        .map(BoundingBox::from)
        .unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
}
