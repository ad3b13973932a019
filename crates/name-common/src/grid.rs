//! Regular lon/lat grid specification for NAME output.

use geo::{coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::CommonError;
use crate::BoundingBox;

/// Specification of a regular lat/lon grid as described by a NAME header.
///
/// The origin is the centre of the first cell; cell `(i, j)` is centred on
/// `origin + (i, j) * step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of cells in X (longitude) direction
    pub nx: usize,
    /// Number of cells in Y (latitude) direction
    pub ny: usize,
    /// Cell width in X direction
    pub dx: f64,
    /// Cell height in Y direction
    pub dy: f64,
    /// Centre of the first cell, X
    pub origin_x: f64,
    /// Centre of the first cell, Y
    pub origin_y: f64,
}

/// A cell centre together with its grid indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCentre {
    pub i: usize,
    pub j: usize,
    pub lon: f64,
    pub lat: f64,
}

impl GridSpec {
    pub fn new(
        origin_x: f64,
        origin_y: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Result<Self, CommonError> {
        if !(dx > 0.0 && dy > 0.0) {
            return Err(CommonError::InvalidGrid(format!(
                "resolution must be positive, got ({dx}, {dy})"
            )));
        }
        if !origin_x.is_finite() || !origin_y.is_finite() {
            return Err(CommonError::InvalidGrid(format!(
                "origin must be finite, got ({origin_x}, {origin_y})"
            )));
        }
        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            origin_x,
            origin_y,
        })
    }

    /// Longitude of column `i`.
    pub fn lon(&self, i: usize) -> f64 {
        self.origin_x + i as f64 * self.dx
    }

    /// Latitude of row `j`.
    pub fn lat(&self, j: usize) -> f64 {
        self.origin_y + j as f64 * self.dy
    }

    /// Convert a grid index to its cell centre.
    pub fn index_to_centre(&self, i: usize, j: usize) -> Option<CellCentre> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        Some(CellCentre {
            i,
            j,
            lon: self.lon(i),
            lat: self.lat(j),
        })
    }

    /// All cell centres, longitude as the outer loop.
    pub fn centres(&self) -> Vec<CellCentre> {
        let mut centres = Vec::with_capacity(self.len());
        for i in 0..self.nx {
            for j in 0..self.ny {
                centres.push(CellCentre {
                    i,
                    j,
                    lon: self.lon(i),
                    lat: self.lat(j),
                });
            }
        }
        centres
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }

    /// Axis-aligned extent of the cell centred on `(lon, lat)`.
    pub fn cell_bbox(&self, lon: f64, lat: f64) -> BoundingBox {
        cell_bbox(lon, lat, self.dx, self.dy)
    }

    pub fn cell_polygon(&self, lon: f64, lat: f64) -> Polygon<f64> {
        cell_polygon(lon, lat, self.dx, self.dy)
    }

    /// Map extent in longitude: `(x0, x0 + dx * nx)`.
    pub fn lon_bounds(&self) -> (f64, f64) {
        (self.origin_x, self.origin_x + self.dx * self.nx as f64)
    }

    /// Map extent in latitude: `(y0, y0 + dy * ny)`.
    pub fn lat_bounds(&self) -> (f64, f64) {
        (self.origin_y, self.origin_y + self.dy * self.ny as f64)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_ranges(self.lon_bounds(), self.lat_bounds())
    }

    /// Longitude gridline positions for map labelling.
    pub fn lon_gridlines(&self) -> Vec<f64> {
        let (lo, hi) = self.lon_bounds();
        gridlines(lo, hi, gridline_step(self.dx * self.nx as f64))
    }

    /// Latitude gridline positions for map labelling.
    pub fn lat_gridlines(&self) -> Vec<f64> {
        let (lo, hi) = self.lat_bounds();
        gridlines(lo, hi, gridline_step(self.dy * self.ny as f64))
    }
}

/// Gridline spacing in degrees for a map span.
pub fn gridline_step(span: f64) -> i64 {
    if span > 60.0 {
        20
    } else if span > 30.0 {
        10
    } else {
        5
    }
}

fn gridlines(origin: f64, bound: f64, step: i64) -> Vec<f64> {
    let whole = origin.trunc() as i64;
    let first = whole - whole.rem_euclid(step);
    let mut lines = Vec::new();
    let mut k = 0i64;
    loop {
        let value = (first + k * step) as f64;
        if value >= bound {
            break;
        }
        lines.push(value);
        k += 1;
    }
    lines
}

/// Axis-aligned extent of a cell centred on `(lon, lat)`.
pub fn cell_bbox(lon: f64, lat: f64, dlon: f64, dlat: f64) -> BoundingBox {
    BoundingBox::new(
        lon - dlon / 2.0,
        lat - dlat / 2.0,
        lon + dlon / 2.0,
        lat + dlat / 2.0,
    )
}

/// Grid square polygon: bottom-left, top-left, top-right, bottom-right.
pub fn cell_polygon(lon: f64, lat: f64, dlon: f64, dlat: f64) -> Polygon<f64> {
    let (hx, hy) = (dlon / 2.0, dlat / 2.0);
    Polygon::new(
        LineString::from(vec![
            coord! { x: lon - hx, y: lat - hy },
            coord! { x: lon - hx, y: lat + hy },
            coord! { x: lon + hx, y: lat + hy },
            coord! { x: lon + hx, y: lat - hy },
        ]),
        vec![],
    )
}
