//! Coordinate reference system descriptor.
//!
//! Coverage is computed in whatever planar coordinates the zones and grid
//! share, so the CRS is carried as an opaque descriptor (an authority code
//! such as `EPSG:4326`, or the WKT text of a shapefile `.prj`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default CRS for NAME output grids.
pub const DEFAULT_CRS: &str = "EPSG:4326";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(String);

impl Crs {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into().trim().to_string())
    }

    /// Read the CRS of a shapefile from its sibling `.prj` file, if present.
    pub fn from_shapefile(shp: &Path) -> Option<Self> {
        let prj = shp.with_extension("prj");
        let text = std::fs::read_to_string(prj).ok()?;
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self::new(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the WGS84 geographic CRS, given either as a code or WKT.
    pub fn is_wgs84(&self) -> bool {
        let upper = self.0.to_uppercase();
        upper == "EPSG:4326" || upper == "CRS:84" || upper.starts_with("GEOGCS[\"GCS_WGS_1984\"")
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self(DEFAULT_CRS.to_string())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
