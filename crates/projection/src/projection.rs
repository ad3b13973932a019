//! Supported projections and point transforms between them.

use name_common::Crs;

use crate::error::{ProjectionError, Result};
use crate::mercator;

const WGS84_WKT: &str = concat!(
    "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],",
    "PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]]"
);

const WEB_MERCATOR_WKT: &str = concat!(
    "PROJCS[\"WGS_1984_Web_Mercator_Auxiliary_Sphere\",",
    "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],",
    "PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]],",
    "PROJECTION[\"Mercator_Auxiliary_Sphere\"],PARAMETER[\"False_Easting\",0.0],",
    "PARAMETER[\"False_Northing\",0.0],PARAMETER[\"Central_Meridian\",0.0],",
    "PARAMETER[\"Standard_Parallel_1\",0.0],PARAMETER[\"Auxiliary_Sphere_Type\",0.0],",
    "UNIT[\"Meter\",1.0]]"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// WGS84 longitude/latitude, EPSG:4326
    Geographic,
    /// Spherical Mercator, EPSG:3857
    WebMercator,
}

impl Projection {
    pub fn from_epsg(code: u32) -> Result<Self> {
        match code {
            4326 => Ok(Projection::Geographic),
            3857 | 3785 | 900913 => Ok(Projection::WebMercator),
            other => Err(ProjectionError::UnsupportedEpsg(other)),
        }
    }

    /// Recognise an `EPSG:nnnn` code or the WKT of a `.prj` file.
    pub fn from_crs(crs: &Crs) -> Result<Self> {
        if crs.is_wgs84() {
            return Ok(Projection::Geographic);
        }
        let text = crs.as_str().to_uppercase();
        if let Some(code) = text.strip_prefix("EPSG:") {
            return match code.trim().parse::<u32>() {
                Ok(code) => Self::from_epsg(code),
                Err(_) => Err(ProjectionError::UnsupportedCrs(crs.to_string())),
            };
        }
        if text.contains("WEB_MERCATOR")
            || text.contains("MERCATOR_AUXILIARY_SPHERE")
            || text.contains("PSEUDO-MERCATOR")
        {
            return Ok(Projection::WebMercator);
        }
        if text.starts_with("GEOGCS[") && (text.contains("WGS_1984") || text.contains("WGS 84")) {
            return Ok(Projection::Geographic);
        }
        Err(ProjectionError::UnsupportedCrs(crs.to_string()))
    }

    pub fn epsg(self) -> u32 {
        match self {
            Projection::Geographic => 4326,
            Projection::WebMercator => 3857,
        }
    }

    pub fn crs(self) -> Crs {
        Crs::new(format!("EPSG:{}", self.epsg()))
    }

    /// ESRI WKT written to `.prj` files.
    pub fn wkt(self) -> &'static str {
        match self {
            Projection::Geographic => WGS84_WKT,
            Projection::WebMercator => WEB_MERCATOR_WKT,
        }
    }

    pub fn to_geographic(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Projection::Geographic => (x, y),
            Projection::WebMercator => mercator::inverse(x, y),
        }
    }

    pub fn from_geographic(self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Projection::Geographic => (lon, lat),
            Projection::WebMercator => mercator::forward(lon, lat),
        }
    }

    /// Move a point from this projection to `target`.
    pub fn transform(self, target: Projection, x: f64, y: f64) -> (f64, f64) {
        if self == target {
            return (x, y);
        }
        let (lon, lat) = self.to_geographic(x, y);
        target.from_geographic(lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_wkt_are_recognised() {
        assert_eq!(Projection::from_epsg(4326).unwrap(), Projection::Geographic);
        assert_eq!(Projection::from_crs(&Crs::new("epsg:3857")).unwrap(), Projection::WebMercator);
        for p in [Projection::Geographic, Projection::WebMercator] {
            assert_eq!(Projection::from_crs(&Crs::new(p.wkt())).unwrap(), p);
            assert_eq!(Projection::from_crs(&p.crs()).unwrap(), p);
        }
    }

    #[test]
    fn test_unsupported() {
        assert!(matches!(
            Projection::from_epsg(27700),
            Err(ProjectionError::UnsupportedEpsg(27700))
        ));
        assert!(matches!(
            Projection::from_crs(&Crs::new("PROJCS[\"British_National_Grid\"]")),
            Err(ProjectionError::UnsupportedCrs(_))
        ));
        assert!(Projection::from_crs(&Crs::new("EPSG:abc")).is_err());
    }

    #[test]
    fn test_identity_transform() {
        let p = Projection::WebMercator;
        assert_eq!(p.transform(p, 12.5, -3.0), (12.5, -3.0));
        let (x, y) = Projection::Geographic.transform(p, -9.9, 53.3);
        let (lon, lat) = p.transform(Projection::Geographic, x, y);
        assert!((lon + 9.9).abs() < 1e-9 && (lat - 53.3).abs() < 1e-9);
    }
}
