//! Zones: polygon shapefiles merged into one multipolygon each.

use geo::{unary_union, BoundingRect, Buffer, Coord, LineString, MultiPolygon, Polygon, Validation};
use shapefile::{PolygonRing, Shape, ShapeReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use name_common::{shortname, BoundingBox, Crs};

use crate::error::{CoverageError, Result};
use crate::shapelist::{read_shape_list, ShapeListEntry};

/// A named zone built from the records of one shapefile.
#[derive(Debug, Clone)]
pub struct Zone {
    /// File stem of the source shapefile
    pub short_name: String,
    /// Display colour from the shape list
    pub colour: String,
    pub path: PathBuf,
    /// Per-record geometry, in file order
    pub records: Vec<MultiPolygon<f64>>,
    /// Per-record bounding boxes, used to pre-filter cells
    pub record_bounds: Vec<BoundingBox>,
    /// Union of all records, each repaired first when invalid
    pub geometry: MultiPolygon<f64>,
    pub bounds: BoundingBox,
    /// CRS from the sibling `.prj` file
    pub crs: Option<Crs>,
}

/// Validity of a zone before and after the zero-buffer repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityReport {
    pub short_name: String,
    pub geometry_type: &'static str,
    pub valid_before: bool,
    pub valid_after: bool,
}

impl Zone {
    /// Load a zone from a polygon shapefile.
    pub fn load(path: impl AsRef<Path>, colour: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CoverageError::NotFound(path.to_path_buf()));
        }
        let shapes = ShapeReader::from_path(path)
            .and_then(|reader| reader.read())
            .map_err(|e| CoverageError::Shapefile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut records = Vec::with_capacity(shapes.len());
        for shape in shapes {
            match shape_to_multipolygon(shape) {
                Some(mp) if !mp.0.is_empty() => records.push(mp),
                Some(_) => {}
                None => debug!(path = %path.display(), "Skipping non-polygon record"),
            }
        }

        let mut zone = Self::from_records(shortname(path), colour, records)?;
        zone.path = path.to_path_buf();
        zone.crs = Crs::from_shapefile(path);
        info!(
            zone = %zone.short_name,
            records = zone.records.len(),
            polygons = zone.geometry.0.len(),
            "Loaded zone"
        );
        Ok(zone)
    }

    /// Build a zone from in-memory record geometry.
    pub fn from_records(
        short_name: impl Into<String>,
        colour: impl Into<String>,
        records: Vec<MultiPolygon<f64>>,
    ) -> Result<Self> {
        let short_name = short_name.into();
        let record_bounds: Vec<BoundingBox> = records
            .iter()
            .filter_map(|r| r.bounding_rect().map(BoundingBox::from))
            .collect();
        if records.is_empty() || record_bounds.len() != records.len() {
            return Err(CoverageError::EmptyZone(short_name));
        }

        let repaired: Vec<MultiPolygon<f64>> = records
            .iter()
            .enumerate()
            .map(|(k, record)| repair(&short_name, k, record))
            .collect();
        let geometry = unary_union(repaired.iter().flat_map(|r| r.0.iter()));
        let bounds = geometry
            .bounding_rect()
            .map(BoundingBox::from)
            .ok_or_else(|| CoverageError::EmptyZone(short_name.clone()))?;

        Ok(Self {
            short_name,
            colour: colour.into(),
            path: PathBuf::new(),
            records,
            record_bounds,
            geometry,
            bounds,
            crs: None,
        })
    }

    /// Index of the first record whose bounding box overlaps `cell`.
    pub fn first_match(&self, cell: &BoundingBox) -> Option<usize> {
        let mut hits = self
            .record_bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| b.intersects(cell))
            .map(|(k, _)| k);
        let first = hits.next()?;
        let extra = hits.count();
        if extra > 0 {
            debug!(
                zone = %self.short_name,
                record = first,
                dropped = extra,
                "Cell matches several records, keeping the first"
            );
        }
        Some(first)
    }

    pub fn lat_min(&self) -> f64 {
        self.bounds.min_y
    }

    pub fn lat_max(&self) -> f64 {
        self.bounds.max_y
    }

    /// Boundary rings of every record, for drawing outlines.
    pub fn outlines(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.records
            .iter()
            .flat_map(|r| r.0.iter())
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
    }
}

/// Load every zone named in a shape list, in list order.
///
/// Relative paths resolve against the current directory.
pub fn load_zones(shape_list: &Path) -> Result<Vec<Zone>> {
    let entries = read_shape_list(shape_list)?;
    let mut zones: Vec<Zone> = Vec::with_capacity(entries.len());
    for ShapeListEntry { path, colour } in entries {
        let zone = Zone::load(&path, colour)?;
        if zones.iter().any(|z| z.short_name == zone.short_name) {
            return Err(CoverageError::DuplicateZone(zone.short_name));
        }
        zones.push(zone);
    }
    Ok(zones)
}

/// Validity of a zone's records before and after the zero-buffer repair.
pub fn check_validity(zone: &Zone) -> ValidityReport {
    let valid_before = zone.records.iter().all(|r| r.is_valid());
    let valid_after = valid_before
        || zone
            .records
            .iter()
            .enumerate()
            .all(|(k, r)| repair(&zone.short_name, k, r).is_valid());
    let polygons: usize = zone.records.iter().map(|r| r.0.len()).sum();
    ValidityReport {
        short_name: zone.short_name.clone(),
        geometry_type: if polygons == 1 { "Polygon" } else { "MultiPolygon" },
        valid_before,
        valid_after,
    }
}

/// Apply a zero-width buffer once when a record is invalid.
///
/// An empty buffer result keeps the record as read.
fn repair(zone: &str, record_index: usize, record: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if record.is_valid() {
        return record.clone();
    }
    let repaired = record.buffer(0.0);
    if repaired.0.is_empty() {
        warn!(zone, record = record_index, "Zero-buffer repair produced an empty geometry, using the original");
        return record.clone();
    }
    if repaired.is_valid() {
        debug!(zone, record = record_index, "Repaired invalid zone record");
    } else {
        warn!(zone, record = record_index, "Zone record still invalid after zero-buffer repair");
    }
    repaired
}

/// Convert a shapefile record into geo polygons.
///
/// An outer ring starts a new polygon; inner rings become holes of the most
/// recent outer ring.
fn shape_to_multipolygon(shape: Shape) -> Option<MultiPolygon<f64>> {
    let rings: Vec<(bool, LineString<f64>)> = match shape {
        Shape::Polygon(p) => p
            .rings()
            .iter()
            .map(|r| ring_coords(r, |pt| Coord { x: pt.x, y: pt.y }))
            .collect(),
        Shape::PolygonM(p) => p
            .rings()
            .iter()
            .map(|r| ring_coords(r, |pt| Coord { x: pt.x, y: pt.y }))
            .collect(),
        Shape::PolygonZ(p) => p
            .rings()
            .iter()
            .map(|r| ring_coords(r, |pt| Coord { x: pt.x, y: pt.y }))
            .collect(),
        _ => return None,
    };

    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for (outer, ring) in rings {
        match polygons.last_mut() {
            Some((_, holes)) if !outer => holes.push(ring),
            _ => polygons.push((ring, Vec::new())),
        }
    }
    Some(MultiPolygon::new(
        polygons
            .into_iter()
            .map(|(exterior, holes)| Polygon::new(exterior, holes))
            .collect(),
    ))
}

fn ring_coords<P>(ring: &PolygonRing<P>, to_coord: impl Fn(&P) -> Coord<f64>) -> (bool, LineString<f64>) {
    let coords = ring.points().iter().map(to_coord).collect();
    (matches!(ring, PolygonRing::Outer(_)), LineString::new(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]])
    }

    #[test]
    fn test_overlapping_records_are_merged() {
        let zone = Zone::from_records("z", "red", vec![square(0.0, 0.0, 2.0), square(1.0, 0.0, 2.0)]).unwrap();
        assert_eq!(zone.records.len(), 2);
        assert!((zone.geometry.unsigned_area() - 6.0).abs() < 1e-9);
        assert_eq!(zone.bounds, BoundingBox::new(0.0, 0.0, 3.0, 2.0));
    }

    #[test]
    fn test_first_match_wins() {
        let zone = Zone::from_records("z", "red", vec![square(0.0, 0.0, 2.0), square(1.0, 0.0, 2.0)]).unwrap();
        let cell = BoundingBox::new(1.5, 0.5, 2.5, 1.5);
        assert_eq!(zone.first_match(&cell), Some(0));
        let right = BoundingBox::new(2.5, 0.5, 2.9, 1.5);
        assert_eq!(zone.first_match(&right), Some(1));
        assert_eq!(zone.first_match(&BoundingBox::new(5.0, 5.0, 6.0, 6.0)), None);
    }

    #[test]
    fn test_empty_zone_rejected() {
        assert!(matches!(
            Zone::from_records("z", "red", Vec::new()),
            Err(CoverageError::EmptyZone(_))
        ));
    }

    fn bowtie() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ]])
    }

    #[test]
    fn test_self_intersecting_record_is_repaired() {
        assert!(!bowtie().is_valid());
        let zone = Zone::from_records("z", "red", vec![bowtie()]).unwrap();
        assert_eq!(zone.records[0], bowtie());
        assert!(zone.geometry.is_valid());

        // each lobe has area 1
        let area = zone.geometry.unsigned_area();
        assert!(area > 0.0 && area <= 2.0 + 1e-9, "area {area}");

        let f = crate::cover_factor(&BoundingBox::new(0.0, 0.0, 2.0, 2.0), &zone.geometry);
        assert!((f - area / 4.0).abs() < 1e-9, "factor {f}");
    }

    #[test]
    fn test_validity_report_for_bowtie() {
        let zone = Zone::from_records("z", "red", vec![bowtie()]).unwrap();
        let report = check_validity(&zone);
        assert_eq!(report.geometry_type, "Polygon");
        assert!(!report.valid_before);
        assert!(report.valid_after);
    }

    #[test]
    fn test_repair_keeps_record_when_buffer_is_empty() {
        // zero-area spike: nothing survives the buffer
        let spike = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
        ]]);
        assert_eq!(repair("z", 0, &spike), spike);
    }

    #[test]
    fn test_valid_record_is_untouched() {
        let record = square(0.0, 0.0, 1.0);
        assert_eq!(repair("z", 0, &record), record);
    }

    #[test]
    fn test_validity_report_for_valid_square() {
        let zone = Zone::from_records("z", "red", vec![square(0.0, 0.0, 1.0)]).unwrap();
        let report = check_validity(&zone);
        assert_eq!(report.geometry_type, "Polygon");
        assert!(report.valid_before && report.valid_after);
    }
}
