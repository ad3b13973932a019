//! Zone fixtures: polygon shapefiles and shape-list files.

use shapefile::{Point, Polygon, PolygonRing, ShapeWriter};
use std::path::{Path, PathBuf};

/// Write a polygon shapefile with one record per ring list.
///
/// Each record is a list of rings; the first ring is the outer boundary and
/// any further rings are holes.
pub fn write_zone(dir: &Path, name: &str, records: &[Vec<Vec<(f64, f64)>>]) -> PathBuf {
    let path = dir.join(format!("{name}.shp"));
    let shapes: Vec<Polygon> = records
        .iter()
        .map(|rings| {
            let rings = rings
                .iter()
                .enumerate()
                .map(|(k, ring)| {
                    let points = ring.iter().map(|&(x, y)| Point::new(x, y)).collect();
                    if k == 0 {
                        PolygonRing::Outer(points)
                    } else {
                        PolygonRing::Inner(points)
                    }
                })
                .collect();
            Polygon::with_rings(rings)
        })
        .collect();

    let writer = ShapeWriter::from_path(&path).expect("failed to create shapefile");
    writer
        .write_shapes(&shapes)
        .expect("failed to write shapefile");
    path
}

/// Write a shapefile holding axis-aligned rectangles, one record each.
pub fn write_rect_zone(dir: &Path, name: &str, rects: &[(f64, f64, f64, f64)]) -> PathBuf {
    let records: Vec<Vec<Vec<(f64, f64)>>> = rects
        .iter()
        .map(|&(x0, y0, x1, y1)| vec![vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]])
        .collect();
    write_zone(dir, name, &records)
}

/// Write a shape list (`path,colour` per line) and return its path.
pub fn write_shape_list(dir: &Path, entries: &[(&Path, &str)]) -> PathBuf {
    let path = dir.join("shapes.txt");
    let mut text = String::new();
    for (shp, colour) in entries {
        text.push_str(&format!("{} , {}\n", shp.display(), colour));
    }
    std::fs::write(&path, text).expect("failed to write shape list");
    path
}
