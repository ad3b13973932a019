//! Shapefile reprojection.

use name_common::{shortname, Crs};
use shapefile::{Point, Polygon, PolygonRing, Shape, ShapeReader, ShapeWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ProjectionError, Result};
use crate::projection::Projection;

/// Projection of a shapefile, read from its `.prj` sidecar.
///
/// A shapefile without a `.prj` is taken to be WGS84.
pub fn source_projection(shp: &Path) -> Result<Projection> {
    match Crs::from_shapefile(shp) {
        Some(crs) => Projection::from_crs(&crs),
        None => {
            warn!(path = %shp.display(), "No .prj file, assuming EPSG:4326");
            Ok(Projection::Geographic)
        }
    }
}

/// Output path for `shp` reprojected to `target`: `<stem>_EPSG<code>.shp`.
pub fn output_path(shp: &Path, target: Projection, outdir: &Path) -> PathBuf {
    outdir.join(format!("{}_EPSG{}.shp", shortname(shp), target.epsg()))
}

/// Reproject every polygon record of `shp` into `target` and write the
/// result to `outdir`, with a `.prj` and a copy of the attribute table.
pub fn reproject_shapefile(shp: &Path, target: Projection, outdir: &Path) -> Result<PathBuf> {
    if !shp.is_file() {
        return Err(ProjectionError::NotFound(shp.to_path_buf()));
    }
    let source = source_projection(shp)?;
    let shapes = ShapeReader::from_path(shp)
        .and_then(|reader| reader.read())
        .map_err(|e| ProjectionError::Shapefile {
            path: shp.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut polygons = Vec::with_capacity(shapes.len());
    for (index, shape) in shapes.into_iter().enumerate() {
        let rings = polygon_rings(shape).ok_or_else(|| ProjectionError::NotPolygon {
            path: shp.to_path_buf(),
            index,
        })?;
        let rings = rings
            .into_iter()
            .map(|(outer, points)| {
                let points = points
                    .into_iter()
                    .map(|(x, y)| {
                        let (x, y) = source.transform(target, x, y);
                        Point::new(x, y)
                    })
                    .collect();
                if outer {
                    PolygonRing::Outer(points)
                } else {
                    PolygonRing::Inner(points)
                }
            })
            .collect();
        polygons.push(Polygon::with_rings(rings));
    }

    std::fs::create_dir_all(outdir)?;
    let out = output_path(shp, target, outdir);
    let writer = ShapeWriter::from_path(&out).map_err(|e| ProjectionError::Shapefile {
        path: out.clone(),
        message: e.to_string(),
    })?;
    writer
        .write_shapes(&polygons)
        .map_err(|e| ProjectionError::Shapefile {
            path: out.clone(),
            message: e.to_string(),
        })?;
    std::fs::write(out.with_extension("prj"), target.wkt())?;

    let dbf = shp.with_extension("dbf");
    if dbf.is_file() {
        std::fs::copy(&dbf, out.with_extension("dbf"))?;
    } else {
        debug!(path = %dbf.display(), "No attribute table to copy");
    }

    info!(
        source = source.epsg(),
        target = target.epsg(),
        records = polygons.len(),
        output = %out.display(),
        "Reprojected shapefile"
    );
    Ok(out)
}

/// Rings of a polygon record as `(is_outer, points)`.
fn polygon_rings(shape: Shape) -> Option<Vec<(bool, Vec<(f64, f64)>)>> {
    type Rings = Vec<(bool, Vec<(f64, f64)>)>;
    fn collect<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> (f64, f64)) -> Rings {
        rings
            .iter()
            .map(|ring| {
                let outer = matches!(ring, PolygonRing::Outer(_));
                (outer, ring.points().iter().map(&xy).collect())
            })
            .collect()
    }
    match shape {
        Shape::Polygon(p) => Some(collect(p.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonM(p) => Some(collect(p.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonZ(p) => Some(collect(p.rings(), |pt| (pt.x, pt.y))),
        _ => None,
    }
}
