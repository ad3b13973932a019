//! Covering factor: the fraction of a grid cell covered by a zone.
//!
//! Every ring of the zone is clipped against the axis-aligned cell
//! (Sutherland-Hodgman) and the clipped areas are combined as exterior minus
//! holes. Areas are planar, in the units of the shared CRS.
//!
//! Clipping against an axis-aligned box keeps full `f64` precision.
//! `geo::BooleanOps` snaps coordinates to an integer grid first and drifts by
//! up to ~1e-8 on a unit cell.

use geo::{Coord, LineString, MultiPolygon, Polygon};

use name_common::BoundingBox;

/// Tolerance below which factors outside `[0, 1]` are treated as rounding noise.
const NOISE: f64 = 1e-12;

/// `area(cell ∩ zone) / area(cell)`, in `[0, 1]`.
pub fn cover_factor(cell: &BoundingBox, zone: &MultiPolygon<f64>) -> f64 {
    let cell_area = cell.area();
    if cell_area <= 0.0 {
        return 0.0;
    }
    clamp_noise(intersection_area(cell, zone) / cell_area)
}

/// Area of `cell ∩ zone`.
pub fn intersection_area(cell: &BoundingBox, zone: &MultiPolygon<f64>) -> f64 {
    zone.iter().map(|poly| polygon_area_in(cell, poly)).sum()
}

fn polygon_area_in(cell: &BoundingBox, poly: &Polygon<f64>) -> f64 {
    let outer = clipped_ring_area(cell, poly.exterior());
    if outer == 0.0 {
        return 0.0;
    }
    let holes: f64 = poly
        .interiors()
        .iter()
        .map(|ring| clipped_ring_area(cell, ring))
        .sum();
    (outer - holes).max(0.0)
}

fn clamp_noise(factor: f64) -> f64 {
    if factor < 0.0 && factor > -NOISE {
        0.0
    } else if factor > 1.0 && factor < 1.0 + NOISE {
        1.0
    } else {
        factor
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Left(f64),
    Right(f64),
    Bottom(f64),
    Top(f64),
}

impl Edge {
    fn inside(self, c: Coord<f64>) -> bool {
        match self {
            Edge::Left(x) => c.x >= x,
            Edge::Right(x) => c.x <= x,
            Edge::Bottom(y) => c.y >= y,
            Edge::Top(y) => c.y <= y,
        }
    }

    /// Crossing of segment `p -> q` with this edge; `p` and `q` lie on
    /// opposite sides.
    fn crossing(self, p: Coord<f64>, q: Coord<f64>) -> Coord<f64> {
        match self {
            Edge::Left(x) | Edge::Right(x) => {
                let t = (x - p.x) / (q.x - p.x);
                Coord {
                    x,
                    y: p.y + t * (q.y - p.y),
                }
            }
            Edge::Bottom(y) | Edge::Top(y) => {
                let t = (y - p.y) / (q.y - p.y);
                Coord {
                    x: p.x + t * (q.x - p.x),
                    y,
                }
            }
        }
    }
}

/// Absolute area of `ring` clipped to `cell`.
fn clipped_ring_area(cell: &BoundingBox, ring: &LineString<f64>) -> f64 {
    let mut points: Vec<Coord<f64>> = ring.0.clone();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return 0.0;
    }

    let ring_box = ring_bounds(&points);
    if !ring_box.intersects(cell) {
        return 0.0;
    }
    // ring entirely inside the cell: nothing to clip
    if ring_box.min_x >= cell.min_x
        && ring_box.max_x <= cell.max_x
        && ring_box.min_y >= cell.min_y
        && ring_box.max_y <= cell.max_y
    {
        return shoelace(&points).abs();
    }

    for edge in [
        Edge::Left(cell.min_x),
        Edge::Right(cell.max_x),
        Edge::Bottom(cell.min_y),
        Edge::Top(cell.max_y),
    ] {
        points = clip(&points, edge);
        if points.len() < 3 {
            return 0.0;
        }
    }
    shoelace(&points).abs()
}

fn clip(points: &[Coord<f64>], edge: Edge) -> Vec<Coord<f64>> {
    let mut out = Vec::with_capacity(points.len() + 4);
    let Some(&last) = points.last() else {
        return out;
    };
    let mut prev = last;
    for &cur in points {
        match (edge.inside(prev), edge.inside(cur)) {
            (true, true) => out.push(cur),
            (true, false) => out.push(edge.crossing(prev, cur)),
            (false, true) => {
                out.push(edge.crossing(prev, cur));
                out.push(cur);
            }
            (false, false) => {}
        }
        prev = cur;
    }
    out
}

fn shoelace(points: &[Coord<f64>]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|k| {
            let a = points[k];
            let b = points[(k + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice / 2.0
}

fn ring_bounds(points: &[Coord<f64>]) -> BoundingBox {
    points.iter().fold(
        BoundingBox::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |b, c| BoundingBox::new(b.min_x.min(c.x), b.min_y.min(c.y), b.max_x.max(c.x), b.max_y.max(c.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn unit_cell() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn test_disjoint_zone_is_zero() {
        let zone = MultiPolygon::new(vec![polygon![
            (x: 2.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 3.0), (x: 2.0, y: 3.0),
        ]]);
        assert_eq!(cover_factor(&unit_cell(), &zone), 0.0);
    }

    #[test]
    fn test_containing_zone_is_one() {
        let zone = MultiPolygon::new(vec![polygon![
            (x: -5.0, y: -3.0), (x: 4.0, y: -6.0), (x: 7.0, y: 5.0), (x: -2.0, y: 6.0),
        ]]);
        let f = cover_factor(&unit_cell(), &zone);
        assert!((f - 1.0).abs() < 1e-9, "factor {f}");
    }

    #[test]
    fn test_half_cell_triangle() {
        let zone = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0),
        ]]);
        assert!((cover_factor(&unit_cell(), &zone) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hole_is_subtracted() {
        let zone = MultiPolygon::new(vec![polygon!(
            exterior: [(x: -1.0, y: -1.0), (x: 2.0, y: -1.0), (x: 2.0, y: 2.0), (x: -1.0, y: 2.0)],
            interiors: [[(x: 0.0, y: 0.0), (x: 0.5, y: 0.0), (x: 0.5, y: 0.5), (x: 0.0, y: 0.5)]],
        )]);
        assert!((cover_factor(&unit_cell(), &zone) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_small_zone_inside_cell() {
        let tri = polygon![(x: 0.25, y: 0.25), (x: 0.75, y: 0.25), (x: 0.5, y: 0.75)];
        let expected = tri.unsigned_area();
        let zone = MultiPolygon::new(vec![tri]);
        assert!((intersection_area(&unit_cell(), &zone) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_split_zone_is_additive() {
        let cell = BoundingBox::new(0.3, 0.1, 1.7, 0.9);
        let whole = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 1.0, y: 1.0)];
        let left = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        let right = polygon![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0), (x: 1.0, y: 1.0)];

        let whole = cover_factor(&cell, &MultiPolygon::new(vec![whole]));
        let parts = cover_factor(&cell, &MultiPolygon::new(vec![left.clone()]))
            + cover_factor(&cell, &MultiPolygon::new(vec![right.clone()]));
        let multi = cover_factor(&cell, &MultiPolygon::new(vec![left, right]));
        assert!((whole - parts).abs() < 1e-12);
        assert!((whole - multi).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_cell() {
        let zone = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0),
        ]]);
        assert_eq!(cover_factor(&BoundingBox::new(0.5, 0.5, 0.5, 0.6), &zone), 0.0);
    }

    fn c_shape() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 3.0, y: 1.0), (x: 1.0, y: 1.0),
            (x: 1.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 3.0), (x: 0.0, y: 3.0),
        ]])
    }

    #[test]
    fn test_concave_zone_exact() {
        // notch removes x 1..1.5, y 1..1.5
        let cell = BoundingBox::new(0.5, 0.5, 1.5, 1.5);
        assert!((cover_factor(&cell, &c_shape()) - 0.75).abs() < 1e-12);
        let arm = BoundingBox::new(1.25, 2.25, 2.75, 2.75);
        assert!((cover_factor(&arm, &c_shape()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_concave_zone_matches_boolean_ops() {
        use geo::BooleanOps;

        let zone = c_shape();
        for k in 0..50 {
            let x = -0.5 + 0.07 * k as f64;
            for y in [-0.3, 0.6, 1.45, 2.2] {
                let cell = BoundingBox::new(x, y, x + 0.8, y + 0.8);
                let reference =
                    zone.intersection(&cell.to_rect().to_polygon()).unsigned_area() / cell.area();
                let f = cover_factor(&cell, &zone);
                assert!((0.0..=1.0).contains(&f));
                assert!((f - reference).abs() < 1e-6, "cell {cell:?}: {f} vs {reference}");
            }
        }
    }

    #[test]
    fn test_clamp_noise() {
        assert_eq!(clamp_noise(1.0 + 1e-14), 1.0);
        assert_eq!(clamp_noise(-1e-14), 0.0);
        assert_eq!(clamp_noise(0.3), 0.3);
    }
}
