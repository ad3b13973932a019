//! Bounding box types and operations.

use geo::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::error::CommonError;

/// An axis-aligned bounding box in the coordinates of the working CRS.
///
/// For geographic CRS (EPSG:4326) coordinates are longitude/latitude degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build from separate `(min, max)` longitude and latitude ranges.
    pub fn from_ranges(lon: (f64, f64), lat: (f64, f64)) -> Self {
        Self::new(
            lon.0.min(lon.1),
            lat.0.min(lat.1),
            lon.0.max(lon.1),
            lat.0.max(lat.1),
        )
    }

    /// Parse a `"min,max"` pair, as used by the plotting options.
    pub fn parse_range(s: &str) -> Result<(f64, f64), CommonError> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| CommonError::InvalidBounds(s.to_string()))?;
        let min = a
            .trim()
            .parse::<f64>()
            .map_err(|_| CommonError::InvalidBounds(s.to_string()))?;
        let max = b
            .trim()
            .parse::<f64>()
            .map_err(|_| CommonError::InvalidBounds(s.to_string()))?;
        Ok((min, max))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this bbox overlaps another.
    ///
    /// Touching edges count as overlap so that cells sharing a border with a
    /// zone are still handed to the exact intersection step.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Smallest box covering both inputs.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        BoundingBox::new(min.x, min.y, max.x, max.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        let (min, max) = BoundingBox::parse_range(" -30.5, 45 ").unwrap();
        assert_eq!(min, -30.5);
        assert_eq!(max, 45.0);
        assert!(BoundingBox::parse_range("10").is_err());
        assert!(BoundingBox::parse_range("a,b").is_err());
    }

    #[test]
    fn test_intersection() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let intersection = a.intersection(&b).unwrap();
        assert_eq!(intersection, BoundingBox::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.0, 0.0, 2.0, 1.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_rect_conversion() {
        let bbox = BoundingBox::new(-1.0, -2.0, 3.0, 4.0);
        assert_eq!(BoundingBox::from(bbox.to_rect()), bbox);
        assert_eq!(bbox.area(), 24.0);
    }
}
