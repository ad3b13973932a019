//! Spherical Mercator on the WGS84 semi-major axis (EPSG:3857).

use std::f64::consts::PI;

pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the projected world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Degrees to metres. Latitudes are clamped to [`MAX_LATITUDE`].
pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Metres to degrees.
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_WORLD: f64 = 20_037_508.342_789_244;

    #[test]
    fn test_origin_and_antimeridian() {
        let (x, y) = forward(0.0, 0.0);
        assert!(x.abs() < 1e-9 && y.abs() < 1e-6);
        let (x, _) = forward(180.0, 0.0);
        assert!((x - HALF_WORLD).abs() < 1e-6);
    }

    #[test]
    fn test_square_world() {
        let (_, y) = forward(0.0, MAX_LATITUDE);
        assert!((y - HALF_WORLD).abs() < 1e-3);
        assert_eq!(forward(0.0, 89.9), forward(0.0, MAX_LATITUDE));
    }

    #[test]
    fn test_round_trip() {
        for &(lon, lat) in &[(-9.9, 53.3), (0.0, 51.5), (179.0, -60.0)] {
            let (x, y) = forward(lon, lat);
            let (lon2, lat2) = inverse(x, y);
            assert!((lon - lon2).abs() < 1e-9 && (lat - lat2).abs() < 1e-9);
        }
    }
}
