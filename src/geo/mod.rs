//! Geodesy utilities: canonical coordinates and great-circle distance.
//!
//! Everything downstream of this module works in (lat, lng) order. Wire
//! formats that encode (lng, lat) are flipped at the boundary, never inside.

pub mod normalize;

pub use normalize::{normalize_coordinate, CoordinateError};

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers for the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// A geographic coordinate in canonical (lat, lng) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, in [-90, 90]
    pub lat: f64,
    /// Longitude in degrees, in [-180, 180]
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate from (lat, lng) degrees.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and within valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// The coordinate as a (lng, lat) pair, the order directions providers
    /// and GeoJSON geometries use.
    pub fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlng = (dlng / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Format a kilometer value with one-decimal precision, e.g. "6.2 km".
pub fn format_km(km: f64) -> String {
    format!("{:.1} km", km)
}

/// Format a meter value as whole meters, e.g. "150 m".
pub fn format_m(meters: f64) -> String {
    format!("{} m", meters.round() as i64)
}

/// Format a duration in whole minutes, e.g. "9 min".
pub fn format_minutes(minutes: u32) -> String {
    format!("{} min", minutes)
}

/// Round kilometers to one decimal, the display precision used everywhere.
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_identity() {
        let a = Coordinate::new(19.4326, -99.1332);
        assert_eq!(haversine_distance_km(a, a), 0.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = Coordinate::new(19.4326, -99.1332);
        let b = Coordinate::new(19.45, -99.12);
        let ab = haversine_distance_km(a, b);
        let ba = haversine_distance_km(b, a);
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_haversine_known_value() {
        // Centro histórico CDMX to a point ~2.5 km northeast
        let a = Coordinate::new(19.4326, -99.1332);
        let b = Coordinate::new(19.45, -99.12);
        let d = haversine_distance_km(a, b);
        assert!(d > 2.0 && d < 3.0, "expected ~2.4 km, got {}", d);
    }

    #[test]
    fn test_validity_ranges() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(95.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -200.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_lng_lat_order() {
        let c = Coordinate::new(19.85, -97.36);
        assert_eq!(c.to_lng_lat(), [-97.36, 19.85]);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_km(6.2), "6.2 km");
        assert_eq!(format_m(149.6), "150 m");
        assert_eq!(format_minutes(9), "9 min");
        assert_eq!(round_km(6.24), 6.2);
        assert_eq!(round_km(6.25), 6.3);
    }
}
