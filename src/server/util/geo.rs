//! Geodesic distance between coordinates.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds coordinates from optional columns, `None` unless both are set.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Some(Self::new(latitude?, longitude?))
    }
}

/// Great-circle distance in kilometres using the haversine formula.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        let p = Coordinates::new(10.7743, 106.7038);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    /// Tests a known city-to-city distance.
    ///
    /// Expected: Ho Chi Minh City to Hanoi is roughly 1 140 km
    #[test]
    fn measures_known_distance() {
        let hcmc = Coordinates::new(10.8231, 106.6297);
        let hanoi = Coordinates::new(21.0278, 105.8342);
        let distance = haversine_km(hcmc, hanoi);
        assert!((1130.0..1150.0).contains(&distance), "got {}", distance);
    }

    #[test]
    fn is_symmetric() {
        let a = Coordinates::new(10.7743, 106.7038);
        let b = Coordinates::new(10.7626, 106.6602);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn requires_both_parts() {
        assert!(Coordinates::from_parts(Some(1.0), None).is_none());
        assert_eq!(
            Coordinates::from_parts(Some(1.0), Some(2.0)),
            Some(Coordinates::new(1.0, 2.0))
        );
    }
}
