//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Used when the device location does not arrive in time (New York City).
    pub const DEFAULT_FALLBACK: Self = Self {
        lat: 40.7128,
        lng: -74.0060,
    };

    /// Create a coordinate.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Distance to `other` in miles. See [`distance_miles`].
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance_miles(*self, *other)
    }
}

/// Haversine distance between two coordinates, in miles.
///
/// Symmetric, never negative, and exactly `0.0` for identical inputs.
/// A NaN component yields NaN; callers must not compare it as a distance.
#[must_use]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero() {
        let p = Coordinate::new(40.7128, -74.0060);
        assert!(distance_miles(p, p) == 0.0);
        assert!(distance_miles(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0)) == 0.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            (Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)),
            (Coordinate::new(40.7128, -74.0060), Coordinate::new(34.0522, -118.2437)),
            (Coordinate::new(-33.87, 151.21), Coordinate::new(51.5074, -0.1278)),
        ];
        for (a, b) in pairs {
            assert!((distance_miles(a, b) - distance_miles(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_known_distance_new_york_to_los_angeles() {
        let nyc = Coordinate::new(40.7128, -74.0060);
        let la = Coordinate::new(34.0522, -118.2437);
        let d = distance_miles(nyc, la);
        assert!((d - 2445.0).abs() < 15.0, "expected ~2445 miles, got {d}");
    }

    #[test]
    fn test_one_degree_diagonal_at_equator() {
        let d = distance_miles(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0));
        assert!((d - 97.7).abs() < 0.5, "got {d}");
    }

    #[test]
    fn test_monotonic_with_separation() {
        let origin = Coordinate::new(10.0, 20.0);
        let mut last = 0.0;
        for step in 1..=18 {
            let d = distance_miles(origin, Coordinate::new(10.0 + f64::from(step) * 0.5, 20.0));
            assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn test_nan_propagates() {
        let d = distance_miles(Coordinate::new(f64::NAN, 0.0), Coordinate::new(1.0, 1.0));
        assert!(d.is_nan());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_finite());
    }
}
