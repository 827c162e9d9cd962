//! Core data models for route planning.

use serde::{Deserialize, Serialize};

use crate::spatial::haversine_distance;

/// A single point along a planned or flown route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude_ft: f64,
}

impl PathPoint {
    pub fn new(lat: f64, lon: f64, altitude_ft: f64) -> Self {
        Self {
            lat,
            lon,
            altitude_ft,
        }
    }
}

/// A restricted airspace volume the planner must route around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictedZone {
    pub id: String,
    pub name: String,
    /// Polygon vertices as [lat, lon] pairs (closed ring - first == last)
    pub polygon: Vec<[f64; 2]>,
    /// Lower altitude limit in feet (floor)
    pub min_altitude_ft: f64,
    /// Upper altitude limit in feet (ceiling)
    pub max_altitude_ft: f64,
    /// Whether the zone is currently enforced
    pub active: bool,
}

impl RestrictedZone {
    /// Validate zone configuration.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.polygon.len() < 3 {
            errors.push("Polygon must have at least 3 vertices".to_string());
        }

        if self.polygon.len() >= 3 {
            let first = self.polygon[0];
            let last = self.polygon[self.polygon.len() - 1];
            if (first[0] - last[0]).abs() > 0.0001 || (first[1] - last[1]).abs() > 0.0001 {
                errors.push("Polygon must be closed (first vertex must equal last)".to_string());
            }
        }

        if self.min_altitude_ft >= self.max_altitude_ft {
            errors.push(format!(
                "Floor altitude ({}) must be below ceiling altitude ({})",
                self.min_altitude_ft, self.max_altitude_ft
            ));
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Whether the zone restricts flight at the given cruise altitude.
    pub fn applies_at_altitude(&self, altitude_ft: f64) -> bool {
        altitude_ft >= self.min_altitude_ft && altitude_ft <= self.max_altitude_ft
    }
}

/// An ordered route produced by the planner.
///
/// An empty route is the normal "no path exists" result, not an error;
/// callers must check [`Route::is_blocked`] before committing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<PathPoint>,
    pub total_distance_m: f64,
}

impl Route {
    /// The empty, zero-distance route signalling "no path found".
    pub fn blocked() -> Self {
        Self {
            points: Vec::new(),
            total_distance_m: 0.0,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.points.is_empty()
    }

    /// Build a route from ordered points, computing the summed
    /// consecutive haversine length.
    pub fn from_points(points: Vec<PathPoint>) -> Self {
        let total_distance_m = points
            .windows(2)
            .map(|pair| haversine_distance(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
            .sum();
        Self {
            points,
            total_distance_m,
        }
    }
}

/// Route planning request as received from the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub altitude_ft: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_zone() -> RestrictedZone {
        RestrictedZone {
            id: "z1".to_string(),
            name: "Test Zone".to_string(),
            polygon: vec![
                [31.80, 34.64],
                [31.80, 34.66],
                [31.82, 34.66],
                [31.82, 34.64],
                [31.80, 34.64],
            ],
            min_altitude_ft: 0.0,
            max_altitude_ft: 5000.0,
            active: true,
        }
    }

    #[test]
    fn valid_zone_passes_validation() {
        assert!(square_zone().is_valid());
    }

    #[test]
    fn open_ring_fails_validation() {
        let mut zone = square_zone();
        zone.polygon.pop();
        assert!(!zone.is_valid());
    }

    #[test]
    fn inverted_altitude_band_fails_validation() {
        let mut zone = square_zone();
        zone.min_altitude_ft = 6000.0;
        assert!(!zone.is_valid());
    }

    #[test]
    fn altitude_band_filter() {
        let zone = square_zone();
        assert!(zone.applies_at_altitude(2500.0));
        assert!(!zone.applies_at_altitude(9000.0));
    }

    #[test]
    fn route_distance_sums_legs() {
        let route = Route::from_points(vec![
            PathPoint::new(31.80, 34.64, 3000.0),
            PathPoint::new(31.85, 34.64, 3000.0),
            PathPoint::new(31.85, 34.70, 3000.0),
        ]);
        let expected = haversine_distance(31.80, 34.64, 31.85, 34.64)
            + haversine_distance(31.85, 34.64, 31.85, 34.70);
        assert!((route.total_distance_m - expected).abs() < 1e-6);
        assert!(!route.is_blocked());
    }

    #[test]
    fn blocked_route_is_empty_and_zero() {
        let route = Route::blocked();
        assert!(route.is_blocked());
        assert_eq!(route.total_distance_m, 0.0);
    }

    #[test]
    fn zone_round_trips_through_json() {
        let zone = square_zone();
        let json = serde_json::to_string(&zone).unwrap();
        let back: RestrictedZone = serde_json::from_str(&json).unwrap();
        assert_eq!(back.polygon.len(), zone.polygon.len());
        assert!(back.active);
    }
}
