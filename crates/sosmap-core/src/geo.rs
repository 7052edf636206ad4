//! Great-circle distance, distance-ranked views, and the geolocation
//! capability contract.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spherical Earth radius in kilometres. The spherical approximation is an
/// accepted precision tradeoff over the WGS84 ellipsoid at city scale.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

/// Anything with a coordinate; ranking is generic over this.
pub trait Located {
    fn coord(&self) -> Coord;
}

/// An item annotated with its distance from some origin. The item itself
/// is untouched.
#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Haversine great-circle distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Renders a distance for display: whole metres under 1 km (`"350m"`),
/// otherwise one decimal place (`"1.2km"`).
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round())
    } else {
        format!("{km:.1}km")
    }
}

/// Annotates each item with its distance from `origin` and sorts ascending.
///
/// `Vec::sort_by` is stable, so items at equal distance keep their input
/// order.
#[must_use]
pub fn sort_by_distance<T: Located>(items: Vec<T>, origin: Coord) -> Vec<Ranked<T>> {
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let at = item.coord();
            Ranked {
                distance_km: haversine_km(origin.lat, origin.lng, at.lat, at.lng),
                item,
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

/// Retains items within `radius_km` of `origin`. The boundary is inclusive:
/// an item at exactly `radius_km` stays.
#[must_use]
pub fn filter_by_radius<T: Located>(items: Vec<T>, origin: Coord, radius_km: f64) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let at = item.coord();
            haversine_km(origin.lat, origin.lng, at.lat, at.lng) <= radius_km
        })
        .collect()
}

/// Why a geolocation request failed. Retry and fallback policy belong to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("position unavailable")]
    PositionUnavailable,
}

/// Parameters for a one-shot position fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Maximum acceptable age of a cached fix. Zero means a fresh fix only.
    pub maximum_age: Duration,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(5),
            maximum_age: Duration::ZERO,
        }
    }
}

/// The platform geolocation capability.
///
/// A request resolves or fails exactly once; the implementation owns the
/// timeout. There is no cancellation primitive beyond the timeout.
pub trait LocationProvider {
    fn current_location(
        &self,
        request: LocationRequest,
    ) -> impl Future<Output = Result<Coord, LocationError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY_HALL: Coord = Coord {
        lat: 37.5665,
        lng: 126.9780,
    };

    #[derive(Debug, Clone)]
    struct Point {
        lat: f64,
        lng: f64,
        label: &'static str,
    }

    impl Located for Point {
        fn coord(&self) -> Coord {
            Coord {
                lat: self.lat,
                lng: self.lng,
            }
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let d = haversine_km(CITY_HALL.lat, CITY_HALL.lng, CITY_HALL.lat, CITY_HALL.lng);
        assert!(d.abs() < f64::EPSILON, "expected 0, got {d}");
    }

    #[test]
    fn distance_seoul_regression() {
        // City hall to a point ~0.77 km northeast.
        let d = haversine_km(37.5665, 126.9780, 37.5700, 126.9850);
        assert!((d - 0.77).abs() < 0.05, "expected ~0.77 km, got {d}");
    }

    #[test]
    fn format_sub_kilometre_as_metres() {
        assert_eq!(format_distance(0.35), "350m");
        assert_eq!(format_distance(0.0), "0m");
    }

    #[test]
    fn format_kilometres_with_one_decimal() {
        assert_eq!(format_distance(1.0), "1.0km");
        assert_eq!(format_distance(12.34), "12.3km");
    }

    #[test]
    fn sort_orders_by_ascending_distance() {
        // Offsets chosen so the points sit roughly 5, 1, and 3 km north.
        let points = vec![
            Point {
                lat: CITY_HALL.lat + 0.045,
                lng: CITY_HALL.lng,
                label: "far",
            },
            Point {
                lat: CITY_HALL.lat + 0.009,
                lng: CITY_HALL.lng,
                label: "near",
            },
            Point {
                lat: CITY_HALL.lat + 0.027,
                lng: CITY_HALL.lng,
                label: "mid",
            },
        ];

        let ranked = sort_by_distance(points, CITY_HALL);
        let order: Vec<&str> = ranked.iter().map(|r| r.item.label).collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
        assert!(ranked[0].distance_km < ranked[1].distance_km);
        assert!(ranked[1].distance_km < ranked[2].distance_km);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let point = Point {
            lat: CITY_HALL.lat + 0.009,
            lng: CITY_HALL.lng,
            label: "edge",
        };
        let exact = haversine_km(CITY_HALL.lat, CITY_HALL.lng, point.lat, point.lng);

        let kept = filter_by_radius(vec![point.clone()], CITY_HALL, exact);
        assert_eq!(kept.len(), 1);

        let dropped = filter_by_radius(vec![point], CITY_HALL, exact - 0.001);
        assert!(dropped.is_empty());
    }

    #[test]
    fn location_request_defaults_match_capability_contract() {
        let request = LocationRequest::default();
        assert!(request.high_accuracy);
        assert_eq!(request.timeout, Duration::from_secs(5));
        assert_eq!(request.maximum_age, Duration::ZERO);
    }
}
