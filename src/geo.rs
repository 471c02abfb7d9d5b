//! Great-circle distance utility shared by both engines
//!
//! Pure and stateless; safe to call concurrently from the autocomplete and
//! discovery pipelines.

use crate::models::Coordinate;

/// Great-circle distance in kilometers between two (latitude, longitude)
/// pairs in degrees, using the haversine formula with Earth radius 6371 km
#[must_use]
pub fn point_distance_km(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: from_lat,
            longitude: from_lon,
        },
        haversine::Location {
            latitude: to_lat,
            longitude: to_lon,
        },
        haversine::Units::Kilometers,
    )
}

/// Distance in kilometers between two coordinates
#[must_use]
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    point_distance_km(from.latitude, from.longitude, to.latitude, to.longitude)
}
