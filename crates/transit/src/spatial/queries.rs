//! Spatial query utilities for distance and bearing calculations.
//!
//! Uses Haversine formula for accurate distances on Earth's surface.

use geo::{HaversineBearing, HaversineDistance, Point};

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

/// Initial great-circle bearing from `from` to `to`, in degrees [0, 360).
///
/// North is 0, east is 90. Identical points yield 0.
pub fn initial_bearing(from: Point, to: Point) -> f64 {
    if from == to {
        return 0.0;
    }
    normalize_degrees(from.haversine_bearing(to))
}

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Convert meters to degrees at equator (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / 111_320.0
}

/// Degree radius guaranteed to cover `meters` around a point at `lat`.
///
/// Longitude degrees shrink towards the poles, so the east-west extent is the
/// wider of the two.
pub fn search_radius_degrees(meters: f64, lat: f64) -> f64 {
    let cos_lat = lat.to_radians().cos().abs().max(0.01);
    meters_to_degrees_approx(meters) / cos_lat
}
