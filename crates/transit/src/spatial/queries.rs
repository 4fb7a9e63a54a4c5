//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula for distances on Earth's surface.

use geo::{ClosestPoint, HaversineBearing, HaversineIntermediate, Line, LineString, Point};

/// Mean Earth radius used by every distance in the engine
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres
pub fn haversine_km(p1: Point, p2: Point) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (p2.x() - p1.x()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance between two points in metres
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    haversine_km(p1, p2) * 1000.0
}

/// Initial bearing from `from` to `to`, in degrees clockwise from north within [0, 360)
pub fn bearing_degrees(from: Point, to: Point) -> f64 {
    from.haversine_bearing(to).rem_euclid(360.0)
}

/// Point a fraction `f` of the way along the great circle from `from` to `to`
pub fn intermediate_point(from: Point, to: Point, f: f64) -> Point {
    if f <= 0.0 {
        return from;
    }
    if f >= 1.0 {
        return to;
    }
    from.haversine_intermediate(&to, f)
}

/// Calculate distance from point to line segment in kilometres
pub fn haversine_km_to_line(point: Point, line: Line) -> f64 {
    // Convert line to LineString for ClosestPoint trait
    let line_string = LineString::from(vec![line.start, line.end]);

    match line_string.closest_point(&point) {
        geo::Closest::Intersection(p) | geo::Closest::SinglePoint(p) => haversine_km(point, p),
        geo::Closest::Indeterminate => f64::INFINITY,
    }
}

/// Kilometres per degree of latitude (and of longitude at the equator)
const KM_PER_DEGREE: f64 = 111.32;

/// Degree radius that covers `radius_km` around `latitude` on both axes.
///
/// Longitude degrees shrink towards the poles, so the longitude span is the
/// larger one and bounds the search circle in degree space.
pub fn km_to_degrees_envelope(radius_km: f64, latitude: f64) -> f64 {
    let cos_lat = latitude.to_radians().cos().abs().max(0.01);
    radius_km / (KM_PER_DEGREE * cos_lat) * 1.05
}
