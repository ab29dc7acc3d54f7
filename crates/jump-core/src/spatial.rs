//! Great-circle geodesy used to project planning results onto the map.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Point reached after travelling `distance_m` along `bearing_deg`.
    pub fn destination(&self, distance_m: f64, bearing_deg: f64) -> GeoPoint {
        destination_point(self.lat, self.lng, distance_m, bearing_deg)
    }

    /// Initial bearing from this point towards `other`, in [0, 360).
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing_deg(self.lat, self.lng, other.lat, other.lng)
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.lat, self.lng, other.lat, other.lng)
    }

    pub fn is_valid(&self) -> bool {
        is_valid_lat_lng(self.lat, self.lng)
    }
}

/// Great-circle distance between two positions in meters.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lng2 - lng1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial great-circle bearing from point 1 to point 2.
///
/// # Returns
/// Bearing in degrees, normalized to [0, 360).
pub fn bearing_deg(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_angle(x.atan2(y).to_degrees())
}

/// Project a position by distance and bearing on a spherical earth.
///
/// # Arguments
/// * `lat`, `lng` - Origin in degrees
/// * `distance_m` - Distance to travel in meters
/// * `bearing_deg` - Bearing in degrees clockwise from true north
///
/// # Returns
/// The destination, with longitude normalized to [-180, 180].
pub fn destination_point(lat: f64, lng: f64, distance_m: f64, bearing_deg: f64) -> GeoPoint {
    if distance_m.abs() <= f64::EPSILON {
        return GeoPoint::new(lat, lng);
    }

    let lat1 = lat.to_radians();
    let lng1 = lng.to_radians();
    let theta = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * theta.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = theta.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let lng2 = (lng1 + y.atan2(x) + PI).rem_euclid(2.0 * PI) - PI;

    GeoPoint::new(lat2.to_degrees(), lng2.to_degrees())
}

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let normalized = angle_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

pub fn is_valid_lat_lng(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}
