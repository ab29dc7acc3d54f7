//! Wind vector algebra and wind triangle solutions.
//!
//! Directions follow the meteorological convention: a wind direction is
//! where the wind blows FROM, measured clockwise from true north. Vector
//! components `u` (east) and `v` (north) point where the air moves TO.

use crate::spatial::normalize_angle;
use serde::{Deserialize, Serialize};

pub const KNOTS_TO_MPS: f64 = 0.514444;
pub const FEET_TO_METERS: f64 = 0.3048;
pub const METERS_TO_FEET: f64 = 3.28084;

pub fn knots_to_mps(knots: f64) -> f64 {
    knots * KNOTS_TO_MPS
}

pub fn mps_to_knots(mps: f64) -> f64 {
    mps / KNOTS_TO_MPS
}

/// Horizontal wind as east/north components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Build components from a "from" direction and a speed.
    pub fn from_direction(direction_deg: f64, speed: f64) -> Self {
        let rad = direction_deg.to_radians();
        Self {
            u: -speed * rad.sin(),
            v: -speed * rad.cos(),
        }
    }

    pub fn direction_deg(&self) -> f64 {
        wind_direction(self.u, self.v)
    }

    pub fn speed(&self) -> f64 {
        wind_speed(self.u, self.v)
    }
}

/// Direction the wind blows from, in [0, 360).
pub fn wind_direction(u: f64, v: f64) -> f64 {
    normalize_angle((-u).atan2(-v).to_degrees())
}

pub fn wind_speed(u: f64, v: f64) -> f64 {
    u.hypot(v)
}

/// Angle of the wind relative to a course, in (-180, 180].
///
/// Positive angles mean the wind comes from the right of the course.
pub fn wind_angle(true_course_deg: f64, wind_direction_deg: f64) -> f64 {
    let angle = normalize_angle(wind_direction_deg - true_course_deg);
    if angle > 180.0 {
        angle - 360.0
    } else {
        angle
    }
}

/// Crosswind and headwind parts of a wind relative to a course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindComponents {
    /// Positive from the right, negative from the left
    pub crosswind: f64,
    /// Positive headwind, negative tailwind
    pub headwind: f64,
}

pub fn wind_components(wind_speed: f64, wind_angle_deg: f64) -> WindComponents {
    let rad = wind_angle_deg.to_radians();
    WindComponents {
        crosswind: wind_speed * rad.sin(),
        headwind: wind_speed * rad.cos(),
    }
}

/// Unsigned wind correction angle in degrees.
///
/// Returns 0 when the crosswind exceeds the airspeed and no correction can
/// hold the course.
pub fn wind_correction_angle(crosswind: f64, airspeed: f64) -> f64 {
    let wca = (crosswind / airspeed).asin().abs().to_degrees();
    if wca.is_nan() {
        0.0
    } else {
        wca
    }
}

fn signed_wca(crosswind: f64, airspeed: f64) -> f64 {
    let wca = wind_correction_angle(crosswind, airspeed);
    if crosswind < 0.0 {
        -wca
    } else {
        wca
    }
}

/// Solution of the wind triangle for a desired course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightParameters {
    pub crosswind: f64,
    pub headwind: f64,
    /// Signed correction: heading = course + wca
    pub wca_deg: f64,
    pub ground_speed: f64,
}

/// Wind correction and ground speed needed to hold `true_course_deg`.
///
/// When the crosswind is at least as strong as the airspeed, the ground
/// speed degrades to the negated headwind.
pub fn flight_parameters(
    true_course_deg: f64,
    wind_direction_deg: f64,
    wind_speed: f64,
    true_airspeed: f64,
) -> FlightParameters {
    let angle = wind_angle(true_course_deg, wind_direction_deg);
    let WindComponents { crosswind, headwind } = wind_components(wind_speed, angle);
    let ground_speed = if true_airspeed > crosswind.abs() {
        (true_airspeed.powi(2) - crosswind.powi(2)).sqrt() - headwind
    } else {
        -headwind
    };

    FlightParameters {
        crosswind,
        headwind,
        wca_deg: signed_wca(crosswind, true_airspeed),
        ground_speed,
    }
}

/// Resulting track when flying a fixed heading through the wind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseSolution {
    pub true_course_deg: f64,
    pub ground_speed: f64,
    pub wca_deg: f64,
    pub crosswind: f64,
    pub headwind: f64,
}

/// Vector sum of airspeed along `true_heading_deg` and the wind.
///
/// Inverse of [`flight_parameters`]: flying the heading `course + wca`
/// returned there yields the same course and ground speed here.
pub fn course_from_heading(
    true_heading_deg: f64,
    wind_direction_deg: f64,
    wind_speed: f64,
    true_airspeed: f64,
) -> CourseSolution {
    let angle = wind_angle(true_heading_deg, wind_direction_deg);
    let WindComponents { crosswind, headwind } = wind_components(wind_speed, angle);

    let heading = true_heading_deg.to_radians();
    let wind = WindVector::from_direction(wind_direction_deg, wind_speed);
    let gs_u = true_airspeed * heading.sin() + wind.u;
    let gs_v = true_airspeed * heading.cos() + wind.v;

    CourseSolution {
        true_course_deg: normalize_angle(gs_u.atan2(gs_v).to_degrees()),
        ground_speed: gs_u.hypot(gs_v),
        wca_deg: signed_wca(crosswind, true_airspeed),
        crosswind,
        headwind,
    }
}
