//! Jump run track: aircraft direction, length and approach leg.

use crate::atmosphere::calculate_tas;
use crate::error::PlanError;
use crate::interpolation::linear_interpolate;
use crate::mean_wind::{profile_mean_wind, MeanWind};
use crate::profile::{ProfileColumns, WindProfileSample};
use crate::settings::JumpSettings;
use crate::spatial::{normalize_angle, GeoPoint};
use crate::wind::{knots_to_mps, METERS_TO_FEET};
use serde::{Deserialize, Serialize};

pub const MIN_TRACK_LENGTH_M: f64 = 100.0;
pub const MAX_TRACK_LENGTH_M: f64 = 10_000.0;
pub const MIN_APPROACH_LENGTH_M: f64 = 100.0;
pub const MAX_APPROACH_LENGTH_M: f64 = 20_000.0;
pub const APPROACH_TIME_S: f64 = 120.0;
pub const DEFAULT_JUMPER_SEPARATION_S: f64 = 5.0;

/// Exit separation in seconds by true airspeed in knots, fastest first.
const JUMPER_SEPARATION_TABLE: [(f64, f64); 27] = [
    (135.0, 5.0),
    (130.0, 5.0),
    (125.0, 5.0),
    (120.0, 5.0),
    (115.0, 5.0),
    (110.0, 5.0),
    (105.0, 5.0),
    (100.0, 6.0),
    (95.0, 7.0),
    (90.0, 7.0),
    (85.0, 7.0),
    (80.0, 8.0),
    (75.0, 8.0),
    (70.0, 9.0),
    (65.0, 10.0),
    (60.0, 10.0),
    (55.0, 11.0),
    (50.0, 12.0),
    (45.0, 14.0),
    (40.0, 15.0),
    (35.0, 17.0),
    (30.0, 20.0),
    (25.0, 24.0),
    (20.0, 30.0),
    (15.0, 40.0),
    (10.0, 60.0),
    (5.0, 119.0),
];

/// Recommended exit separation for an aircraft flying `ias_kt` at
/// `exit_altitude_m`.
///
/// Uses the slowest tabulated speed that is still at or above the true
/// airspeed; speeds beyond the table use its fastest entry.
pub fn separation_from_tas(ias_kt: f64, exit_altitude_m: f64) -> f64 {
    let Some(tas) = calculate_tas(ias_kt, exit_altitude_m * METERS_TO_FEET).filter(|t| *t > 0.0)
    else {
        return DEFAULT_JUMPER_SEPARATION_S;
    };

    JUMPER_SEPARATION_TABLE
        .iter()
        .take_while(|(speed, _)| tas <= *speed)
        .last()
        .unwrap_or(&JUMPER_SEPARATION_TABLE[0])
        .1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpRunTrack {
    pub direction_deg: f64,
    pub track_length_m: f64,
    pub approach_length_m: f64,
    pub approach_time_s: f64,
    /// Mean wind from the ground to opening altitude
    pub mean_wind: MeanWind,
    pub ground_speed_mps: f64,
    pub separation_s: f64,
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Approach leg, from the track start back to where it begins
    pub approach_points: [GeoPoint; 2],
}

/// Build the jump run starting over `anchor`.
///
/// The direction is the rounded mean wind between the ground and opening
/// altitude unless a custom direction in [0, 360] is set. Ground speed is
/// the vector sum of TAS along the track and the wind at exit altitude.
pub fn calculate_jump_run(
    samples: &[WindProfileSample],
    anchor: GeoPoint,
    elevation_m: f64,
    settings: &JumpSettings,
) -> Result<JumpRunTrack, PlanError> {
    let columns = ProfileColumns::from_samples(samples)?;
    if !anchor.is_valid() {
        return Err(PlanError::InvalidLocation {
            lat: anchor.lat,
            lng: anchor.lng,
        });
    }

    let mean_wind = profile_mean_wind(&columns, elevation_m, elevation_m + settings.opening_altitude_m)?;
    let direction = settings
        .custom_jump_run_direction_deg
        .filter(|d| d.is_finite() && (0.0..=360.0).contains(d))
        .unwrap_or_else(|| mean_wind.direction_deg.round());
    let direction = normalize_angle(direction);

    let exit_height = elevation_m + settings.exit_altitude_m;
    let ground_speed = match calculate_tas(settings.aircraft_speed_kt, exit_height * METERS_TO_FEET) {
        Some(tas_kt) => {
            let tas = knots_to_mps(tas_kt);
            let wind_u = linear_interpolate(&columns.heights, &columns.u, exit_height)?;
            let wind_v = linear_interpolate(&columns.heights, &columns.v, exit_height)?;
            let heading = direction.to_radians();
            (tas * heading.sin() + wind_u).hypot(tas * heading.cos() + wind_v)
        }
        None => knots_to_mps(settings.aircraft_speed_kt),
    };

    let separation = settings
        .jumper_separation_s
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or_else(|| separation_from_tas(settings.aircraft_speed_kt, settings.exit_altitude_m));

    let track_length = (f64::from(settings.number_of_jumpers) * separation * ground_speed)
        .round()
        .clamp(MIN_TRACK_LENGTH_M, MAX_TRACK_LENGTH_M);
    let approach_length = (ground_speed * APPROACH_TIME_S)
        .round()
        .clamp(MIN_APPROACH_LENGTH_M, MAX_APPROACH_LENGTH_M);

    let lateral = settings.jump_run_lateral_offset_m;
    let forward = settings.jump_run_forward_offset_m;
    let shift_distance = lateral.hypot(forward);
    let shift_bearing = normalize_angle(direction + lateral.atan2(forward).to_degrees());

    let start = anchor.destination(shift_distance, shift_bearing);
    let end = anchor
        .destination(track_length, direction)
        .destination(shift_distance, shift_bearing);
    let approach_start = start.destination(approach_length, normalize_angle(direction + 180.0));

    Ok(JumpRunTrack {
        direction_deg: direction,
        track_length_m: track_length,
        approach_length_m: approach_length,
        approach_time_s: APPROACH_TIME_S,
        mean_wind,
        ground_speed_mps: ground_speed,
        separation_s: separation,
        start,
        end,
        approach_points: [start, approach_start],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures;

    const DIP: GeoPoint = GeoPoint { lat: 52.0, lng: 10.0 };

    #[test]
    fn separation_table_lookup() {
        // 90 kt indicated is about 105 kt true at 3000 m
        assert_eq!(separation_from_tas(90.0, 3000.0), 5.0);
        assert_eq!(separation_from_tas(200.0, 3000.0), 5.0);
        assert_eq!(separation_from_tas(20.0, 0.0), 30.0);
        assert_eq!(separation_from_tas(21.0, 0.0), 24.0);
        assert_eq!(separation_from_tas(3.0, 0.0), 119.0);
        assert_eq!(separation_from_tas(-1.0, 3000.0), DEFAULT_JUMPER_SEPARATION_S);
        assert_eq!(separation_from_tas(0.0, 3000.0), DEFAULT_JUMPER_SEPARATION_S);
    }

    #[test]
    fn jump_run_flies_into_the_mean_wind() {
        let profile = fixtures::constant_wind(270.0, 10.0, 5000.0, 250.0);
        let track = calculate_jump_run(&profile, DIP, 0.0, &JumpSettings::default()).unwrap();
        assert_eq!(track.direction_deg, 270.0);

        let tas = knots_to_mps(calculate_tas(90.0, 3000.0 * METERS_TO_FEET).unwrap());
        assert!((track.ground_speed_mps - (tas - 10.0)).abs() < 1e-6, "gs {}", track.ground_speed_mps);
        let expected = (10.0 * track.separation_s * track.ground_speed_mps).round();
        assert_eq!(track.track_length_m, expected);
        assert!(track.end.lng < track.start.lng);
        assert_eq!(track.approach_length_m, (track.ground_speed_mps * APPROACH_TIME_S).round());
        assert!(track.approach_points[1].lng > track.start.lng);
    }

    #[test]
    fn custom_direction_overrides_wind() {
        let profile = fixtures::constant_wind(270.0, 10.0, 5000.0, 250.0);
        let settings = JumpSettings {
            custom_jump_run_direction_deg: Some(45.0),
            ..JumpSettings::default()
        };
        let track = calculate_jump_run(&profile, DIP, 0.0, &settings).unwrap();
        assert_eq!(track.direction_deg, 45.0);

        let out_of_range = JumpSettings {
            custom_jump_run_direction_deg: Some(400.0),
            ..JumpSettings::default()
        };
        let track = calculate_jump_run(&profile, DIP, 0.0, &out_of_range).unwrap();
        assert_eq!(track.direction_deg, 270.0);
    }

    #[test]
    fn lateral_offset_shifts_track_to_the_right() {
        let profile = fixtures::constant_wind(0.0, 5.0, 5000.0, 250.0);
        let settings = JumpSettings {
            jump_run_lateral_offset_m: 300.0,
            ..JumpSettings::default()
        };
        let track = calculate_jump_run(&profile, DIP, 0.0, &settings).unwrap();
        assert_eq!(track.direction_deg, 0.0);
        assert!((DIP.distance_to(&track.start) - 300.0).abs() < 0.01);
        assert!((DIP.bearing_to(&track.start) - 90.0).abs() < 0.01);
    }

    #[test]
    fn track_length_is_clamped() {
        let profile = fixtures::constant_wind(0.0, 5.0, 5000.0, 250.0);
        let settings = JumpSettings {
            number_of_jumpers: 1,
            jumper_separation_s: Some(0.5),
            ..JumpSettings::default()
        };
        let track = calculate_jump_run(&profile, DIP, 0.0, &settings).unwrap();
        assert_eq!(track.track_length_m, MIN_TRACK_LENGTH_M);

        let settings = JumpSettings {
            number_of_jumpers: 500,
            jumper_separation_s: Some(10.0),
            ..JumpSettings::default()
        };
        let track = calculate_jump_run(&profile, DIP, 0.0, &settings).unwrap();
        assert_eq!(track.track_length_m, MAX_TRACK_LENGTH_M);
    }
}
