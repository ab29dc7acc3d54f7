//! Time-stepped freefall trajectory through a height-varying wind field.
//!
//! The jumper leaves the aircraft with its airspeed along the jump run and
//! is integrated with explicit Euler steps until just above the planned
//! opening height. Vertical drag is quadratic in the vertical speed,
//! horizontal drag is quadratic in the air-relative horizontal speed.

use crate::atmosphere::air_density;
use crate::error::FreefallError;
use crate::interpolation::linear_interpolate;
use crate::profile::{ProfileColumns, WindProfileSample};
use crate::spatial::{is_valid_lat_lng, normalize_angle, GeoPoint};
use serde::{Deserialize, Serialize};

/// Height lost between pulling and a flying canopy, meters.
pub const CANOPY_OPENING_BUFFER_M: f64 = 200.0;

const JUMPER_MASS_KG: f64 = 80.0;
const GRAVITY: f64 = 9.81;
const GAS_CONSTANT_AIR: f64 = 287.102;
const DRAG_COEFFICIENT_VERTICAL: f64 = 1.0;
const DRAG_COEFFICIENT_HORIZONTAL: f64 = 1.0;
const AREA_VERTICAL_M2: f64 = 0.5;
const AREA_HORIZONTAL_M2: f64 = 0.5;
const TIME_STEP_S: f64 = 0.5;
const DEFAULT_SURFACE_PRESSURE_HPA: f64 = 1013.25;
const MAX_STEPS: usize = 20_000;

/// Inputs of a freefall simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreefallParams {
    /// Exit altitude above ground, meters
    pub exit_altitude_m: f64,
    /// Planned opening altitude above ground, meters
    pub opening_altitude_m: f64,
    pub origin: GeoPoint,
    /// Ground elevation at the origin, meters AMSL
    pub elevation_m: f64,
    pub jump_run_direction_deg: f64,
    /// Aircraft true airspeed at exit, m/s
    pub aircraft_tas_mps: f64,
}

/// State of the jumper after one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time_s: f64,
    /// Height AMSL, meters
    pub height_m: f64,
    /// Positive up
    pub vertical_velocity_mps: f64,
    pub ground_velocity_north_mps: f64,
    pub ground_velocity_east_mps: f64,
    pub offset_north_m: f64,
    pub offset_east_m: f64,
}

impl TrajectoryPoint {
    pub fn horizontal_offset_m(&self) -> f64 {
        self.offset_north_m.hypot(self.offset_east_m)
    }

    pub fn offset_bearing_deg(&self) -> f64 {
        normalize_angle(self.offset_east_m.atan2(self.offset_north_m).to_degrees())
    }
}

/// Geographic position of a trajectory point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub position: GeoPoint,
    pub height_m: f64,
    pub time_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreefallResult {
    pub time_s: f64,
    /// Horizontal displacement from the origin, meters
    pub distance_m: f64,
    /// Bearing of the displacement from the origin
    pub direction_deg: f64,
    pub final_height_m: f64,
    pub final_vertical_velocity_mps: f64,
    pub trajectory: Vec<TrajectoryPoint>,
    pub path: Vec<PathPoint>,
}

/// Integrate a freefall from exit down to the opening height minus
/// [`CANOPY_OPENING_BUFFER_M`].
///
/// Wind components and temperature are resampled from the profile at every
/// step; air density follows an isothermal barometric relation anchored at
/// the lowest sample's pressure (1013.25 hPa when unknown).
///
/// # Errors
/// Fails for an unusable profile, non-finite origin or elevation, or an
/// exit altitude not above the opening altitude.
pub fn simulate(
    samples: &[WindProfileSample],
    params: &FreefallParams,
) -> Result<FreefallResult, FreefallError> {
    let columns = ProfileColumns::from_samples(samples)?;

    let origin = params.origin;
    if !is_valid_lat_lng(origin.lat, origin.lng) {
        return Err(FreefallError::InvalidOrigin {
            lat: origin.lat,
            lng: origin.lng,
        });
    }
    if !params.elevation_m.is_finite() {
        return Err(FreefallError::InvalidElevation(params.elevation_m));
    }
    let (exit, opening) = (params.exit_altitude_m, params.opening_altitude_m);
    if !exit.is_finite() || !opening.is_finite() || exit <= opening {
        return Err(FreefallError::InvalidAltitudes { exit, opening });
    }

    let elevation = params.elevation_m;
    let h_stop = elevation + opening - CANOPY_OPENING_BUFFER_M;
    let surface_pressure = columns
        .surface_pressure_hpa()
        .unwrap_or(DEFAULT_SURFACE_PRESSURE_HPA);

    let tas = if params.aircraft_tas_mps.is_finite() {
        params.aircraft_tas_mps.max(0.0)
    } else {
        0.0
    };
    let jump_run = params.jump_run_direction_deg.to_radians();

    let mut current = TrajectoryPoint {
        time_s: 0.0,
        height_m: elevation + exit,
        vertical_velocity_mps: 0.0,
        ground_velocity_north_mps: tas * jump_run.cos(),
        ground_velocity_east_mps: tas * jump_run.sin(),
        offset_north_m: 0.0,
        offset_east_m: 0.0,
    };
    let mut trajectory = vec![current];

    while current.height_m > h_stop {
        if trajectory.len() > MAX_STEPS {
            return Err(FreefallError::IterationLimit(MAX_STEPS));
        }
        current = step(&columns, &current, h_stop, surface_pressure, elevation)?;
        trajectory.push(current);
    }

    let path = trajectory
        .iter()
        .map(|p| PathPoint {
            position: origin.destination(p.horizontal_offset_m(), p.offset_bearing_deg()),
            height_m: p.height_m,
            time_s: p.time_s,
        })
        .collect();

    Ok(FreefallResult {
        time_s: current.time_s,
        distance_m: current.horizontal_offset_m(),
        direction_deg: current.offset_bearing_deg(),
        final_height_m: current.height_m,
        final_vertical_velocity_mps: current.vertical_velocity_mps,
        trajectory,
        path,
    })
}

fn step(
    columns: &ProfileColumns,
    current: &TrajectoryPoint,
    h_stop: f64,
    surface_pressure_hpa: f64,
    elevation: f64,
) -> Result<TrajectoryPoint, FreefallError> {
    let h = current.height_m;
    let wind_east = linear_interpolate(&columns.heights, &columns.u, h)?;
    let wind_north = linear_interpolate(&columns.heights, &columns.v, h)?;
    let temperature = linear_interpolate(&columns.heights, &columns.temperatures, h)?;

    let rho = air_density(
        surface_pressure_hpa,
        h - elevation,
        temperature,
        GAS_CONSTANT_AIR,
        GRAVITY,
    );
    let bv = 0.5 * DRAG_COEFFICIENT_VERTICAL * AREA_VERTICAL_M2 * rho / JUMPER_MASS_KG;
    let bh = 0.5 * DRAG_COEFFICIENT_HORIZONTAL * AREA_HORIZONTAL_M2 * rho / JUMPER_MASS_KG;

    let air_north = current.ground_velocity_north_mps - wind_north;
    let air_east = current.ground_velocity_east_mps - wind_east;
    let air_speed = air_north.hypot(air_east);

    let vz = current.vertical_velocity_mps;
    let accel_z = -GRAVITY - bv * vz * vz.abs();
    let accel_north = -bh * air_speed * air_north;
    let accel_east = -bh * air_speed * air_east;

    let mut dt = TIME_STEP_S;
    let mut next_height = h + vz * dt;
    if next_height <= h_stop {
        // land exactly on the stop height
        dt *= (h - h_stop) / (h - next_height);
        next_height = h_stop;
    }

    Ok(TrajectoryPoint {
        time_s: current.time_s + dt,
        height_m: next_height,
        vertical_velocity_mps: vz + accel_z * dt,
        ground_velocity_north_mps: current.ground_velocity_north_mps + accel_north * dt,
        ground_velocity_east_mps: current.ground_velocity_east_mps + accel_east * dt,
        offset_north_m: current.offset_north_m + current.ground_velocity_north_mps * dt,
        offset_east_m: current.offset_east_m + current.ground_velocity_east_mps * dt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfileError;
    use crate::profile::fixtures;

    fn params(tas: f64, jump_run: f64) -> FreefallParams {
        FreefallParams {
            exit_altitude_m: 3000.0,
            opening_altitude_m: 1200.0,
            origin: GeoPoint::new(52.52, 13.41),
            elevation_m: 0.0,
            jump_run_direction_deg: jump_run,
            aircraft_tas_mps: tas,
        }
    }

    #[test]
    fn calm_air_without_throw_falls_straight_down() {
        let profile = fixtures::constant_wind(0.0, 0.0, 4000.0, 200.0);
        let result = simulate(&profile, &params(0.0, 90.0)).unwrap();
        assert!(result.distance_m < 1e-9, "distance {}", result.distance_m);
        assert_eq!(result.final_height_m, 1000.0);
        let end = result.path.last().unwrap();
        assert!((end.position.lat - 52.52).abs() < 1e-12);
    }

    #[test]
    fn fall_time_and_speed_are_plausible() {
        let profile = fixtures::constant_wind(0.0, 0.0, 4000.0, 200.0);
        let result = simulate(&profile, &params(0.0, 0.0)).unwrap();
        // 2000 m at roughly 50 m/s terminal speed
        assert!(result.time_s > 35.0 && result.time_s < 55.0, "time {}", result.time_s);
        assert!(
            result.final_vertical_velocity_mps < -45.0 && result.final_vertical_velocity_mps > -65.0,
            "vz {}",
            result.final_vertical_velocity_mps
        );
    }

    #[test]
    fn trajectory_never_overshoots_stop_height() {
        let profile = fixtures::veering(0.0);
        let result = simulate(&profile, &params(40.0, 250.0)).unwrap();
        let stop = 1000.0;
        assert!(result.trajectory.iter().all(|p| p.height_m >= stop));
        assert_eq!(result.trajectory.last().unwrap().height_m, stop);
        assert_eq!(result.trajectory.len(), result.path.len());
        let times: Vec<f64> = result.trajectory.iter().map(|p| p.time_s).collect();
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn westerly_wind_drifts_jumper_east() {
        let profile = fixtures::constant_wind(270.0, 10.0, 4000.0, 200.0);
        let result = simulate(&profile, &params(0.0, 0.0)).unwrap();
        assert!((result.direction_deg - 90.0).abs() < 1.0, "dir {}", result.direction_deg);
        // drag only gradually accelerates the jumper up to wind speed
        let max_drift = 10.0 * result.time_s;
        assert!(
            result.distance_m > 0.2 * max_drift && result.distance_m < max_drift,
            "distance {} vs {}",
            result.distance_m,
            max_drift
        );
    }

    #[test]
    fn forward_throw_follows_jump_run_in_calm_air() {
        let profile = fixtures::constant_wind(0.0, 0.0, 4000.0, 200.0);
        let result = simulate(&profile, &params(40.0, 0.0)).unwrap();
        let dir = result.direction_deg;
        assert!(dir < 0.5 || dir > 359.5, "dir {dir}");
        assert!(result.distance_m > 50.0 && result.distance_m < 40.0 * result.time_s);
    }

    #[test]
    fn exit_below_opening_is_rejected() {
        let profile = fixtures::veering(0.0);
        let mut p = params(0.0, 0.0);
        p.exit_altitude_m = 1000.0;
        assert_eq!(
            simulate(&profile, &p),
            Err(FreefallError::InvalidAltitudes {
                exit: 1000.0,
                opening: 1200.0
            })
        );
    }

    #[test]
    fn invalid_inputs_are_named() {
        assert_eq!(
            simulate(&[], &params(0.0, 0.0)),
            Err(FreefallError::Profile(ProfileError::Empty))
        );

        let profile = fixtures::veering(0.0);
        let mut p = params(0.0, 0.0);
        p.origin = GeoPoint::new(f64::NAN, 13.0);
        assert!(matches!(simulate(&profile, &p), Err(FreefallError::InvalidOrigin { .. })));

        let mut p = params(0.0, 0.0);
        p.elevation_m = f64::INFINITY;
        assert!(matches!(simulate(&profile, &p), Err(FreefallError::InvalidElevation(_))));
    }

    #[test]
    fn berlin_sounding_is_reproducible() {
        let profile = fixtures::berlin_sounding();
        let mut params = FreefallParams {
            exit_altitude_m: 3000.0,
            opening_altitude_m: 1200.0,
            origin: GeoPoint::new(52.52, 13.41),
            elevation_m: 38.0,
            jump_run_direction_deg: 225.0,
            aircraft_tas_mps: 104.47 * 0.514444,
        };

        let into_wind = simulate(&profile, &params).unwrap();
        assert!((into_wind.time_s - 39.378322).abs() < 1e-5, "time {}", into_wind.time_s);
        assert!((into_wind.distance_m - 361.341737).abs() < 1e-4, "distance {}", into_wind.distance_m);
        assert!((into_wind.direction_deg - 217.528321).abs() < 1e-5, "direction {}", into_wind.direction_deg);
        assert_eq!(into_wind.final_height_m, 1038.0);

        // Same fall with the wind: identical timing, throw and drift add up.
        params.jump_run_direction_deg = 45.0;
        let with_wind = simulate(&profile, &params).unwrap();
        assert!((with_wind.time_s - into_wind.time_s).abs() < 1e-9);
        assert!((with_wind.distance_m - 994.580755).abs() < 1e-4, "distance {}", with_wind.distance_m);
        assert!((with_wind.direction_deg - 47.490134).abs() < 1e-5, "direction {}", with_wind.direction_deg);

        assert_eq!(simulate(&profile, &params).unwrap(), with_wind);
    }
}
