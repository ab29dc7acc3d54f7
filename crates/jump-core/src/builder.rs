//! Resample raw pressure-level forecast data into a wind profile.
//!
//! Forecast models deliver values on fixed pressure levels whose heights
//! vary with the weather. The builder splices near-surface points between
//! the surface observation and the lowest level, then resamples everything
//! at a fixed height step above the ground.

use crate::atmosphere::calculate_dewpoint;
use crate::error::BuildError;
use crate::interpolation::{interpolate_pressure, interpolate_wind_at_altitude, linear_interpolate};
use crate::profile::{WindProfile, WindProfileSample};
use crate::wind::{wind_direction, wind_speed, WindVector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Pressure levels requested from forecast models, in hPa.
pub const STANDARD_PRESSURE_LEVELS_HPA: [f64; 13] = [
    1000.0, 950.0, 925.0, 900.0, 850.0, 800.0, 700.0, 600.0, 500.0, 400.0, 300.0, 250.0, 200.0,
];

/// Smallest accepted resampling step, meters.
pub const MIN_PROFILE_STEP_M: f64 = 1.0;

/// Most samples a single resampled profile may hold.
pub const MAX_PROFILE_SAMPLES: usize = 100_000;

/// Surface values of one forecast time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceObservation {
    pub pressure_hpa: Option<f64>,
    pub temperature_2m_c: Option<f64>,
    pub relative_humidity_2m_pct: Option<f64>,
    pub wind_speed_10m_mps: Option<f64>,
    pub wind_direction_10m_deg: Option<f64>,
}

/// Model values on one pressure level. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureLevel {
    pub pressure_hpa: f64,
    #[serde(default)]
    pub geopotential_height_m: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub relative_humidity_pct: Option<f64>,
    #[serde(default)]
    pub wind_speed_mps: Option<f64>,
    #[serde(default)]
    pub wind_direction_deg: Option<f64>,
}

/// Raw forecast data for one valid time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTimeSlice {
    #[serde(default)]
    pub valid_time: Option<DateTime<Utc>>,
    pub surface: SurfaceObservation,
    pub levels: Vec<PressureLevel>,
}

/// A level with every value present.
#[derive(Debug, Clone, Copy)]
struct Level {
    pressure: f64,
    height: f64,
    temperature: f64,
    humidity: f64,
    wind: WindVector,
}

impl Level {
    fn from_raw(raw: &PressureLevel) -> Option<Self> {
        let level = Self {
            pressure: raw.pressure_hpa,
            height: raw.geopotential_height_m?,
            temperature: raw.temperature_c?,
            humidity: raw.relative_humidity_pct?,
            wind: WindVector::from_direction(raw.wind_direction_deg?, raw.wind_speed_mps?),
        };
        let finite = [level.pressure, level.height, level.temperature, level.humidity, level.wind.u, level.wind.v]
            .iter()
            .all(|v| v.is_finite());
        (finite && level.pressure > 0.0).then_some(level)
    }
}

struct Surface {
    pressure: f64,
    temperature: f64,
    humidity: f64,
    speed: f64,
    direction: f64,
}

impl Surface {
    fn from_observation(obs: &SurfaceObservation) -> Result<Self, BuildError> {
        let pressure = obs
            .pressure_hpa
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or(BuildError::MissingSurfacePressure)?;
        let require = |value: Option<f64>, name: &'static str| {
            value
                .filter(|v| v.is_finite())
                .ok_or(BuildError::MissingSurfaceValue(name))
        };
        Ok(Self {
            pressure,
            temperature: require(obs.temperature_2m_c, "temperature_2m_c")?,
            humidity: require(obs.relative_humidity_2m_pct, "relative_humidity_2m_pct")?,
            speed: require(obs.wind_speed_10m_mps, "wind_speed_10m_mps")?,
            direction: require(obs.wind_direction_10m_deg, "wind_direction_10m_deg")?,
        })
    }

    fn wind(&self) -> WindVector {
        WindVector::from_direction(self.direction, self.speed)
    }

    fn level(&self, height: f64) -> Level {
        Level {
            pressure: self.pressure,
            height,
            temperature: self.temperature,
            humidity: self.humidity,
            wind: self.wind(),
        }
    }
}

/// Build a profile sampled every `step_m` from the ground up to the
/// highest complete pressure level.
///
/// # Arguments
/// * `slice` - Raw model data for one valid time
/// * `base_height_m` - Ground elevation in meters AMSL
/// * `step_m` - Vertical resampling step in meters
///
/// # Errors
/// Fails with fewer than two complete levels, a missing surface
/// observation, or when the top level is not above the ground. Steps
/// below [`MIN_PROFILE_STEP_M`] or yielding more than
/// [`MAX_PROFILE_SAMPLES`] samples are rejected as [`BuildError::InvalidStep`].
pub fn build_profile(
    slice: &RawTimeSlice,
    base_height_m: f64,
    step_m: f64,
) -> Result<WindProfile, BuildError> {
    if !step_m.is_finite() || step_m < MIN_PROFILE_STEP_M {
        return Err(BuildError::InvalidStep(step_m));
    }

    let mut levels: Vec<Level> = slice.levels.iter().filter_map(Level::from_raw).collect();
    if levels.len() < 2 {
        return Err(BuildError::InsufficientLevels(levels.len()));
    }
    let surface = Surface::from_observation(&slice.surface)?;

    // Highest pressure first, dropping levels that would break height order.
    levels.sort_by(|a, b| b.pressure.partial_cmp(&a.pressure).unwrap_or(Ordering::Equal));
    let mut ordered: Vec<Level> = Vec::with_capacity(levels.len() + 1);
    for level in levels {
        if ordered.last().map_or(true, |prev| level.height > prev.height) {
            ordered.push(level);
        }
    }
    if ordered.len() < 2 {
        return Err(BuildError::InsufficientLevels(ordered.len()));
    }

    let top = ordered[ordered.len() - 1];
    let max_agl = top.height - base_height_m;
    if !max_agl.is_finite() || max_agl <= 0.0 {
        return Err(BuildError::InvalidMaxHeight(max_agl));
    }
    // bounds both the surface splice and the resampling below
    if max_agl / step_m > MAX_PROFILE_SAMPLES as f64 {
        return Err(BuildError::InvalidStep(step_m));
    }

    let lowest = ordered[0];
    if surface.pressure > lowest.pressure && lowest.height > base_height_m {
        let mut column = splice_surface_layer(&surface, &lowest, base_height_m, step_m)?;
        column.extend(ordered);
        ordered = column;
    }

    let heights: Vec<f64> = ordered.iter().map(|l| l.height).collect();
    let pressures: Vec<f64> = ordered.iter().map(|l| l.pressure).collect();
    let temperatures: Vec<f64> = ordered.iter().map(|l| l.temperature).collect();
    let humidities: Vec<f64> = ordered.iter().map(|l| l.humidity).collect();
    let u: Vec<f64> = ordered.iter().map(|l| l.wind.u).collect();
    let v: Vec<f64> = ordered.iter().map(|l| l.wind.v).collect();

    let steps = (max_agl / step_m).floor() as usize;
    let mut samples = Vec::with_capacity(steps + 1);
    samples.push(WindProfileSample {
        height_m: base_height_m,
        pressure_hpa: Some(surface.pressure),
        temperature_c: surface.temperature,
        relative_humidity_pct: surface.humidity,
        wind_speed_mps: surface.speed,
        wind_direction_deg: surface.direction,
        dewpoint_c: calculate_dewpoint(surface.temperature, surface.humidity),
    });

    for i in 1..=steps {
        let height = base_height_m + i as f64 * step_m;
        let wind = interpolate_wind_at_altitude(height, &pressures, &heights, &u, &v)?;
        let temperature = linear_interpolate(&heights, &temperatures, height)?;
        let humidity = linear_interpolate(&heights, &humidities, height)?.clamp(0.0, 100.0);
        samples.push(WindProfileSample {
            height_m: height,
            pressure_hpa: interpolate_pressure(height, &pressures, &heights),
            temperature_c: temperature,
            relative_humidity_pct: humidity,
            wind_speed_mps: wind_speed(wind.u, wind.v),
            wind_direction_deg: wind_direction(wind.u, wind.v),
            dewpoint_c: calculate_dewpoint(temperature, humidity),
        });
    }

    Ok(WindProfile {
        valid_time: slice.valid_time,
        surface_elevation_m: Some(base_height_m),
        samples,
    })
}

/// Surface point plus intermediate points up to (excluding) the lowest
/// level, in ascending height.
///
/// Pressure is blended in `ln(p)` with height; wind is blended against
/// `ln(height above ground + 1)` to mimic the logarithmic surface layer.
fn splice_surface_layer(
    surface: &Surface,
    lowest: &Level,
    base_height_m: f64,
    step_m: f64,
) -> Result<Vec<Level>, BuildError> {
    let depth = lowest.height - base_height_m;
    let steps_between = (depth / step_m).floor() as usize;
    let ln_ps = surface.pressure.ln();
    let ln_pl = lowest.pressure.ln();
    let log_heights = [0.0, depth.ln()];
    let surface_wind = surface.wind();

    let mut column = vec![surface.level(base_height_m)];
    for i in 1..steps_between {
        let height = base_height_m + i as f64 * step_m;
        if height >= lowest.height {
            continue;
        }
        let fraction = (height - base_height_m) / depth;
        let log_height = (height - base_height_m + 1.0).ln();
        let ends = [base_height_m, lowest.height];
        column.push(Level {
            pressure: (ln_ps + fraction * (ln_pl - ln_ps)).exp(),
            height,
            temperature: linear_interpolate(&ends, &[surface.temperature, lowest.temperature], height)?,
            humidity: linear_interpolate(&ends, &[surface.humidity, lowest.humidity], height)?,
            wind: WindVector {
                u: linear_interpolate(&log_heights, &[surface_wind.u, lowest.wind.u], log_height)?,
                v: linear_interpolate(&log_heights, &[surface_wind.v, lowest.wind.v], log_height)?,
            },
        });
    }
    Ok(column)
}
