//! Landing pattern laid out backwards from the landing point.
//!
//! Each leg drifts with the mean wind of its own height band. Final and
//! downwind are flown as courses (wind-corrected), base is flown as a
//! heading perpendicular to the landing direction.

use crate::error::PlanError;
use crate::mean_wind::{profile_mean_wind, MeanWind};
use crate::profile::{ProfileColumns, WindProfileSample};
use crate::settings::{JumpSettings, PatternSide};
use crate::spatial::{normalize_angle, GeoPoint};
use crate::wind::{course_from_heading, flight_parameters, knots_to_mps};
use serde::{Deserialize, Serialize};

/// Leg heights must strictly increase from final to downwind.
pub fn validate_leg_heights(final_m: f64, base_m: f64, downwind_m: f64) -> Result<(), PlanError> {
    let ordered = final_m.is_finite()
        && final_m > 0.0
        && base_m.is_finite()
        && downwind_m.is_finite()
        && base_m > final_m
        && downwind_m > base_m;
    if ordered {
        Ok(())
    } else {
        Err(PlanError::InvalidLegHeights {
            final_m,
            base_m,
            downwind_m,
        })
    }
}

/// Landing direction by priority: custom override, last observed landing
/// wind, then the first profile sample's wind direction.
pub fn resolve_landing_direction(
    custom_deg: Option<f64>,
    observed_deg: Option<f64>,
    samples: &[WindProfileSample],
) -> Option<f64> {
    custom_deg
        .filter(|d| d.is_finite())
        .or(observed_deg.filter(|d| d.is_finite()))
        .or_else(|| samples.first().map(|s| s.wind_direction_deg))
        .filter(|d| d.is_finite())
        .map(normalize_angle)
}

/// One flown leg of the pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternLeg {
    pub mean_wind: MeanWind,
    pub course_deg: f64,
    pub wca_deg: f64,
    pub ground_speed_mps: f64,
    pub headwind_mps: f64,
    pub length_m: f64,
    pub start: GeoPoint,
    pub end: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingPattern {
    pub landing_direction_deg: f64,
    pub downwind_start: GeoPoint,
    pub base_start: GeoPoint,
    pub final_start: GeoPoint,
    pub landing_point: GeoPoint,
    pub downwind: PatternLeg,
    pub base: PatternLeg,
    pub final_approach: PatternLeg,
}

/// Lay out downwind, base and final legs ending at `landing_point`.
///
/// # Arguments
/// * `samples` - Wind profile, heights AMSL
/// * `landing_point` - Desired impact point
/// * `elevation_m` - Ground elevation at the landing point, meters AMSL
/// * `settings` - Leg heights, canopy performance and pattern side
/// * `observed_landing_dir_deg` - Last landing wind seen on the ground
pub fn calculate_landing_pattern(
    samples: &[WindProfileSample],
    landing_point: GeoPoint,
    elevation_m: f64,
    settings: &JumpSettings,
    observed_landing_dir_deg: Option<f64>,
) -> Result<LandingPattern, PlanError> {
    let columns = ProfileColumns::from_samples(samples)?;
    if !landing_point.is_valid() {
        return Err(PlanError::InvalidLocation {
            lat: landing_point.lat,
            lng: landing_point.lng,
        });
    }
    let final_h = settings.leg_height_final_m;
    let base_h = settings.leg_height_base_m;
    let downwind_h = settings.leg_height_downwind_m;
    validate_leg_heights(final_h, base_h, downwind_h)?;

    let Some(landing_dir) = resolve_landing_direction(
        settings.custom_landing_direction_deg,
        observed_landing_dir_deg,
        samples,
    ) else {
        return Err(PlanError::NoLandingDirection);
    };

    let canopy_mps = knots_to_mps(settings.canopy_speed_kt);
    let descent = settings.descent_rate_mps;

    // Final: course into the landing direction
    let final_wind = profile_mean_wind(&columns, elevation_m, elevation_m + final_h)?;
    let final_fp = flight_parameters(landing_dir, final_wind.direction_deg, final_wind.speed_mps, canopy_mps);
    let final_len = final_fp.ground_speed * final_h / descent;
    let final_start = landing_point.destination(final_len, normalize_angle(landing_dir + 180.0));
    let final_approach = PatternLeg {
        mean_wind: final_wind,
        course_deg: landing_dir,
        wca_deg: final_fp.wca_deg,
        ground_speed_mps: final_fp.ground_speed,
        headwind_mps: final_fp.headwind,
        length_m: final_len,
        start: final_start,
        end: landing_point,
    };

    // Base: fixed heading, the wind decides the track
    let base_wind = profile_mean_wind(&columns, elevation_m + final_h, elevation_m + base_h)?;
    let turn = match settings.pattern_side {
        PatternSide::Left => 90.0,
        PatternSide::Right => -90.0,
    };
    let base_heading = normalize_angle(landing_dir + turn);
    let base_sol = course_from_heading(base_heading, base_wind.direction_deg, base_wind.speed_mps, canopy_mps);
    let base_back = normalize_angle(base_sol.true_course_deg + 180.0);
    let base_len = base_sol.ground_speed * (base_h - final_h) / descent;
    let base_start = final_start.destination(base_len, base_back);
    let base = PatternLeg {
        mean_wind: base_wind,
        course_deg: base_sol.true_course_deg,
        wca_deg: base_sol.wca_deg,
        ground_speed_mps: base_sol.ground_speed,
        headwind_mps: base_sol.headwind,
        length_m: base_len,
        start: base_start,
        end: final_start,
    };

    // Downwind: course opposite the landing direction
    let downwind_wind = profile_mean_wind(&columns, elevation_m + base_h, elevation_m + downwind_h)?;
    let downwind_course = normalize_angle(landing_dir + 180.0);
    let downwind_fp = flight_parameters(
        downwind_course,
        downwind_wind.direction_deg,
        downwind_wind.speed_mps,
        canopy_mps,
    );
    let downwind_len = downwind_fp.ground_speed * (downwind_h - base_h) / descent;
    let downwind_start = base_start.destination(downwind_len, landing_dir);
    let downwind = PatternLeg {
        mean_wind: downwind_wind,
        course_deg: downwind_course,
        wca_deg: downwind_fp.wca_deg,
        ground_speed_mps: downwind_fp.ground_speed,
        headwind_mps: downwind_fp.headwind,
        length_m: downwind_len,
        start: downwind_start,
        end: base_start,
    };

    Ok(LandingPattern {
        landing_direction_deg: landing_dir,
        downwind_start,
        base_start,
        final_start,
        landing_point,
        downwind,
        base,
        final_approach,
    })
}
