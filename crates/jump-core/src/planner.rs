//! Compose every calculation into one jump plan.

use crate::atmosphere::calculate_tas;
use crate::circles::{calculate_canopy_circles, calculate_exit_circles, CanopyCircles, ExitCircles};
use crate::cut_away::{calculate_cut_away, CutAwayResult};
use crate::error::PlanError;
use crate::freefall::{simulate, FreefallParams, FreefallResult};
use crate::jump_run::{calculate_jump_run, JumpRunTrack};
use crate::landing_pattern::{calculate_landing_pattern, LandingPattern};
use crate::profile::{ProfileColumns, WindProfileSample};
use crate::settings::JumpSettings;
use crate::spatial::GeoPoint;
use crate::wind::{knots_to_mps, METERS_TO_FEET};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Where the jump happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpSite {
    /// Desired impact point
    pub landing_point: GeoPoint,
    /// Ground elevation at the landing point, meters AMSL
    pub elevation_m: f64,
    /// Last landing wind direction seen on the ground
    #[serde(default)]
    pub observed_landing_wind_dir_deg: Option<f64>,
    /// Release point to start the jump run over instead of the landing point
    #[serde(default)]
    pub harp_anchor: Option<GeoPoint>,
    /// Where a cut-away would happen, if one should be planned
    #[serde(default)]
    pub cut_away_point: Option<GeoPoint>,
}

/// Everything that could be computed for a jump.
///
/// Failed parts are `None` and their reasons are listed in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpPlan {
    pub landing_pattern: Option<LandingPattern>,
    pub jump_run: Option<JumpRunTrack>,
    pub freefall: Option<FreefallResult>,
    pub exit_circles: Option<ExitCircles>,
    pub canopy_circles: Option<CanopyCircles>,
    pub cut_away: Option<CutAwayResult>,
    pub errors: Vec<String>,
}

impl JumpPlan {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run all calculators in dependency order.
///
/// # Errors
/// Only an unusable profile, location or settings fail the whole plan;
/// individual calculation failures are collected in [`JumpPlan::errors`].
pub fn plan_jump(
    samples: &[WindProfileSample],
    site: &JumpSite,
    settings: &JumpSettings,
) -> Result<JumpPlan, PlanError> {
    ProfileColumns::from_samples(samples)?;
    if !site.landing_point.is_valid() {
        return Err(PlanError::InvalidLocation {
            lat: site.landing_point.lat,
            lng: site.landing_point.lng,
        });
    }
    if !site.elevation_m.is_finite() {
        return Err(PlanError::InvalidSettings(format!(
            "ground elevation must be finite, got {}",
            site.elevation_m
        )));
    }
    settings.validate()?;

    let mut plan = JumpPlan::default();
    let dip = site.landing_point;
    let elevation = site.elevation_m;

    plan.landing_pattern = record(
        "landing pattern",
        calculate_landing_pattern(samples, dip, elevation, settings, site.observed_landing_wind_dir_deg),
        &mut plan.errors,
    );
    let downwind_start = plan.landing_pattern.as_ref().map(|p| p.downwind_start);

    let anchor = site.harp_anchor.filter(GeoPoint::is_valid).unwrap_or(dip);
    plan.jump_run = record(
        "jump run",
        calculate_jump_run(samples, anchor, elevation, settings),
        &mut plan.errors,
    );

    let params = freefall_params(
        site,
        settings,
        plan.jump_run.as_ref().map_or(0.0, |j| j.direction_deg),
    );
    plan.freefall = record("freefall", simulate(samples, &params), &mut plan.errors);

    if let Some(freefall) = plan.freefall.as_ref() {
        plan.exit_circles = record(
            "exit circles",
            calculate_exit_circles(samples, dip, elevation, settings, downwind_start, freefall),
            &mut plan.errors,
        );
    } else {
        tracing::debug!("exit circles skipped without a freefall result");
    }

    plan.canopy_circles = record(
        "canopy circles",
        calculate_canopy_circles(samples, dip, elevation, settings, downwind_start),
        &mut plan.errors,
    );

    if let Some(point) = site.cut_away_point {
        plan.cut_away = record(
            "cut-away",
            calculate_cut_away(
                samples,
                point,
                elevation,
                settings.cut_away_altitude_m,
                settings.cut_away_state,
            ),
            &mut plan.errors,
        );
    }

    tracing::debug!(
        samples = samples.len(),
        failures = plan.errors.len(),
        "jump plan computed"
    );
    Ok(plan)
}

/// Freefall inputs for exiting over the landing point along the jump run.
///
/// The aircraft speed is the TAS at exit altitude, or the IAS when no TAS
/// can be derived.
pub fn freefall_params(site: &JumpSite, settings: &JumpSettings, jump_run_direction_deg: f64) -> FreefallParams {
    let exit_height_ft = (site.elevation_m + settings.exit_altitude_m) * METERS_TO_FEET;
    let aircraft_tas_mps = calculate_tas(settings.aircraft_speed_kt, exit_height_ft)
        .map(knots_to_mps)
        .unwrap_or_else(|| knots_to_mps(settings.aircraft_speed_kt));
    FreefallParams {
        exit_altitude_m: settings.exit_altitude_m,
        opening_altitude_m: settings.opening_altitude_m,
        origin: site.landing_point,
        elevation_m: site.elevation_m,
        jump_run_direction_deg,
        aircraft_tas_mps,
    }
}

fn record<T, E: Display>(stage: &str, result: Result<T, E>, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(stage, error = %e, "plan stage skipped");
            errors.push(format!("{stage}: {e}"));
            None
        }
    }
}
