//! Command implementations shared by the `jumpplan` binary and tests.

use crate::scenario::Scenario;
use anyhow::{Context, Result};
use jump_core::mean_wind::profile_mean_wind;
use jump_core::profile::ProfileColumns;
use jump_core::{
    calculate_jump_run, freefall_params, plan_jump, simulate, FreefallResult, GeoPoint, JumpPlan, MeanWind,
    WindProfile,
};

/// Full jump plan for the scenario.
pub fn plan(scenario: &Scenario, step_m: f64) -> Result<JumpPlan> {
    let profile = scenario.wind_profile(step_m)?;
    let plan = plan_jump(&profile.samples, &scenario.site, &scenario.settings).context("Failed to plan jump")?;

    if plan.is_complete() {
        tracing::info!(samples = profile.samples.len(), "Jump plan complete");
    } else {
        for error in &plan.errors {
            tracing::warn!("{}", error);
        }
    }
    Ok(plan)
}

pub fn profile(scenario: &Scenario, step_m: f64) -> Result<WindProfile> {
    let profile = scenario.wind_profile(step_m)?;
    tracing::info!(samples = profile.samples.len(), step_m, "Resolved wind profile");
    Ok(profile)
}

/// Mean wind between two heights above the site.
pub fn mean_wind(scenario: &Scenario, step_m: f64, lower_agl_m: f64, upper_agl_m: f64) -> Result<MeanWind> {
    let profile = scenario.wind_profile(step_m)?;
    let columns = ProfileColumns::from_samples(&profile.samples).context("Invalid wind profile")?;
    let elevation = scenario.site.elevation_m;
    let mean = profile_mean_wind(&columns, elevation + lower_agl_m, elevation + upper_agl_m)
        .with_context(|| format!("Failed to average wind between {lower_agl_m} m and {upper_agl_m} m AGL"))?;
    Ok(mean)
}

/// Freefall from exit over the landing point, thrown along the jump run.
pub fn freefall(scenario: &Scenario, step_m: f64) -> Result<FreefallResult> {
    let profile = scenario.wind_profile(step_m)?;
    let site = &scenario.site;
    let anchor = site.harp_anchor.filter(GeoPoint::is_valid).unwrap_or(site.landing_point);

    let direction = match calculate_jump_run(&profile.samples, anchor, site.elevation_m, &scenario.settings) {
        Ok(track) => track.direction_deg,
        Err(e) => {
            tracing::warn!(error = %e, "No jump run, throwing towards north");
            0.0
        }
    };

    let params = freefall_params(site, &scenario.settings, direction);
    let result = simulate(&profile.samples, &params).context("Freefall simulation failed")?;
    tracing::info!(
        time_s = result.time_s,
        distance_m = result.distance_m,
        direction_deg = result.direction_deg,
        "Freefall simulated"
    );
    Ok(result)
}
