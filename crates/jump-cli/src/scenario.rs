//! Scenario files: a jump site, settings and the wind to plan with.

use anyhow::{bail, Context, Result};
use jump_core::{
    build_profile, combine_ensemble, EnsembleScenario, JumpSettings, JumpSite, RawTimeSlice, WindProfile,
    WindProfileSample,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One planning scenario.
///
/// Wind comes from the first of `profile`, `raw` or `ensemble` present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub site: JumpSite,
    #[serde(default)]
    pub settings: JumpSettings,
    /// Ready-made profile samples, ascending in height
    #[serde(default)]
    pub profile: Option<Vec<WindProfileSample>>,
    /// Pressure-level forecast for a single time
    #[serde(default)]
    pub raw: Option<RawTimeSlice>,
    /// Forecasts of several models for the same time
    #[serde(default)]
    pub ensemble: Option<Vec<RawTimeSlice>>,
    #[serde(default)]
    pub scenario: EnsembleScenario,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(text).context("Failed to parse scenario JSON")?;
        Ok(scenario)
    }

    /// Resolve the wind profile, resampling forecast data at `step_m`.
    pub fn wind_profile(&self, step_m: f64) -> Result<WindProfile> {
        if let Some(samples) = &self.profile {
            let profile = WindProfile {
                valid_time: None,
                surface_elevation_m: Some(self.site.elevation_m),
                samples: samples.clone(),
            };
            profile.validate().context("Invalid profile samples")?;
            return Ok(profile);
        }

        if let Some(raw) = &self.raw {
            return build_profile(raw, self.site.elevation_m, step_m).context("Failed to build profile");
        }

        if let Some(members) = &self.ensemble {
            let Some(combined) = combine_ensemble(members, self.scenario) else {
                bail!("Ensemble has no members");
            };
            tracing::info!(
                members = members.len(),
                scenario = ?self.scenario,
                "Combined ensemble forecast"
            );
            return build_profile(&combined, self.site.elevation_m, step_m)
                .context("Failed to build ensemble profile");
        }

        bail!("Scenario has no wind data: expected profile, raw or ensemble")
    }
}
