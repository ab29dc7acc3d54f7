//! Jump settings supplied by the caller.

use crate::error::PlanError;
use crate::landing_pattern::validate_leg_heights;
use serde::{Deserialize, Serialize};

/// Which side the base leg turns to when facing the landing direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSide {
    /// Left-hand pattern, all turns to the left
    #[default]
    Left,
    Right,
}

/// Condition of a cut-away main canopy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutAwayState {
    Open,
    #[default]
    Partially,
    Collapsed,
}

impl CutAwayState {
    /// Typical descent speed of the released canopy in m/s.
    pub fn descent_speed_mps(self) -> f64 {
        match self {
            CutAwayState::Open => 4.1,
            CutAwayState::Partially => 12.8,
            CutAwayState::Collapsed => 39.2,
        }
    }
}

/// Scalar inputs for all planning calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSettings {
    /// Exit altitude above ground in meters
    pub exit_altitude_m: f64,
    /// Planned opening altitude above ground in meters
    pub opening_altitude_m: f64,
    pub leg_height_final_m: f64,
    pub leg_height_base_m: f64,
    pub leg_height_downwind_m: f64,
    /// Canopy sink rate in m/s
    pub descent_rate_mps: f64,
    pub canopy_speed_kt: f64,
    /// Height reserved above the ground, shrinks reachable circles
    pub safety_height_m: f64,
    /// Aircraft indicated airspeed on jump run
    pub aircraft_speed_kt: f64,
    pub number_of_jumpers: u32,
    /// Exit separation; derived from TAS when unset
    pub jumper_separation_s: Option<f64>,
    pub pattern_side: PatternSide,
    pub custom_landing_direction_deg: Option<f64>,
    pub custom_jump_run_direction_deg: Option<f64>,
    pub jump_run_lateral_offset_m: f64,
    pub jump_run_forward_offset_m: f64,
    pub cut_away_altitude_m: f64,
    pub cut_away_state: CutAwayState,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            exit_altitude_m: 3000.0,
            opening_altitude_m: 1200.0,
            leg_height_final_m: 100.0,
            leg_height_base_m: 200.0,
            leg_height_downwind_m: 300.0,
            descent_rate_mps: 3.5,
            canopy_speed_kt: 20.0,
            safety_height_m: 0.0,
            aircraft_speed_kt: 90.0,
            number_of_jumpers: 10,
            jumper_separation_s: None,
            pattern_side: PatternSide::Left,
            custom_landing_direction_deg: None,
            custom_jump_run_direction_deg: None,
            jump_run_lateral_offset_m: 0.0,
            jump_run_forward_offset_m: 0.0,
            cut_away_altitude_m: 1000.0,
            cut_away_state: CutAwayState::Partially,
        }
    }
}

impl JumpSettings {
    /// Reject settings no calculation can work with.
    pub fn validate(&self) -> Result<(), PlanError> {
        let positive = [
            ("descent_rate_mps", self.descent_rate_mps),
            ("canopy_speed_kt", self.canopy_speed_kt),
            ("opening_altitude_m", self.opening_altitude_m),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(PlanError::InvalidSettings(format!("{name} must be positive, got {value}")));
        }
        if !self.exit_altitude_m.is_finite() || self.exit_altitude_m <= self.opening_altitude_m {
            return Err(PlanError::InvalidSettings(format!(
                "exit altitude {} m must be above opening altitude {} m",
                self.exit_altitude_m, self.opening_altitude_m
            )));
        }
        if !self.safety_height_m.is_finite() || self.safety_height_m < 0.0 {
            return Err(PlanError::InvalidSettings(format!(
                "safety height must not be negative, got {}",
                self.safety_height_m
            )));
        }
        if self.number_of_jumpers == 0 {
            return Err(PlanError::InvalidSettings("number_of_jumpers must be at least 1".into()));
        }
        validate_leg_heights(
            self.leg_height_final_m,
            self.leg_height_base_m,
            self.leg_height_downwind_m,
        )
    }
}
