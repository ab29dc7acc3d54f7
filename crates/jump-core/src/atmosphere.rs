//! Standard-atmosphere helpers: true airspeed, dewpoint and air density.

use crate::wind::FEET_TO_METERS;

/// ISA sea level temperature in kelvin.
pub const ISA_SEA_LEVEL_TEMP_K: f64 = 288.15;
/// ISA temperature lapse rate in K/m.
pub const ISA_LAPSE_RATE: f64 = 0.0065;
pub const ISA_GRAVITY: f64 = 9.80665;
pub const ISA_GAS_CONSTANT_AIR: f64 = 287.05;
pub const ISA_SEA_LEVEL_DENSITY: f64 = 1.225;

const DEWPOINT_A_LIQUID: f64 = 17.27;
const DEWPOINT_B_LIQUID: f64 = 237.7;
const DEWPOINT_A_ICE: f64 = 21.87;
const DEWPOINT_B_ICE: f64 = 265.5;

const KELVIN_OFFSET: f64 = 273.15;

/// True airspeed from indicated airspeed using the ISA density ratio.
///
/// # Arguments
/// * `ias` - Indicated airspeed, any unit (result uses the same unit)
/// * `height_ft` - Pressure altitude in feet
///
/// # Returns
/// `None` for non-finite or negative inputs, or above the model's ceiling.
pub fn calculate_tas(ias: f64, height_ft: f64) -> Option<f64> {
    if !ias.is_finite() || !height_ft.is_finite() || ias < 0.0 || height_ft < 0.0 {
        return None;
    }

    let height_m = height_ft * FEET_TO_METERS;
    let base = 1.0 - ISA_LAPSE_RATE * height_m / ISA_SEA_LEVEL_TEMP_K;
    let exponent = ISA_GRAVITY / (ISA_LAPSE_RATE * ISA_GAS_CONSTANT_AIR) - 1.0;
    let density_ratio = base.powf(exponent);
    let tas = ias / density_ratio.sqrt();

    tas.is_finite().then_some(tas)
}

/// Dewpoint in °C via the Magnus formula (ice coefficients below 0 °C).
pub fn calculate_dewpoint(temperature_c: f64, relative_humidity_pct: f64) -> Option<f64> {
    let (a, b) = if temperature_c >= 0.0 {
        (DEWPOINT_A_LIQUID, DEWPOINT_B_LIQUID)
    } else {
        (DEWPOINT_A_ICE, DEWPOINT_B_ICE)
    };
    let alpha = a * temperature_c / (b + temperature_c) + (relative_humidity_pct / 100.0).ln();
    let dewpoint = b * alpha / (a - alpha);
    dewpoint.is_finite().then_some(dewpoint)
}

/// Air density from an isothermal barometric relation.
///
/// `gas_constant` and `gravity` are passed in so callers can keep their own
/// physical model constants.
pub fn air_density(
    surface_pressure_hpa: f64,
    height_above_surface_m: f64,
    temperature_c: f64,
    gas_constant: f64,
    gravity: f64,
) -> f64 {
    let temp_k = temperature_c + KELVIN_OFFSET;
    let rt = gas_constant * temp_k;
    surface_pressure_hpa * 100.0 * (-gravity * height_above_surface_m / rt).exp() / rt
}
