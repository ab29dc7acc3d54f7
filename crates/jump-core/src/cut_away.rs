//! Drift of a released main canopy after a cut-away.

use crate::error::PlanError;
use crate::mean_wind::{profile_mean_wind, MeanWind};
use crate::profile::{ProfileColumns, WindProfileSample};
use crate::settings::CutAwayState;
use crate::spatial::{normalize_angle, GeoPoint};
use serde::{Deserialize, Serialize};

/// Radius of the search area drawn around the predicted landing spot.
pub const CUT_AWAY_RADIUS_M: f64 = 150.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutAwayResult {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub state: CutAwayState,
    pub mean_wind: MeanWind,
    pub descent_speed_mps: f64,
    pub descent_time_s: f64,
    pub displacement_m: f64,
}

/// Where a canopy released at `cut_away_altitude_m` above `cut_away_point`
/// comes down.
pub fn calculate_cut_away(
    samples: &[WindProfileSample],
    cut_away_point: GeoPoint,
    elevation_m: f64,
    cut_away_altitude_m: f64,
    state: CutAwayState,
) -> Result<CutAwayResult, PlanError> {
    let columns = ProfileColumns::from_samples(samples)?;
    if !cut_away_point.is_valid() {
        return Err(PlanError::InvalidLocation {
            lat: cut_away_point.lat,
            lng: cut_away_point.lng,
        });
    }
    if !cut_away_altitude_m.is_finite() || cut_away_altitude_m <= 0.0 {
        return Err(PlanError::InvalidSettings(format!(
            "cut-away altitude must be positive, got {cut_away_altitude_m}"
        )));
    }

    let mean_wind = profile_mean_wind(&columns, elevation_m, elevation_m + cut_away_altitude_m)?;
    let descent_speed = state.descent_speed_mps();
    let descent_time = cut_away_altitude_m / descent_speed;
    let displacement = mean_wind.speed_mps * descent_time;

    Ok(CutAwayResult {
        center: cut_away_point.destination(displacement, normalize_angle(mean_wind.direction_deg + 180.0)),
        radius_m: CUT_AWAY_RADIUS_M,
        state,
        mean_wind,
        descent_speed_mps: descent_speed,
        descent_time_s: descent_time,
        displacement_m: displacement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures;

    #[test]
    fn canopy_drifts_downwind() {
        let profile = fixtures::constant_wind(270.0, 6.0, 3000.0, 100.0);
        let point = GeoPoint::new(48.0, 11.0);
        let result = calculate_cut_away(&profile, point, 0.0, 1000.0, CutAwayState::Open).unwrap();
        let expected = 6.0 * 1000.0 / 4.1;
        assert!((result.displacement_m - expected).abs() < 1e-6);
        assert!((point.distance_to(&result.center) - expected).abs() < 0.5);
        assert!((point.bearing_to(&result.center) - 90.0).abs() < 0.1);
        assert_eq!(result.radius_m, CUT_AWAY_RADIUS_M);
    }

    #[test]
    fn collapsed_canopy_drifts_least() {
        let profile = fixtures::constant_wind(90.0, 8.0, 3000.0, 100.0);
        let point = GeoPoint::new(48.0, 11.0);
        let open = calculate_cut_away(&profile, point, 0.0, 1000.0, CutAwayState::Open).unwrap();
        let collapsed = calculate_cut_away(&profile, point, 0.0, 1000.0, CutAwayState::Collapsed).unwrap();
        assert!(collapsed.displacement_m < open.displacement_m);
        assert!(collapsed.descent_time_s < open.descent_time_s);
    }

    #[test]
    fn rejects_non_positive_altitude() {
        let profile = fixtures::constant_wind(90.0, 8.0, 3000.0, 100.0);
        let result = calculate_cut_away(&profile, GeoPoint::new(48.0, 11.0), 0.0, 0.0, CutAwayState::Open);
        assert!(matches!(result, Err(PlanError::InvalidSettings(_))));
    }
}
