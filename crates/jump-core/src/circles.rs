//! Exit and canopy reachability circles.
//!
//! A canopy opened at `opening - CANOPY_OPENING_BUFFER_M` can glide for
//! `height / descent_rate` seconds. The circle of reachable points is
//! centred where the mean wind of the band carries the canopy, so the
//! centre is moved upwind from the target by the wind drift. Exit circles
//! additionally move against the freefall displacement.

use crate::error::PlanError;
use crate::freefall::{FreefallResult, CANOPY_OPENING_BUFFER_M};
use crate::mean_wind::{profile_mean_wind, MeanWind};
use crate::profile::{ProfileColumns, WindProfileSample};
use crate::settings::JumpSettings;
use crate::spatial::{normalize_angle, GeoPoint};
use crate::wind::knots_to_mps;
use serde::{Deserialize, Serialize};

/// Nested canopy circles are only drawn for bands at least this tall.
const NESTED_MIN_BAND_M: f64 = 200.0;
const NESTED_STEP_SMALL_M: f64 = 200.0;
const NESTED_STEP_LARGE_M: f64 = 500.0;
const NESTED_LARGE_BAND_M: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleResult {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub mean_wind_direction_deg: f64,
    pub mean_wind_speed_mps: f64,
}

/// Where to leave the aircraft to reach the target under canopy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitCircles {
    /// Reach the landing point using the whole canopy ride
    pub full: CircleResult,
    /// Reach the start of the downwind leg
    pub downwind: CircleResult,
    pub freefall_direction_deg: f64,
    pub freefall_distance_m: f64,
    pub freefall_time_s: f64,
}

/// Reachability for one assumed opening height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NestedCircle {
    /// Top of the canopy band above ground, meters
    pub upper_limit_agl_m: f64,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub displacement_m: f64,
    pub direction_deg: f64,
}

/// Where the canopy must be opened to reach the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanopyCircles {
    pub downwind_anchor: GeoPoint,
    pub landing_point: GeoPoint,
    pub downwind_center: GeoPoint,
    pub full_center: GeoPoint,
    pub radius_m: f64,
    pub radius_full_m: f64,
    pub displacement_m: f64,
    pub direction_deg: f64,
    pub displacement_full_m: f64,
    pub direction_full_deg: f64,
    pub mean_wind_full: MeanWind,
    pub nested: Vec<NestedCircle>,
}

/// Canopy glide inputs shared by exit and canopy circles.
struct CanopyBands {
    canopy_mps: f64,
    reduction_m: f64,
    fly_time_s: f64,
    fly_time_full_s: f64,
    mean_wind: MeanWind,
    mean_wind_full: MeanWind,
}

impl CanopyBands {
    fn new(columns: &ProfileColumns, elevation_m: f64, settings: &JumpSettings) -> Result<Self, PlanError> {
        let canopy_mps = knots_to_mps(settings.canopy_speed_kt);
        let descent = settings.descent_rate_mps;
        let safety = settings.safety_height_m;
        let downwind_leg = settings.leg_height_downwind_m;
        let open_height = settings.opening_altitude_m - CANOPY_OPENING_BUFFER_M;
        if open_height <= safety + downwind_leg {
            return Err(PlanError::OpeningBelowPattern {
                open_height_m: open_height,
                pattern_top_m: safety + downwind_leg,
            });
        }

        let top = elevation_m + open_height;
        Ok(Self {
            canopy_mps,
            reduction_m: safety / descent * canopy_mps,
            fly_time_s: (open_height - downwind_leg) / descent,
            fly_time_full_s: open_height / descent,
            mean_wind: profile_mean_wind(columns, elevation_m + safety + downwind_leg, top)?,
            mean_wind_full: profile_mean_wind(columns, elevation_m + safety, top)?,
        })
    }

    fn radius(&self, fly_time_s: f64) -> f64 {
        (fly_time_s * self.canopy_mps - self.reduction_m).max(0.0)
    }

    fn displacement(&self) -> f64 {
        self.mean_wind.speed_mps * self.fly_time_s
    }

    fn displacement_full(&self) -> f64 {
        self.mean_wind_full.speed_mps * self.fly_time_full_s
    }
}

fn downwind_anchor(landing_point: GeoPoint, downwind_start: Option<GeoPoint>) -> GeoPoint {
    downwind_start
        .filter(GeoPoint::is_valid)
        .unwrap_or(landing_point)
}

/// Exit circles for the full canopy ride and for reaching the downwind leg.
///
/// `downwind_start` is the start of the landing pattern's downwind leg;
/// without it the landing point is used.
pub fn calculate_exit_circles(
    samples: &[WindProfileSample],
    landing_point: GeoPoint,
    elevation_m: f64,
    settings: &JumpSettings,
    downwind_start: Option<GeoPoint>,
    freefall: &FreefallResult,
) -> Result<ExitCircles, PlanError> {
    let columns = ProfileColumns::from_samples(samples)?;
    if !landing_point.is_valid() {
        return Err(PlanError::InvalidLocation {
            lat: landing_point.lat,
            lng: landing_point.lng,
        });
    }
    let bands = CanopyBands::new(&columns, elevation_m, settings)?;
    let anchor = downwind_anchor(landing_point, downwind_start);

    let open_center = anchor.destination(bands.displacement(), bands.mean_wind.direction_deg);
    let open_center_full =
        landing_point.destination(bands.displacement_full(), bands.mean_wind_full.direction_deg);

    let back = normalize_angle(freefall.direction_deg + 180.0);
    Ok(ExitCircles {
        full: CircleResult {
            center: open_center_full.destination(freefall.distance_m, back),
            radius_m: bands.radius(bands.fly_time_full_s),
            mean_wind_direction_deg: bands.mean_wind_full.direction_deg,
            mean_wind_speed_mps: bands.mean_wind_full.speed_mps,
        },
        downwind: CircleResult {
            center: open_center.destination(freefall.distance_m, back),
            radius_m: bands.radius(bands.fly_time_s),
            mean_wind_direction_deg: bands.mean_wind.direction_deg,
            mean_wind_speed_mps: bands.mean_wind.speed_mps,
        },
        freefall_direction_deg: freefall.direction_deg,
        freefall_distance_m: freefall.distance_m,
        freefall_time_s: freefall.time_s,
    })
}

/// Canopy circles plus nested circles for lower opening heights.
///
/// Nested circles step the band top down from the opening height in 200 m
/// (bands up to 1000 m) or 500 m decrements while at least 200 m of band
/// remains above the downwind leg.
pub fn calculate_canopy_circles(
    samples: &[WindProfileSample],
    landing_point: GeoPoint,
    elevation_m: f64,
    settings: &JumpSettings,
    downwind_start: Option<GeoPoint>,
) -> Result<CanopyCircles, PlanError> {
    let columns = ProfileColumns::from_samples(samples)?;
    if !landing_point.is_valid() {
        return Err(PlanError::InvalidLocation {
            lat: landing_point.lat,
            lng: landing_point.lng,
        });
    }
    let bands = CanopyBands::new(&columns, elevation_m, settings)?;
    let anchor = downwind_anchor(landing_point, downwind_start);

    let upper = elevation_m + settings.opening_altitude_m - CANOPY_OPENING_BUFFER_M;
    let lower = elevation_m + settings.leg_height_downwind_m;
    let decrement = if upper - lower <= NESTED_LARGE_BAND_M {
        NESTED_STEP_SMALL_M
    } else {
        NESTED_STEP_LARGE_M
    };

    let mut nested = Vec::new();
    let mut current = upper;
    while current >= lower + NESTED_MIN_BAND_M {
        let fly_time = (current - lower) / settings.descent_rate_mps;
        if fly_time > 0.0 {
            let wind = profile_mean_wind(&columns, lower, current)?;
            let displacement = wind.speed_mps * fly_time;
            nested.push(NestedCircle {
                upper_limit_agl_m: current - elevation_m,
                center: anchor.destination(displacement, wind.direction_deg),
                radius_m: bands.radius(fly_time),
                displacement_m: displacement,
                direction_deg: wind.direction_deg,
            });
        }
        current -= decrement;
    }

    let displacement = bands.displacement();
    let displacement_full = bands.displacement_full();
    Ok(CanopyCircles {
        downwind_anchor: anchor,
        landing_point,
        downwind_center: anchor.destination(displacement, bands.mean_wind.direction_deg),
        full_center: landing_point.destination(displacement_full, bands.mean_wind_full.direction_deg),
        radius_m: bands.radius(bands.fly_time_s),
        radius_full_m: bands.radius(bands.fly_time_full_s),
        displacement_m: displacement,
        direction_deg: bands.mean_wind.direction_deg,
        displacement_full_m: displacement_full,
        direction_full_deg: bands.mean_wind_full.direction_deg,
        mean_wind_full: bands.mean_wind_full,
        nested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures;
    use crate::spatial::bearing_deg;

    const DIP: GeoPoint = GeoPoint { lat: 50.0, lng: 7.0 };

    fn still_freefall() -> FreefallResult {
        FreefallResult {
            time_s: 40.0,
            distance_m: 0.0,
            direction_deg: 0.0,
            final_height_m: 1000.0,
            final_vertical_velocity_mps: -55.0,
            trajectory: Vec::new(),
            path: Vec::new(),
        }
    }

    #[test]
    fn calm_exit_circle_is_centred_on_target() {
        let profile = fixtures::constant_wind(0.0, 0.0, 4000.0, 200.0);
        let settings = JumpSettings::default();
        let circles = calculate_exit_circles(&profile, DIP, 0.0, &settings, None, &still_freefall()).unwrap();
        assert!(circles.full.center.distance_to(&DIP) < 1e-6);

        let expected = 1000.0 / 3.5 * knots_to_mps(20.0);
        assert!((circles.full.radius_m - expected).abs() < 1e-6, "radius {}", circles.full.radius_m);
        let expected_downwind = 700.0 / 3.5 * knots_to_mps(20.0);
        assert!((circles.downwind.radius_m - expected_downwind).abs() < 1e-6);
    }

    #[test]
    fn exit_circle_moves_upwind_and_against_freefall_drift() {
        let profile = fixtures::constant_wind(270.0, 5.0, 4000.0, 200.0);
        let settings = JumpSettings::default();
        let freefall = FreefallResult {
            distance_m: 300.0,
            direction_deg: 90.0,
            ..still_freefall()
        };
        let circles = calculate_exit_circles(&profile, DIP, 0.0, &settings, None, &freefall).unwrap();
        let canopy_drift = 5.0 * 1000.0 / 3.5;
        let expected = canopy_drift + 300.0;
        let d = circles.full.center.distance_to(&DIP);
        assert!((d - expected).abs() < 1.0, "distance {d}, expected {expected}");
        let b = bearing_deg(DIP.lat, DIP.lng, circles.full.center.lat, circles.full.center.lng);
        assert!((b - 270.0).abs() < 0.1, "bearing {b}");
        assert!((circles.full.mean_wind_direction_deg - 270.0).abs() < 1e-6);
    }

    #[test]
    fn safety_height_shrinks_radius() {
        let profile = fixtures::constant_wind(0.0, 0.0, 4000.0, 200.0);
        let base = JumpSettings::default();
        let reduced = JumpSettings {
            safety_height_m: 100.0,
            ..JumpSettings::default()
        };
        let a = calculate_canopy_circles(&profile, DIP, 0.0, &base, None).unwrap();
        let b = calculate_canopy_circles(&profile, DIP, 0.0, &reduced, None).unwrap();
        let reduction = 100.0 / 3.5 * knots_to_mps(20.0);
        assert!((a.radius_full_m - b.radius_full_m - reduction).abs() < 1e-6);
        assert!((a.radius_m - b.radius_m - reduction).abs() < 1e-6);
    }

    #[test]
    fn opening_at_or_below_the_pattern_is_rejected() {
        let profile = fixtures::constant_wind(0.0, 3.0, 4000.0, 200.0);
        // 500 m opening leaves 300 m of canopy ride, exactly the downwind leg
        let at_pattern = JumpSettings {
            opening_altitude_m: 500.0,
            ..JumpSettings::default()
        };
        let expected = Err(PlanError::OpeningBelowPattern {
            open_height_m: 300.0,
            pattern_top_m: 300.0,
        });
        assert_eq!(calculate_canopy_circles(&profile, DIP, 0.0, &at_pattern, None), expected);
        assert!(matches!(
            calculate_exit_circles(&profile, DIP, 0.0, &at_pattern, None, &still_freefall()),
            Err(PlanError::OpeningBelowPattern { .. })
        ));

        let above = JumpSettings {
            opening_altitude_m: 501.0,
            ..JumpSettings::default()
        };
        let circles = calculate_canopy_circles(&profile, DIP, 0.0, &above, None).unwrap();
        assert!(circles.radius_m > 0.0);
        assert!(circles.nested.is_empty());

        // safety height eats into the same band
        let safe = JumpSettings {
            safety_height_m: 700.0,
            ..JumpSettings::default()
        };
        assert!(matches!(
            calculate_canopy_circles(&profile, DIP, 0.0, &safe, None),
            Err(PlanError::OpeningBelowPattern { .. })
        ));
    }

    #[test]
    fn nested_circles_step_down_the_band() {
        let profile = fixtures::constant_wind(180.0, 4.0, 4000.0, 200.0);
        // band 300..1000 m is 700 m tall: 200 m steps
        let settings = JumpSettings::default();
        let circles = calculate_canopy_circles(&profile, DIP, 0.0, &settings, None).unwrap();
        let tops: Vec<f64> = circles.nested.iter().map(|c| c.upper_limit_agl_m).collect();
        assert_eq!(tops, vec![1000.0, 800.0, 600.0]);
        assert!(circles.nested.windows(2).all(|w| w[0].radius_m > w[1].radius_m));

        // band 300..2300 m is 2000 m tall: 500 m steps
        let high = JumpSettings {
            opening_altitude_m: 2500.0,
            ..JumpSettings::default()
        };
        let circles = calculate_canopy_circles(&profile, DIP, 0.0, &high, None).unwrap();
        let tops: Vec<f64> = circles.nested.iter().map(|c| c.upper_limit_agl_m).collect();
        assert_eq!(tops, vec![2300.0, 1800.0, 1300.0, 800.0]);
    }

    #[test]
    fn downwind_anchor_is_used_when_valid() {
        let profile = fixtures::constant_wind(0.0, 0.0, 4000.0, 200.0);
        let anchor = DIP.destination(400.0, 45.0);
        let circles =
            calculate_canopy_circles(&profile, DIP, 0.0, &JumpSettings::default(), Some(anchor)).unwrap();
        assert_eq!(circles.downwind_anchor, anchor);

        let invalid = GeoPoint::new(f64::NAN, 0.0);
        let circles =
            calculate_canopy_circles(&profile, DIP, 0.0, &JumpSettings::default(), Some(invalid)).unwrap();
        assert_eq!(circles.downwind_anchor, DIP);
    }

    #[test]
    fn berlin_sounding_exit_circle() {
        let profile = fixtures::berlin_sounding();
        let dip = GeoPoint::new(52.52, 13.41);
        let freefall = crate::freefall::simulate(
            &profile,
            &crate::freefall::FreefallParams {
                exit_altitude_m: 3000.0,
                opening_altitude_m: 1200.0,
                origin: dip,
                elevation_m: 38.0,
                jump_run_direction_deg: 225.0,
                aircraft_tas_mps: 104.47 * 0.514444,
            },
        )
        .unwrap();

        let circles = calculate_exit_circles(&profile, dip, 38.0, &JumpSettings::default(), None, &freefall).unwrap();
        assert!((circles.full.mean_wind_direction_deg - 235.901884).abs() < 1e-5);
        assert!((circles.full.mean_wind_speed_mps - 9.470316).abs() < 1e-5);
        assert!((circles.full.center.lat - 52.5089306).abs() < 1e-7, "lat {}", circles.full.center.lat);
        assert!((circles.full.center.lng - 13.3801470).abs() < 1e-7, "lng {}", circles.full.center.lng);
        assert!((circles.freefall_distance_m - 361.341737).abs() < 1e-4);
    }
}
