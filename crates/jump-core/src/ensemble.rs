//! Combine several model runs into one scenario time slice.

use crate::builder::{PressureLevel, RawTimeSlice, SurfaceObservation};
use crate::wind::{wind_direction, wind_speed, WindVector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How ensemble members are reduced to a single profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleScenario {
    /// Weakest member wind at every level
    MinWind,
    /// Vector mean of all member winds
    #[default]
    MeanWind,
    /// Strongest member wind at every level
    MaxWind,
}

/// Reduce `members` level by level according to `scenario`.
///
/// Scalars use the min, max or arithmetic mean of the members that report
/// them. Winds pick the member with the extreme speed (keeping its
/// direction) or average the vector components. Returns `None` without
/// members.
pub fn combine_ensemble(members: &[RawTimeSlice], scenario: EnsembleScenario) -> Option<RawTimeSlice> {
    let first = members.first()?;

    let surfaces: Vec<&SurfaceObservation> = members.iter().map(|m| &m.surface).collect();
    let (surface_speed, surface_dir) = combine_wind(
        surfaces
            .iter()
            .map(|s| (s.wind_speed_10m_mps, s.wind_direction_10m_deg)),
        scenario,
    );
    let surface = SurfaceObservation {
        pressure_hpa: combine_scalar(surfaces.iter().map(|s| s.pressure_hpa), scenario),
        temperature_2m_c: combine_scalar(surfaces.iter().map(|s| s.temperature_2m_c), scenario),
        relative_humidity_2m_pct: combine_scalar(surfaces.iter().map(|s| s.relative_humidity_2m_pct), scenario),
        wind_speed_10m_mps: surface_speed,
        wind_direction_10m_deg: surface_dir,
    };

    let mut pressures: Vec<f64> = members
        .iter()
        .flat_map(|m| m.levels.iter().map(|l| l.pressure_hpa))
        .filter(|p| p.is_finite())
        .collect();
    pressures.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    pressures.dedup();

    let levels = pressures
        .into_iter()
        .map(|pressure| {
            let at_level: Vec<&PressureLevel> = members
                .iter()
                .filter_map(|m| m.levels.iter().find(|l| l.pressure_hpa == pressure))
                .collect();
            let (speed, direction) = combine_wind(
                at_level.iter().map(|l| (l.wind_speed_mps, l.wind_direction_deg)),
                scenario,
            );
            PressureLevel {
                pressure_hpa: pressure,
                geopotential_height_m: combine_scalar(at_level.iter().map(|l| l.geopotential_height_m), scenario),
                temperature_c: combine_scalar(at_level.iter().map(|l| l.temperature_c), scenario),
                relative_humidity_pct: combine_scalar(at_level.iter().map(|l| l.relative_humidity_pct), scenario),
                wind_speed_mps: speed,
                wind_direction_deg: direction,
            }
        })
        .collect();

    Some(RawTimeSlice {
        valid_time: first.valid_time,
        surface,
        levels,
    })
}

fn combine_scalar(values: impl Iterator<Item = Option<f64>>, scenario: EnsembleScenario) -> Option<f64> {
    let values: Vec<f64> = values.flatten().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    Some(match scenario {
        EnsembleScenario::MinWind => values.iter().copied().fold(f64::INFINITY, f64::min),
        EnsembleScenario::MaxWind => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        EnsembleScenario::MeanWind => values.iter().sum::<f64>() / values.len() as f64,
    })
}

fn combine_wind(
    pairs: impl Iterator<Item = (Option<f64>, Option<f64>)>,
    scenario: EnsembleScenario,
) -> (Option<f64>, Option<f64>) {
    let winds: Vec<(f64, f64)> = pairs
        .filter_map(|(speed, dir)| Some((speed?, dir?)))
        .filter(|(speed, dir)| speed.is_finite() && dir.is_finite())
        .collect();
    if winds.is_empty() {
        return (None, None);
    }

    let by_speed = |a: &&(f64, f64), b: &&(f64, f64)| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal);
    let chosen = match scenario {
        // first member wins ties
        EnsembleScenario::MinWind => winds.iter().min_by(by_speed),
        EnsembleScenario::MaxWind => winds.iter().rev().max_by(by_speed),
        EnsembleScenario::MeanWind => {
            let n = winds.len() as f64;
            let sum = winds.iter().fold(WindVector::default(), |acc, (speed, dir)| {
                let w = WindVector::from_direction(*dir, *speed);
                WindVector::new(acc.u + w.u, acc.v + w.v)
            });
            let (u, v) = (sum.u / n, sum.v / n);
            return (Some(wind_speed(u, v)), Some(wind_direction(u, v)));
        }
    };
    match chosen {
        Some((speed, dir)) => (Some(*speed), Some(*dir)),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(speed: f64, dir: f64, height: f64) -> RawTimeSlice {
        RawTimeSlice {
            valid_time: None,
            surface: SurfaceObservation {
                pressure_hpa: Some(1010.0),
                temperature_2m_c: Some(10.0 + speed),
                relative_humidity_2m_pct: Some(60.0),
                wind_speed_10m_mps: Some(speed),
                wind_direction_10m_deg: Some(dir),
            },
            levels: vec![PressureLevel {
                pressure_hpa: 850.0,
                geopotential_height_m: Some(height),
                temperature_c: Some(2.0),
                relative_humidity_pct: Some(50.0),
                wind_speed_mps: Some(speed * 2.0),
                wind_direction_deg: Some(dir),
            }],
        }
    }

    #[test]
    fn min_and_max_keep_the_member_direction() {
        let members = [member(4.0, 200.0, 1500.0), member(8.0, 260.0, 1480.0)];
        let min = combine_ensemble(&members, EnsembleScenario::MinWind).unwrap();
        assert_eq!(min.surface.wind_speed_10m_mps, Some(4.0));
        assert_eq!(min.surface.wind_direction_10m_deg, Some(200.0));
        assert_eq!(min.levels[0].geopotential_height_m, Some(1480.0));

        let max = combine_ensemble(&members, EnsembleScenario::MaxWind).unwrap();
        assert_eq!(max.levels[0].wind_speed_mps, Some(16.0));
        assert_eq!(max.levels[0].wind_direction_deg, Some(260.0));
        assert_eq!(max.surface.temperature_2m_c, Some(18.0));
    }

    #[test]
    fn mean_averages_vectors_not_directions() {
        // opposite winds cancel out
        let members = [member(5.0, 90.0, 1500.0), member(5.0, 270.0, 1500.0)];
        let mean = combine_ensemble(&members, EnsembleScenario::MeanWind).unwrap();
        let Some(speed) = mean.surface.wind_speed_10m_mps else {
            panic!("mean wind missing");
        };
        assert!(speed < 1e-9, "speed {speed}");
        assert_eq!(mean.surface.temperature_2m_c, Some(15.0));
    }

    #[test]
    fn missing_values_are_skipped() {
        let mut a = member(4.0, 200.0, 1500.0);
        a.levels[0].temperature_c = None;
        let b = member(6.0, 220.0, 1520.0);
        let mean = combine_ensemble(&[a, b], EnsembleScenario::MeanWind).unwrap();
        assert_eq!(mean.levels[0].temperature_c, Some(2.0));
        assert_eq!(mean.levels[0].geopotential_height_m, Some(1510.0));
    }

    #[test]
    fn no_members_no_slice() {
        assert_eq!(combine_ensemble(&[], EnsembleScenario::MeanWind), None);
    }
}
