//! Wind profile samples and their column views.

use crate::error::ProfileError;
use crate::wind::WindVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One altitude sample of an interpolated wind profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindProfileSample {
    /// Height above mean sea level in meters
    pub height_m: f64,
    /// Pressure in hPa, `None` where it could not be interpolated
    #[serde(default)]
    pub pressure_hpa: Option<f64>,
    pub temperature_c: f64,
    pub relative_humidity_pct: f64,
    pub wind_speed_mps: f64,
    /// Direction the wind blows from
    pub wind_direction_deg: f64,
    #[serde(default)]
    pub dewpoint_c: Option<f64>,
}

impl WindProfileSample {
    pub fn wind(&self) -> WindVector {
        WindVector::from_direction(self.wind_direction_deg, self.wind_speed_mps)
    }

    fn is_finite(&self) -> bool {
        self.height_m.is_finite()
            && self.temperature_c.is_finite()
            && self.wind_speed_mps.is_finite()
            && self.wind_direction_deg.is_finite()
    }
}

/// An ordered wind profile for one forecast time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindProfile {
    #[serde(default)]
    pub valid_time: Option<DateTime<Utc>>,
    /// Ground elevation the profile was resampled from, meters AMSL
    #[serde(default)]
    pub surface_elevation_m: Option<f64>,
    pub samples: Vec<WindProfileSample>,
}

impl WindProfile {
    pub fn new(samples: Vec<WindProfileSample>) -> Self {
        Self {
            valid_time: None,
            surface_elevation_m: None,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check the invariants every calculator relies on.
    pub fn validate(&self) -> Result<(), ProfileError> {
        ProfileColumns::from_samples(&self.samples).map(|_| ())
    }
}

/// Column-major view of a validated profile.
///
/// Calculators build this once and interpolate over its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileColumns {
    pub heights: Vec<f64>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub temperatures: Vec<f64>,
    pub pressures: Vec<Option<f64>>,
}

impl ProfileColumns {
    /// Validate `samples` and split them into columns.
    ///
    /// Requires at least two samples with finite values and strictly
    /// monotonic heights (ascending or descending).
    pub fn from_samples(samples: &[WindProfileSample]) -> Result<Self, ProfileError> {
        match samples.len() {
            0 => return Err(ProfileError::Empty),
            1 => return Err(ProfileError::TooFewSamples(1)),
            _ => {}
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(ProfileError::NonFiniteValue { index });
        }

        let ascending = samples[1].height_m > samples[0].height_m;
        let broken = samples.windows(2).position(|w| {
            if ascending {
                w[1].height_m <= w[0].height_m
            } else {
                w[1].height_m >= w[0].height_m
            }
        });
        if let Some(i) = broken {
            return Err(ProfileError::NonMonotonicHeights { index: i + 1 });
        }

        let winds: Vec<WindVector> = samples.iter().map(WindProfileSample::wind).collect();
        Ok(Self {
            heights: samples.iter().map(|s| s.height_m).collect(),
            u: winds.iter().map(|w| w.u).collect(),
            v: winds.iter().map(|w| w.v).collect(),
            temperatures: samples.iter().map(|s| s.temperature_c).collect(),
            pressures: samples.iter().map(|s| s.pressure_hpa).collect(),
        })
    }

    /// Pressure of the lowest sample, if it is known.
    pub fn surface_pressure_hpa(&self) -> Option<f64> {
        let lowest = self
            .heights
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)?;
        self.pressures[lowest].filter(|p| p.is_finite() && *p > 0.0)
    }

    pub fn lowest_height(&self) -> f64 {
        self.heights.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn highest_height(&self) -> f64 {
        self.heights.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_reject_short_profiles() {
        assert_eq!(ProfileColumns::from_samples(&[]), Err(ProfileError::Empty));
        let one = fixtures::constant_wind(270.0, 5.0, 0.0, 100.0);
        assert_eq!(ProfileColumns::from_samples(&one), Err(ProfileError::TooFewSamples(1)));
    }

    #[test]
    fn columns_reject_non_monotonic_heights() {
        let mut samples = fixtures::constant_wind(270.0, 5.0, 1000.0, 250.0);
        samples[3].height_m = samples[2].height_m;
        assert_eq!(
            ProfileColumns::from_samples(&samples),
            Err(ProfileError::NonMonotonicHeights { index: 3 })
        );
    }

    #[test]
    fn columns_reject_non_finite_values() {
        let mut samples = fixtures::constant_wind(270.0, 5.0, 1000.0, 250.0);
        samples[2].wind_speed_mps = f64::NAN;
        assert_eq!(
            ProfileColumns::from_samples(&samples),
            Err(ProfileError::NonFiniteValue { index: 2 })
        );
    }

    #[test]
    fn descending_profiles_are_accepted() {
        let mut samples = fixtures::constant_wind(90.0, 4.0, 2000.0, 500.0);
        samples.reverse();
        let cols = ProfileColumns::from_samples(&samples).unwrap();
        assert_eq!(cols.lowest_height(), 0.0);
        assert_eq!(cols.highest_height(), 2000.0);
        // easterly wind blows towards the west
        assert!((cols.u[0] + 4.0).abs() < 1e-9);
    }

    #[test]
    fn surface_pressure_comes_from_lowest_sample() {
        let mut samples = fixtures::constant_wind(90.0, 4.0, 2000.0, 500.0);
        samples.reverse();
        let cols = ProfileColumns::from_samples(&samples).unwrap();
        assert_eq!(cols.surface_pressure_hpa(), Some(1013.25));

        samples.last_mut().unwrap().pressure_hpa = None;
        let cols = ProfileColumns::from_samples(&samples).unwrap();
        assert_eq!(cols.surface_pressure_hpa(), None);
    }
}
