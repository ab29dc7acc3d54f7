//! Height-integrated mean wind over a layer.

use crate::error::MeanWindError;
use crate::interpolation::linear_interpolate;
use crate::profile::ProfileColumns;
use crate::wind::{wind_direction, wind_speed, WindVector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Mean wind of a height layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanWind {
    pub direction_deg: f64,
    pub speed_mps: f64,
    pub u: f64,
    pub v: f64,
}

impl MeanWind {
    pub fn vector(&self) -> WindVector {
        WindVector::new(self.u, self.v)
    }
}

/// Trapezoidal mean of the wind vector between two heights.
///
/// The layer limits are interpolated (or extrapolated) from the samples and
/// combined with every sample strictly inside the layer. The limits may be
/// given in either order.
///
/// # Arguments
/// * `heights` - Sample heights in meters, ascending or descending
/// * `u`, `v` - Wind components at each height
/// * `lower_limit`, `upper_limit` - Layer bounds in meters
pub fn calculate_mean_wind(
    heights: &[f64],
    u: &[f64],
    v: &[f64],
    lower_limit: f64,
    upper_limit: f64,
) -> Result<MeanWind, MeanWindError> {
    if heights.len() < 2 {
        return Err(MeanWindError::TooFewSamples(heights.len()));
    }
    if u.len() != heights.len() || v.len() != heights.len() {
        return Err(MeanWindError::LengthMismatch);
    }
    if !lower_limit.is_finite() || !upper_limit.is_finite() {
        return Err(MeanWindError::InvalidLimits {
            lower: lower_limit,
            upper: upper_limit,
        });
    }
    if lower_limit == upper_limit {
        return Err(MeanWindError::ZeroSpan(lower_limit));
    }

    let (bottom, top) = if lower_limit < upper_limit {
        (lower_limit, upper_limit)
    } else {
        (upper_limit, lower_limit)
    };

    let mut layer = vec![
        (top, linear_interpolate(heights, u, top)?, linear_interpolate(heights, v, top)?),
        (
            bottom,
            linear_interpolate(heights, u, bottom)?,
            linear_interpolate(heights, v, bottom)?,
        ),
    ];
    layer.extend(
        heights
            .iter()
            .zip(u.iter().zip(v.iter()))
            .filter(|(h, _)| **h > bottom && **h < top)
            .map(|(h, (u, v))| (*h, *u, *v)),
    );
    layer.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let (sum_u, sum_v) = layer.windows(2).fold((0.0, 0.0), |(su, sv), w| {
        let dh = w[0].0 - w[1].0;
        (su + 0.5 * (w[0].1 + w[1].1) * dh, sv + 0.5 * (w[0].2 + w[1].2) * dh)
    });

    let span = top - bottom;
    let mean_u = sum_u / span;
    let mean_v = sum_v / span;

    Ok(MeanWind {
        direction_deg: wind_direction(mean_u, mean_v),
        speed_mps: wind_speed(mean_u, mean_v),
        u: mean_u,
        v: mean_v,
    })
}

/// [`calculate_mean_wind`] over the columns of a validated profile.
pub fn profile_mean_wind(
    columns: &ProfileColumns,
    lower_limit: f64,
    upper_limit: f64,
) -> Result<MeanWind, MeanWindError> {
    calculate_mean_wind(&columns.heights, &columns.u, &columns.v, lower_limit, upper_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures;

    fn columns(samples: &[crate::profile::WindProfileSample]) -> ProfileColumns {
        ProfileColumns::from_samples(samples).unwrap()
    }

    #[test]
    fn westerly_ten_mps_layer() {
        let cols = columns(&fixtures::constant_wind(270.0, 10.0, 4000.0, 250.0));
        let mean = profile_mean_wind(&cols, 0.0, 4000.0).unwrap();
        assert!((mean.direction_deg - 270.0).abs() < 1e-6, "dir {}", mean.direction_deg);
        assert!((mean.speed_mps - 10.0).abs() < 1e-9, "speed {}", mean.speed_mps);
    }

    #[test]
    fn constant_wind_is_independent_of_bounds() {
        let cols = columns(&fixtures::constant_wind(135.0, 6.0, 3000.0, 100.0));
        for (lower, upper) in [(0.0, 3000.0), (120.0, 470.0), (1000.0, 1001.0), (-200.0, 5000.0)] {
            let mean = profile_mean_wind(&cols, lower, upper).unwrap();
            assert!((mean.direction_deg - 135.0).abs() < 1e-6, "[{lower},{upper}] dir {}", mean.direction_deg);
            assert!((mean.speed_mps - 6.0).abs() < 1e-9, "[{lower},{upper}] speed {}", mean.speed_mps);
        }
    }

    #[test]
    fn linear_shear_averages_to_midlayer_value() {
        let heights = [0.0, 1000.0, 2000.0];
        let u = [0.0, 5.0, 10.0];
        let v = [0.0, 0.0, 0.0];
        let mean = calculate_mean_wind(&heights, &u, &v, 0.0, 2000.0).unwrap();
        assert!((mean.u - 5.0).abs() < 1e-9);
        // air moving east means a westerly wind
        assert!((mean.direction_deg - 270.0).abs() < 1e-9);
    }

    #[test]
    fn limits_in_either_order_agree() {
        let cols = columns(&fixtures::veering(100.0));
        let a = profile_mean_wind(&cols, 300.0, 1700.0).unwrap();
        let b = profile_mean_wind(&cols, 1700.0, 300.0).unwrap();
        assert!((a.u - b.u).abs() < 1e-12 && (a.v - b.v).abs() < 1e-12);
    }

    #[test]
    fn zero_span_is_an_error() {
        let cols = columns(&fixtures::veering(0.0));
        assert_eq!(profile_mean_wind(&cols, 500.0, 500.0), Err(MeanWindError::ZeroSpan(500.0)));
    }

    #[test]
    fn too_few_samples_is_an_error() {
        assert_eq!(
            calculate_mean_wind(&[10.0], &[1.0], &[1.0], 0.0, 100.0),
            Err(MeanWindError::TooFewSamples(1))
        );
        assert_eq!(
            calculate_mean_wind(&[0.0, 10.0], &[1.0], &[1.0, 2.0], 0.0, 100.0),
            Err(MeanWindError::LengthMismatch)
        );
    }
}
