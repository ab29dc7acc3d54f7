//! Vertical interpolation of profile quantities over height or log-pressure.

use crate::error::InterpolationError;
use crate::wind::WindVector;

/// Linear interpolation with linear extrapolation beyond both ends.
///
/// `xs` may be ascending or descending. Values outside the sampled range
/// are extrapolated from the nearest segment rather than clamped.
///
/// # Arguments
/// * `xs` - Monotonic sample positions
/// * `ys` - Sample values, same length as `xs`
/// * `x` - Query position
pub fn linear_interpolate(xs: &[f64], ys: &[f64], x: f64) -> Result<f64, InterpolationError> {
    if xs.is_empty() || ys.is_empty() {
        return Err(InterpolationError::Empty);
    }
    if xs.len() != ys.len() {
        return Err(InterpolationError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }

    let n = xs.len();
    if n == 1 {
        return Ok(ys[0]);
    }

    // Walk the samples in descending order of x.
    let ascending = xs[1] > xs[0];
    let point = |i: usize| {
        if ascending {
            (xs[n - 1 - i], ys[n - 1 - i])
        } else {
            (xs[i], ys[i])
        }
    };

    let (top, _) = point(0);
    let (bottom, _) = point(n - 1);
    let upper = if x > top {
        1
    } else if x < bottom {
        n - 1
    } else {
        (1..n).find(|&i| x >= point(i).0).unwrap_or(n - 1)
    };

    let (x0, y0) = point(upper - 1);
    let (x1, y1) = point(upper);
    if x == x0 {
        return Ok(y0);
    }
    if x1 == x0 {
        return Ok(y1);
    }
    let slope = (y1 - y0) / (x1 - x0);
    Ok(y1 + slope * (x - x1))
}

/// Pressure at `height` from the bracketing samples.
///
/// Unlike [`linear_interpolate`], this never extrapolates: heights outside
/// the sampled range yield `None`.
pub fn interpolate_pressure(height: f64, pressures: &[f64], heights: &[f64]) -> Option<f64> {
    if pressures.len() != heights.len() || heights.len() < 2 || !height.is_finite() {
        return None;
    }

    heights.windows(2).zip(pressures.windows(2)).find_map(|(h, p)| {
        let (lo, hi) = if h[0] <= h[1] { (h[0], h[1]) } else { (h[1], h[0]) };
        if height < lo || height > hi {
            return None;
        }
        if h[1] == h[0] {
            return Some(p[0]);
        }
        Some(p[0] + (p[1] - p[0]) * (height - h[0]) / (h[1] - h[0]))
    })
}

/// Wind components at altitude `z` by two-stage log-pressure interpolation.
///
/// Pressure at `z` is found by interpolating `ln(p)` over height; `u` and `v`
/// are then interpolated over `ln(p)` at that pressure.
pub fn interpolate_wind_at_altitude(
    z: f64,
    pressures: &[f64],
    heights: &[f64],
    u: &[f64],
    v: &[f64],
) -> Result<WindVector, InterpolationError> {
    let n = heights.len();
    for other in [pressures.len(), u.len(), v.len()] {
        if other != n {
            return Err(InterpolationError::LengthMismatch { xs: n, ys: other });
        }
    }

    let log_p: Vec<f64> = pressures.iter().map(|p| p.ln()).collect();
    let log_p_z = linear_interpolate(heights, &log_p, z)?;

    Ok(WindVector {
        u: linear_interpolate(&log_p, u, log_p_z)?,
        v: linear_interpolate(&log_p, v, log_p_z)?,
    })
}
