//! Regression basis functions for the additive demand model.
//!
//! The model is linear in its coefficients:
//!
//! ```text
//! y(t) = level + slope * t + Σ δ_k * hinge(t, s_k) + Σ (a_j sin(ω_j d) + b_j cos(ω_j d))
//! ```
//!
//! where `t` is scaled time in `[0, 1]`, `d` is days since the series origin,
//! and `ω_j = 2π j / period`. Hinge terms give the trend a piecewise-linear
//! shape with slope changes at the knots; Fourier pairs capture periodic
//! demand patterns without day-of-week dummies.

use std::f64::consts::TAU;

/// Piecewise-linear trend basis: zero before the knot, linear after.
pub fn hinge(t: f64, knot: f64) -> f64 {
    (t - knot).max(0.0)
}

/// Fill `out` with interleaved `sin`/`cos` Fourier terms of the given order.
///
/// `d` is time in days, `period` the seasonal period in days.
///
/// # Panics
/// Panics if `out` does not have length `2 * order`. Callers size the slice
/// from `SeasonalStructure::fourier_cols`.
pub fn fill_fourier(d: f64, period: f64, order: usize, out: &mut [f64]) {
    debug_assert_eq!(out.len(), 2 * order);
    for j in 1..=order {
        let angle = TAU * (j as f64) * d / period;
        out[2 * (j - 1)] = angle.sin();
        out[2 * (j - 1) + 1] = angle.cos();
    }
}

/// Uniform changepoint knots over `(0, range]` on the scaled time axis.
///
/// Candidate changepoints cover only the first part of history, leaving the
/// tail to determine the final slope that gets extrapolated.
pub fn changepoint_knots(count: usize, range: f64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let range = range.clamp(0.0, 1.0);
    (1..=count)
        .map(|k| range * (k as f64) / (count as f64 + 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hinge_is_zero_before_knot_linear_after() {
        assert_eq!(hinge(0.2, 0.5), 0.0);
        assert_eq!(hinge(0.5, 0.5), 0.0);
        assert!((hinge(0.75, 0.5) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn fourier_repeats_at_the_period() {
        let mut a = vec![0.0; 6];
        let mut b = vec![0.0; 6];
        fill_fourier(3.0, 7.0, 3, &mut a);
        fill_fourier(3.0 + 7.0, 7.0, 3, &mut b);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn knots_are_ascending_and_inside_range() {
        let knots = changepoint_knots(5, 0.8);
        assert_eq!(knots.len(), 5);
        for w in knots.windows(2) {
            assert!(w[0] < w[1]);
        }
        assert!(*knots.last().unwrap() < 0.8);
        assert!(knots[0] > 0.0);
        assert!(changepoint_knots(0, 0.8).is_empty());
    }
}
