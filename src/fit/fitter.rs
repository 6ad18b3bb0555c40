//! Low-level fitting for a single seasonal structure.
//!
//! Given a chronologically sorted series and a structure, we:
//!
//! - scale time into `[0, 1]` over the training span
//! - place a uniform changepoint grid over the first part of history
//! - build the design matrix (trend + hinge + Fourier columns)
//! - solve one ridge-damped least-squares problem
//!
//! The fit is fully deterministic: fixed grids, no random restarts.

use nalgebra::{DMatrix, DVector};

use crate::domain::{AdditiveModel, SeasonalStructure, SeriesPoint};
use crate::error::AppError;
use crate::math::{changepoint_knots, solve_ridge};
use crate::models::fill_design_row;

/// Minimum series length before changepoints are enabled at all.
const MIN_CHANGEPOINT_ROWS: usize = 20;

/// Fitting options that affect how each structure is calibrated.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Requested changepoint count; reduced for short series.
    pub changepoints: usize,
    /// Fraction of history eligible for changepoints, in `(0, 1]`.
    pub changepoint_range: f64,
    /// Ridge damping for changepoint and seasonal columns.
    pub ridge_lambda: f64,
}

/// Best fit for a single seasonal structure.
#[derive(Debug, Clone)]
pub struct StructureFit {
    pub model: AdditiveModel,
    pub sse: f64,
    pub rmse: f64,
}

/// Fit one seasonal structure on a sorted series.
pub fn fit_structure(
    structure: SeasonalStructure,
    series: &[SeriesPoint],
    opts: &FitOptions,
) -> Result<StructureFit, AppError> {
    let n = series.len();
    if n < 2 {
        return Err(AppError::new(
            3,
            format!("Need at least 2 data points to fit a forecast, got {n}."),
        ));
    }

    let origin = series[0].ds;
    let last = series[n - 1].ds;
    let span_days = ((last - origin).num_days().max(1)) as f64;

    let n_changepoints = effective_changepoints(opts.changepoints, n);
    let changepoints = changepoint_knots(n_changepoints, opts.changepoint_range);
    let p = structure.param_count(changepoints.len());

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for (i, point) in series.iter().enumerate() {
        let d = (point.ds - origin).num_days() as f64;
        let t = d / span_days;
        fill_design_row(structure, &changepoints, t, d, &mut row);
        for (j, &v) in row.iter().enumerate() {
            x[(i, j)] = v;
        }
        y[i] = point.y;
    }

    // Level and slope stay unpenalized; everything after them gets damped.
    let coeffs = solve_ridge(&x, &y, opts.ridge_lambda, 2).ok_or_else(|| {
        AppError::new(
            4,
            format!(
                "Could not solve the {} fit (degenerate design matrix).",
                structure.display_name()
            ),
        )
    })?;

    let fitted = &x * &coeffs;
    let mut sse = 0.0;
    for i in 0..n {
        let r = y[i] - fitted[i];
        sse += r * r;
    }
    if !sse.is_finite() {
        return Err(AppError::new(
            4,
            format!("Non-finite residuals in the {} fit.", structure.display_name()),
        ));
    }

    let rmse = (sse / n as f64).sqrt();
    // Degrees-of-freedom adjusted residual scale for the prediction interval.
    let sigma = (sse / n.saturating_sub(p).max(1) as f64).sqrt();

    Ok(StructureFit {
        model: AdditiveModel {
            structure,
            origin,
            span_days,
            changepoints,
            coeffs: coeffs.iter().copied().collect(),
            sigma,
        },
        sse,
        rmse,
    })
}

/// Reduce the changepoint count for short series; disable entirely below
/// `MIN_CHANGEPOINT_ROWS` so tiny inputs stay exactly linear in trend.
///
/// Selection uses this too when estimating parameter counts, so eligibility
/// checks and the actual fit always agree on `k`.
pub fn effective_changepoints(requested: usize, n: usize) -> usize {
    if n < MIN_CHANGEPOINT_ROWS {
        0
    } else {
        requested.min(n / 3)
    }
}
