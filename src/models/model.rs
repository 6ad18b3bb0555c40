//! Evaluation of the fitted additive model.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given timestamp (for the least-squares solve)
//! - predict `yhat(ds)` and its components (for forecasts/charts)
//!
//! Both share the same coefficient layout:
//! `[level, slope, changepoint deltas..., weekly sin/cos..., yearly sin/cos...]`

use chrono::NaiveDate;

use crate::domain::{AdditiveModel, ForecastPoint, SeasonalStructure};
use crate::math::{fill_fourier, hinge};
use crate::models::Forecasts;

/// Fourier order for weekly seasonality (period 7 days).
pub const WEEKLY_ORDER: usize = 3;
/// Fourier order for yearly seasonality (period 365.25 days).
pub const YEARLY_ORDER: usize = 6;

pub const WEEKLY_PERIOD_DAYS: f64 = 7.0;
pub const YEARLY_PERIOD_DAYS: f64 = 365.25;

/// z-score for the ~95% prediction interval.
const INTERVAL_Z: f64 = 1.96;

/// Fill a design row for the given structure.
///
/// `t` is scaled time in `[0, 1]`, `d` is days since the series origin.
///
/// # Panics
/// Panics if `out` does not have length
/// `structure.param_count(changepoints.len())`. Callers size the row once
/// and reuse it across observations.
pub fn fill_design_row(
    structure: SeasonalStructure,
    changepoints: &[f64],
    t: f64,
    d: f64,
    out: &mut [f64],
) {
    out[0] = 1.0;
    out[1] = t;
    let mut idx = 2;
    for &knot in changepoints {
        out[idx] = hinge(t, knot);
        idx += 1;
    }
    match structure {
        SeasonalStructure::Trend => {}
        SeasonalStructure::Weekly => {
            fill_fourier(d, WEEKLY_PERIOD_DAYS, WEEKLY_ORDER, &mut out[idx..idx + 2 * WEEKLY_ORDER]);
        }
        SeasonalStructure::WeeklyYearly => {
            fill_fourier(d, WEEKLY_PERIOD_DAYS, WEEKLY_ORDER, &mut out[idx..idx + 2 * WEEKLY_ORDER]);
            idx += 2 * WEEKLY_ORDER;
            fill_fourier(d, YEARLY_PERIOD_DAYS, YEARLY_ORDER, &mut out[idx..idx + 2 * YEARLY_ORDER]);
        }
    }
}

/// Trend component at scaled time `t` (level + slope + changepoint deltas).
pub fn trend_at(model: &AdditiveModel, t: f64) -> f64 {
    let mut y = model.coeffs[0] + model.coeffs[1] * t;
    for (k, &knot) in model.changepoints.iter().enumerate() {
        y += model.coeffs[2 + k] * hinge(t, knot);
    }
    y
}

/// Weekly seasonal component at `d` days since origin, if the structure has one.
pub fn weekly_at(model: &AdditiveModel, d: f64) -> Option<f64> {
    match model.structure {
        SeasonalStructure::Trend => None,
        SeasonalStructure::Weekly | SeasonalStructure::WeeklyYearly => {
            let offset = 2 + model.changepoints.len();
            Some(fourier_dot(
                &model.coeffs[offset..offset + 2 * WEEKLY_ORDER],
                d,
                WEEKLY_PERIOD_DAYS,
                WEEKLY_ORDER,
            ))
        }
    }
}

/// Yearly seasonal component at `d` days since origin, if the structure has one.
pub fn yearly_at(model: &AdditiveModel, d: f64) -> Option<f64> {
    match model.structure {
        SeasonalStructure::Trend | SeasonalStructure::Weekly => None,
        SeasonalStructure::WeeklyYearly => {
            let offset = 2 + model.changepoints.len() + 2 * WEEKLY_ORDER;
            Some(fourier_dot(
                &model.coeffs[offset..offset + 2 * YEARLY_ORDER],
                d,
                YEARLY_PERIOD_DAYS,
                YEARLY_ORDER,
            ))
        }
    }
}

fn fourier_dot(coeffs: &[f64], d: f64, period: f64, order: usize) -> f64 {
    let mut row = vec![0.0; 2 * order];
    fill_fourier(d, period, order, &mut row);
    coeffs.iter().zip(row.iter()).map(|(c, b)| c * b).sum()
}

impl Forecasts for AdditiveModel {
    fn forecast_at(&self, ds: NaiveDate) -> ForecastPoint {
        let d = (ds - self.origin).num_days() as f64;
        let t = d / self.span_days;

        let trend = trend_at(self, t);
        let weekly = weekly_at(self, d);
        let yearly = yearly_at(self, d);
        let yhat = trend + weekly.unwrap_or(0.0) + yearly.unwrap_or(0.0);

        let half_width = INTERVAL_Z * self.sigma;
        ForecastPoint {
            ds,
            yhat,
            yhat_lower: yhat - half_width,
            yhat_upper: yhat + half_width,
            trend,
            weekly,
            yearly,
        }
    }
}
