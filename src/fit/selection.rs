//! Seasonal structure selection using BIC with guardrails.
//!
//! The tool fits each eligible structure and computes:
//! - SSE / RMSE
//! - BIC = n * ln(SSE/n) + k * ln(n)
//!
//! Selection rules:
//! 1. Exclude underdetermined structures: seasonal candidates require
//!    `n >= k + 4`; the trend-only fit is allowed down to `n = 2` so a
//!    two-row input still produces a forecast.
//! 2. Choose the structure with minimum BIC.
//! 3. If ΔBIC < 2 between the best and a simpler structure, pick the
//!    simpler structure.

use rayon::prelude::*;

use crate::domain::{
    FitQuality, FitResult, ForecastConfig, Frequency, SeasonalSpec, SeasonalStructure, SeriesPoint,
};
use crate::error::AppError;
use crate::fit::fitter::{FitOptions, StructureFit, effective_changepoints, fit_structure};

/// Minimum number of extra observations beyond parameter count for
/// seasonal candidates.
const MIN_N_BUFFER: usize = 4;

/// Minimum history span (days) before weekly seasonality is considered.
const MIN_WEEKLY_SPAN_DAYS: i64 = 14;
/// Minimum history span (days) before yearly seasonality is considered.
const MIN_YEARLY_SPAN_DAYS: i64 = 730;
/// Weekly terms are aliased when sampling is coarser than this.
const MAX_WEEKLY_PERIOD_DAYS: i64 = 2;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: FitResult,
    /// Fits for all attempted structures (after guardrails).
    pub fits: Vec<FitResult>,
    /// Any structures that were skipped and why (for diagnostics).
    pub skipped: Vec<(SeasonalStructure, String)>,
}

/// Fit all candidate structures on a sorted series and select the best.
pub fn fit_and_select(
    series: &[SeriesPoint],
    freq: Frequency,
    config: &ForecastConfig,
) -> Result<FitSelection, AppError> {
    let n = series.len();
    if n < 2 {
        return Err(AppError::new(
            3,
            format!("Need at least 2 data points to fit a forecast, got {n}."),
        ));
    }

    let span_days = (series[n - 1].ds - series[0].ds).num_days();
    let opts = FitOptions {
        changepoints: config.changepoints,
        changepoint_range: config.changepoint_range,
        ridge_lambda: config.ridge_lambda,
    };

    let mut candidates: Vec<SeasonalStructure> = Vec::new();
    let mut skipped: Vec<(SeasonalStructure, String)> = Vec::new();

    for structure in candidate_structures(config.seasonal, freq, span_days, &mut skipped) {
        // Same changepoint policy as the fitter, so the parameter count here
        // matches what the fit will actually use.
        let k = structure.param_count(effective_changepoints(config.changepoints, n));
        let buffer = match structure {
            SeasonalStructure::Trend => 0,
            _ => MIN_N_BUFFER,
        };
        if n < k + buffer {
            skipped.push((
                structure,
                format!("underdetermined: n={n} < k+{buffer}={}", k + buffer),
            ));
            continue;
        }
        candidates.push(structure);
    }

    if candidates.is_empty() {
        return Err(AppError::new(
            3,
            "Insufficient data to fit any forecast structure after guardrails.",
        ));
    }

    // Evaluate each candidate structure independently (parallel).
    let results: Vec<(SeasonalStructure, Result<StructureFit, AppError>)> = candidates
        .par_iter()
        .map(|&structure| (structure, fit_structure(structure, series, &opts)))
        .collect();

    let mut fits: Vec<FitResult> = Vec::new();
    for (structure, result) in results {
        match result {
            Ok(fit) => fits.push(to_fit_result(fit, n)),
            Err(e) => skipped.push((structure, e.message().to_string())),
        }
    }

    if fits.is_empty() {
        return Err(AppError::new(
            4,
            "All forecast structures failed to fit; see diagnostics.",
        ));
    }

    let best = select_by_bic(&fits);

    Ok(FitSelection {
        best,
        fits,
        skipped,
    })
}

fn candidate_structures(
    spec: SeasonalSpec,
    freq: Frequency,
    span_days: i64,
    skipped: &mut Vec<(SeasonalStructure, String)>,
) -> Vec<SeasonalStructure> {
    // An explicit request is honored as-is; the guardrails above still apply.
    if let Some(structure) = spec.to_structure() {
        return vec![structure];
    }

    let mut out = vec![SeasonalStructure::Trend];

    if freq.period_days > MAX_WEEKLY_PERIOD_DAYS {
        skipped.push((
            SeasonalStructure::Weekly,
            format!(
                "weekly terms aliased at {} sampling",
                freq.label()
            ),
        ));
        return out;
    }
    if span_days < MIN_WEEKLY_SPAN_DAYS {
        skipped.push((
            SeasonalStructure::Weekly,
            format!("history spans {span_days} days, need {MIN_WEEKLY_SPAN_DAYS}"),
        ));
        return out;
    }
    out.push(SeasonalStructure::Weekly);

    if span_days >= MIN_YEARLY_SPAN_DAYS {
        out.push(SeasonalStructure::WeeklyYearly);
    } else {
        skipped.push((
            SeasonalStructure::WeeklyYearly,
            format!("history spans {span_days} days, need {MIN_YEARLY_SPAN_DAYS}"),
        ));
    }

    out
}

fn to_fit_result(fit: StructureFit, n: usize) -> FitResult {
    let k = fit.model.structure.param_count(fit.model.changepoints.len());
    let bic = bic(n, fit.sse, k);

    FitResult {
        quality: FitQuality {
            sse: fit.sse,
            rmse: fit.rmse,
            bic,
            n,
        },
        model: fit.model,
    }
}

fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

fn select_by_bic(fits: &[FitResult]) -> FitResult {
    let best_bic = fits
        .iter()
        .map(|f| f.quality.bic)
        .fold(f64::INFINITY, f64::min);

    // Among near-ties (ΔBIC < 2), prefer the structure with fewest parameters.
    let mut chosen: Option<&FitResult> = None;
    for f in fits {
        if f.quality.bic >= best_bic + 2.0 {
            continue;
        }
        let k = f.model.structure.param_count(f.model.changepoints.len());
        let better = match chosen {
            None => true,
            Some(c) => {
                let ck = c.model.structure.param_count(c.model.changepoints.len());
                k < ck || (k == ck && f.quality.bic < c.quality.bic)
            }
        };
        if better {
            chosen = Some(f);
        }
    }

    chosen.unwrap_or(&fits[0]).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn daily_series(n: usize, f: impl Fn(usize) -> f64) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| SeriesPoint {
                ds: start + chrono::Duration::days(i as i64),
                y: f(i),
            })
            .collect()
    }

    fn config(seasonal: SeasonalSpec) -> ForecastConfig {
        ForecastConfig {
            csv_path: PathBuf::from("test.csv"),
            horizon_periods: 30,
            safety_stock_ratio: 0.10,
            seasonal,
            changepoints: 10,
            changepoint_range: 0.8,
            ridge_lambda: 1.0,
            plot: false,
            plot_width: 72,
            plot_height: 16,
            export: None,
        }
    }

    #[test]
    fn noiseless_linear_trend_prefers_trend_only() {
        let series = daily_series(60, |i| 100.0 + i as f64);
        let freq = Frequency { period_days: 1 };
        let selection = fit_and_select(&series, freq, &config(SeasonalSpec::Auto)).unwrap();
        assert_eq!(selection.best.model.structure, SeasonalStructure::Trend);
    }

    #[test]
    fn strong_weekly_pattern_selects_weekly() {
        let pattern = [0.0, 12.0, 25.0, 18.0, 4.0, -15.0, -30.0];
        let series = daily_series(56, |i| 100.0 + 0.5 * i as f64 + pattern[i % 7]);
        let freq = Frequency { period_days: 1 };
        let selection = fit_and_select(&series, freq, &config(SeasonalSpec::Auto)).unwrap();
        assert_eq!(selection.best.model.structure, SeasonalStructure::Weekly);
    }

    #[test]
    fn two_rows_still_select_a_fit() {
        let series = daily_series(2, |i| 10.0 + i as f64);
        let freq = Frequency { period_days: 1 };
        let selection = fit_and_select(&series, freq, &config(SeasonalSpec::Auto)).unwrap();
        assert_eq!(selection.best.model.structure, SeasonalStructure::Trend);
        // Weekly was skipped for span, not attempted and failed.
        assert!(selection.skipped.iter().any(|(s, _)| *s == SeasonalStructure::Weekly));
    }

    #[test]
    fn weekly_sampling_skips_weekly_terms() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let series: Vec<SeriesPoint> = (0..30)
            .map(|i| SeriesPoint {
                ds: start + chrono::Duration::days(7 * i as i64),
                y: 50.0 + i as f64,
            })
            .collect();
        let freq = Frequency { period_days: 7 };
        let selection = fit_and_select(&series, freq, &config(SeasonalSpec::Auto)).unwrap();
        assert_eq!(selection.best.model.structure, SeasonalStructure::Trend);
        assert!(
            selection
                .skipped
                .iter()
                .any(|(s, reason)| *s == SeasonalStructure::Weekly && reason.contains("aliased"))
        );
    }

    #[test]
    fn explicit_seasonal_request_is_honored() {
        let pattern = [0.0, 12.0, 25.0, 18.0, 4.0, -15.0, -30.0];
        let series = daily_series(56, |i| 100.0 + pattern[i % 7]);
        let freq = Frequency { period_days: 1 };
        let selection = fit_and_select(&series, freq, &config(SeasonalSpec::Weekly)).unwrap();
        assert_eq!(selection.fits.len(), 1);
        assert_eq!(selection.best.model.structure, SeasonalStructure::Weekly);
    }

    #[test]
    fn eligibility_and_fit_agree_on_changepoint_count() {
        let series = daily_series(60, |i| 100.0 + i as f64);
        let freq = Frequency { period_days: 1 };
        let cfg = config(SeasonalSpec::Auto);
        let selection = fit_and_select(&series, freq, &cfg).unwrap();
        for fit in &selection.fits {
            assert_eq!(
                fit.model.changepoints.len(),
                effective_changepoints(cfg.changepoints, series.len())
            );
        }
    }

    #[test]
    fn too_few_rows_is_a_data_error() {
        let series = daily_series(1, |_| 5.0);
        let freq = Frequency { period_days: 1 };
        let err = fit_and_select(&series, freq, &config(SeasonalSpec::Auto)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
