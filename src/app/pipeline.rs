//! Shared forecast pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> frequency inference -> fit/selection -> horizon forecast ->
//! inventory recommendation
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{ForecastConfig, ForecastPoint, Frequency, InventoryRecommendation};
use crate::error::AppError;
use crate::fit::selection::FitSelection;
use crate::io::ingest::IngestedSeries;

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedSeries,
    pub freq: Frequency,
    pub selection: FitSelection,
    pub forecast: Vec<ForecastPoint>,
    pub recommendations: Vec<InventoryRecommendation>,
}

/// Execute the full pipeline: load the CSV, fit, and recommend.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    validate_config(config)?;
    let ingest = crate::io::ingest::load_sales_series(&config.csv_path)?;
    run_forecast_with_series(config, ingest)
}

/// Execute the pipeline on already-ingested data.
///
/// This is useful for the TUI where we want to refit with new settings
/// without re-reading the file.
pub fn run_forecast_with_series(
    config: &ForecastConfig,
    mut ingest: IngestedSeries,
) -> Result<RunOutput, AppError> {
    validate_config(config)?;

    // Input files are often exported unsorted; the fit requires time order.
    ingest.points.sort_by_key(|p| p.ds);

    let freq = crate::fit::frequency::infer_frequency(&ingest.points);
    let selection = crate::fit::selection::fit_and_select(&ingest.points, freq, config)?;

    let forecast = crate::fit::horizon::forecast_series(
        &selection.best.model,
        &ingest.points,
        freq,
        config.horizon_periods,
    );
    let recommendations = crate::report::recommend_inventory(
        &forecast,
        config.horizon_periods,
        config.safety_stock_ratio,
    )?;

    Ok(RunOutput {
        ingest,
        freq,
        selection,
        forecast,
        recommendations,
    })
}

fn validate_config(config: &ForecastConfig) -> Result<(), AppError> {
    if config.horizon_periods == 0 {
        return Err(AppError::new(2, "Forecast horizon must be >= 1 period."));
    }
    if !config.safety_stock_ratio.is_finite() {
        return Err(AppError::new(2, "Safety stock ratio must be a finite number."));
    }
    if !(config.changepoint_range > 0.0 && config.changepoint_range <= 1.0) {
        return Err(AppError::new(2, "Changepoint range must be in (0, 1]."));
    }
    if !(config.ridge_lambda.is_finite() && config.ridge_lambda >= 0.0) {
        return Err(AppError::new(2, "Ridge damping must be finite and >= 0."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatasetStats, SeasonalSpec, SeriesPoint};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn ingested(n: usize, f: impl Fn(usize) -> f64) -> IngestedSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points: Vec<SeriesPoint> = (0..n)
            .map(|i| SeriesPoint {
                ds: start + chrono::Duration::days(i as i64),
                y: f(i),
            })
            .collect();
        let stats = DatasetStats {
            n_points: n,
            ds_min: points[0].ds,
            ds_max: points[n - 1].ds,
            y_min: points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
            y_max: points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
        };
        IngestedSeries {
            points,
            stats,
            rows_read: n,
        }
    }

    fn config() -> ForecastConfig {
        ForecastConfig {
            csv_path: PathBuf::from("test.csv"),
            horizon_periods: 30,
            safety_stock_ratio: 0.10,
            seasonal: SeasonalSpec::Auto,
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
    fn linear_history_produces_thirty_recommendations() {
        let run = run_forecast_with_series(&config(), ingested(60, |i| 100.0 + i as f64)).unwrap();

        assert_eq!(run.forecast.len(), 90);
        assert_eq!(run.recommendations.len(), 30);

        // Recommendations cover exactly the 30 days after the last observation.
        let last = run.ingest.points.last().unwrap().ds;
        assert_eq!(
            run.recommendations[0].ds,
            last + chrono::Duration::days(1)
        );
        assert_eq!(
            run.recommendations[29].ds,
            last + chrono::Duration::days(30)
        );

        // Day 89 of a y = 100 + t series forecasts ~189, stocked at +10%.
        let final_rec = &run.recommendations[29];
        assert!((final_rec.yhat - 189.0).abs() < 1.0, "yhat = {}", final_rec.yhat);
        assert!(
            (final_rec.optimal_inventory - final_rec.yhat * 1.10).abs() < 1e-9
        );
    }

    #[test]
    fn unsorted_input_is_sorted_before_fitting() {
        let mut data = ingested(30, |i| 50.0 + i as f64);
        data.points.reverse();
        let run = run_forecast_with_series(&config(), data).unwrap();
        assert!(run.ingest.points.windows(2).all(|w| w[0].ds <= w[1].ds));
    }

    #[test]
    fn reruns_are_identical() {
        let a = run_forecast_with_series(&config(), ingested(45, |i| 80.0 + 2.0 * i as f64)).unwrap();
        let b = run_forecast_with_series(&config(), ingested(45, |i| 80.0 + 2.0 * i as f64)).unwrap();
        for (x, y) in a.recommendations.iter().zip(b.recommendations.iter()) {
            assert_eq!(x.ds, y.ds);
            assert_eq!(x.yhat.to_bits(), y.yhat.to_bits());
            assert_eq!(x.optimal_inventory.to_bits(), y.optimal_inventory.to_bits());
        }
    }

    #[test]
    fn zero_horizon_is_a_usage_error() {
        let mut cfg = config();
        cfg.horizon_periods = 0;
        let err = run_forecast_with_series(&cfg, ingested(30, |i| i as f64)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
