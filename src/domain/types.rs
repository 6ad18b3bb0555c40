//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to CSV
//! - rendered by both the CLI reports and the TUI

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which seasonal structure to fit on top of the trend.
///
/// `Auto` means: try every structure the data can support and pick the best
/// by BIC (preferring the simpler structure on a near-tie).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalSpec {
    Auto,
    /// Trend only, no seasonal terms.
    None,
    /// Trend + weekly seasonality.
    Weekly,
    /// Trend + weekly + yearly seasonality.
    Full,
}

/// Concrete seasonal structure actually fitted after resolving `SeasonalSpec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalStructure {
    Trend,
    Weekly,
    WeeklyYearly,
}

impl SeasonalStructure {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            SeasonalStructure::Trend => "trend only",
            SeasonalStructure::Weekly => "trend + weekly",
            SeasonalStructure::WeeklyYearly => "trend + weekly + yearly",
        }
    }

    /// Number of seasonal Fourier columns for this structure.
    pub fn fourier_cols(self) -> usize {
        match self {
            SeasonalStructure::Trend => 0,
            SeasonalStructure::Weekly => 2 * crate::models::WEEKLY_ORDER,
            SeasonalStructure::WeeklyYearly => {
                2 * crate::models::WEEKLY_ORDER + 2 * crate::models::YEARLY_ORDER
            }
        }
    }

    /// Total coefficient count given a changepoint count (level + slope +
    /// changepoint deltas + seasonal columns).
    pub fn param_count(self, n_changepoints: usize) -> usize {
        2 + n_changepoints + self.fourier_cols()
    }
}

impl SeasonalSpec {
    pub fn to_structure(self) -> Option<SeasonalStructure> {
        match self {
            SeasonalSpec::Auto => None,
            SeasonalSpec::None => Some(SeasonalStructure::Trend),
            SeasonalSpec::Weekly => Some(SeasonalStructure::Weekly),
            SeasonalSpec::Full => Some(SeasonalStructure::WeeklyYearly),
        }
    }
}

/// A raw input row as read from the CSV (`Date`, `Sales`).
///
/// The serde renames keep exported sample CSVs round-trippable through the
/// same schema validation the tool applies to user files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Sales")]
    pub sales: f64,
}

/// A normalized observation used for fitting.
///
/// Invariants: `ds` is a valid calendar date; `y` is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub ds: NaiveDate,
    pub y: f64,
}

/// Sampling period of the input series, inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    /// Days between consecutive observations (median delta, floored at 1).
    pub period_days: i64,
}

impl Frequency {
    pub fn label(self) -> String {
        match self.period_days {
            1 => "daily".to_string(),
            7 => "weekly".to_string(),
            n => format!("every {n} days"),
        }
    }
}

/// One predicted point, covering history and the future horizon.
///
/// Only `ds` and `yhat` feed the inventory calculation; the component fields
/// exist for the decomposition chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub weekly: Option<f64>,
    pub yearly: Option<f64>,
}

/// The derived inventory figure for one future period.
///
/// `optimal_inventory = yhat * (1 + safety_stock_ratio)` with no clamping
/// and no negative-value guard: a negative forecast yields a negative
/// recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRecommendation {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub optimal_inventory: f64,
}

/// Fitted additive model parameters.
///
/// `coeffs` layout: `[level, slope, changepoint deltas..., fourier terms...]`
/// where the Fourier block is weekly sin/cos pairs followed by yearly pairs.
#[derive(Debug, Clone, Serialize)]
pub struct AdditiveModel {
    pub structure: SeasonalStructure,
    /// First training date; origin of the scaled time axis.
    pub origin: NaiveDate,
    /// Training span in days used to scale time into `[0, 1]` (>= 1).
    pub span_days: f64,
    /// Changepoint knots on the scaled time axis, ascending.
    pub changepoints: Vec<f64>,
    pub coeffs: Vec<f64>,
    /// Residual standard deviation, used for prediction intervals.
    pub sigma: f64,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub bic: f64,
    pub n: usize,
}

/// Fit output for a single seasonal structure.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    pub model: AdditiveModel,
    pub quality: FitQuality,
}

/// Summary stats about the points actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub ds_min: NaiveDate,
    pub ds_max: NaiveDate,
    pub y_min: f64,
    pub y_max: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults); the TUI mutates its own
/// copy as the user adjusts settings.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub csv_path: PathBuf,

    /// Number of future periods to forecast.
    pub horizon_periods: usize,
    /// Safety stock as a fraction of forecasted demand.
    pub safety_stock_ratio: f64,

    pub seasonal: SeasonalSpec,

    /// Requested changepoint count (reduced or disabled for short series).
    pub changepoints: usize,
    /// Fraction of history eligible for changepoints, in `(0, 1]`.
    pub changepoint_range: f64,
    /// Ridge damping applied to changepoint and seasonal columns.
    pub ridge_lambda: f64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
}

pub const DEFAULT_HORIZON_PERIODS: usize = 30;
pub const DEFAULT_SAFETY_STOCK_RATIO: f64 = 0.10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_count_includes_changepoints_and_fourier() {
        assert_eq!(SeasonalStructure::Trend.param_count(0), 2);
        assert_eq!(SeasonalStructure::Trend.param_count(5), 7);
        assert_eq!(
            SeasonalStructure::Weekly.param_count(0),
            2 + 2 * crate::models::WEEKLY_ORDER
        );
        assert_eq!(
            SeasonalStructure::WeeklyYearly.param_count(3),
            5 + 2 * crate::models::WEEKLY_ORDER + 2 * crate::models::YEARLY_ORDER
        );
    }

    #[test]
    fn frequency_labels() {
        assert_eq!(Frequency { period_days: 1 }.label(), "daily");
        assert_eq!(Frequency { period_days: 7 }.label(), "weekly");
        assert_eq!(Frequency { period_days: 3 }.label(), "every 3 days");
    }
}
