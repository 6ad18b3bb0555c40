//! Reporting: inventory recommendations and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{ForecastPoint, InventoryRecommendation};
use crate::error::AppError;

/// Derive inventory recommendations from the trailing `horizon` forecast
/// points.
///
/// `optimal_inventory = yhat * (1 + safety_stock_ratio)`, applied verbatim:
/// no rounding, no clamping. A negative `yhat` yields a negative
/// recommendation, which surfaces a model or data problem rather than hiding
/// it behind a floor at zero.
pub fn recommend_inventory(
    forecast: &[ForecastPoint],
    horizon: usize,
    safety_stock_ratio: f64,
) -> Result<Vec<InventoryRecommendation>, AppError> {
    if forecast.len() < horizon {
        return Err(AppError::new(
            4,
            format!(
                "Forecast has {} points but the horizon needs {horizon}.",
                forecast.len()
            ),
        ));
    }

    let tail = &forecast[forecast.len() - horizon..];
    Ok(tail
        .iter()
        .map(|p| InventoryRecommendation {
            ds: p.ds,
            yhat: p.yhat,
            optimal_inventory: p.yhat * (1.0 + safety_stock_ratio),
        })
        .collect())
}
