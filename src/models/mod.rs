//! Additive demand model implementation.
//!
//! Evaluation is implemented as small, pure functions over the fitted
//! coefficients so that fitting/search code can stay generic.

pub mod model;

pub use model::*;

use chrono::NaiveDate;

use crate::domain::ForecastPoint;

/// Narrow seam between the pipeline and the fitted model.
///
/// Everything downstream of fitting (forecast grid, inventory calculation,
/// presentation) only needs point predictions, so a different forecasting
/// procedure can be substituted by implementing this trait.
pub trait Forecasts {
    fn forecast_at(&self, ds: NaiveDate) -> ForecastPoint;
}
