//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`SeasonalSpec`, `SeasonalStructure`)
//! - normalized observations (`SeriesPoint`) and raw rows (`SalesRecord`)
//! - fit outputs (`FitResult`, `AdditiveModel`, `ForecastPoint`)
//! - the derived inventory recommendation

pub mod types;

pub use types::*;
