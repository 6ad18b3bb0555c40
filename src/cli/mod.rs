//! Command-line parsing for the inventory forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{
    DEFAULT_HORIZON_PERIODS, DEFAULT_SAFETY_STOCK_RATIO, SeasonalSpec,
};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "inv", version, about = "Sales forecasting and inventory optimization")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a forecast from a sales CSV, print diagnostics and the
    /// recommendation table, and optionally plot/export.
    Fit(FitArgs),
    /// Print the recommendation table only (useful for scripting).
    Table(FitArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `inv fit`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(FitArgs),
    /// Generate a synthetic sales CSV for demos and testing.
    Sample(SampleArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Sales CSV with `Date` and `Sales` columns. Prompts if omitted.
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Number of future periods to forecast.
    #[arg(long, default_value_t = DEFAULT_HORIZON_PERIODS)]
    pub horizon: usize,

    /// Safety-stock markup applied to the forecast (0.10 = +10%).
    #[arg(long = "safety-stock", default_value_t = DEFAULT_SAFETY_STOCK_RATIO)]
    pub safety_stock: f64,

    /// Seasonal structure to fit (auto selects by BIC).
    #[arg(long, value_enum, default_value_t = SeasonalSpec::Auto)]
    pub seasonal: SeasonalSpec,

    /// Maximum number of trend changepoints.
    #[arg(long, default_value_t = 10)]
    pub changepoints: usize,

    /// Fraction of history eligible for changepoints.
    #[arg(long = "changepoint-range", default_value_t = 0.8)]
    pub changepoint_range: f64,

    /// Ridge damping for changepoint and seasonal terms.
    #[arg(long = "ridge", default_value_t = 1.0)]
    pub ridge_lambda: f64,

    /// Render ASCII plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the recommendation table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for generating a synthetic sales CSV.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, default_value = "sales_sample.csv")]
    pub out: PathBuf,

    /// Number of days to generate.
    #[arg(long, default_value_t = 180)]
    pub days: usize,

    /// First date of the series (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Sales level on the first day.
    #[arg(long = "base-level", default_value_t = 200.0)]
    pub base_level: f64,

    /// Linear growth per day.
    #[arg(long = "trend", default_value_t = 0.4)]
    pub trend_per_day: f64,

    /// Weekend multiplier (0.7 = 30% dip on Sat/Sun).
    #[arg(long = "weekend-dip", default_value_t = 0.7)]
    pub weekend_dip: f64,

    /// Std dev of the additive noise.
    #[arg(long = "noise", default_value_t = 8.0)]
    pub noise_sigma: f64,
}
