//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the input CSV (flag or interactive picker)
//! - runs ingest + fitting + selection + recommendation
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, SampleArgs};
use crate::data::SampleSpec;
use crate::domain::ForecastConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `inv` binary.
pub fn run() -> Result<(), AppError> {
    // We want `inv` and `inv --horizon 60` to behave like `inv tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Table(args) => handle_fit(args, OutputMode::TableOnly),
        Command::Tui(args) => handle_tui(args),
        Command::Sample(args) => handle_sample(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    TableOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args)?;
    let run = pipeline::run_forecast(&config)?;

    if mode == OutputMode::Full {
        println!(
            "{}",
            crate::report::format_run_summary(&run.ingest, run.freq, &run.selection, &config)
        );
    }

    println!(
        "{}",
        crate::report::format_recommendation_table(&run.recommendations)
    );

    if mode == OutputMode::Full && config.plot {
        let forecast_plot = crate::plot::render_forecast_ascii(
            &run.ingest.points,
            &run.forecast,
            config.plot_width,
            config.plot_height,
        );
        println!("{forecast_plot}");

        let inventory_plot = crate::plot::render_inventory_ascii(
            &run.recommendations,
            config.plot_width,
            config.plot_height,
        );
        println!("{inventory_plot}");
    }

    if let Some(path) = &config.export {
        crate::io::export::write_recommendations_csv(path, &run.recommendations)?;
        if mode == OutputMode::Full {
            println!("Exported recommendations to {}", path.display());
        }
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let spec = SampleSpec {
        days: args.days,
        start: args.start,
        seed: args.seed,
        base_level: args.base_level,
        trend_per_day: args.trend_per_day,
        weekend_dip: args.weekend_dip,
        noise_sigma: args.noise_sigma,
    };
    let records = crate::data::generate_sales(&spec)?;
    crate::io::export::write_sales_csv(&args.out, &records)?;
    println!("Wrote {} rows to {}", records.len(), args.out.display());
    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

/// Build the runtime config, resolving the CSV path interactively if needed.
pub fn forecast_config_from_args(args: &FitArgs) -> Result<ForecastConfig, AppError> {
    let csv_path = match &args.file {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };

    Ok(ForecastConfig {
        csv_path,
        horizon_periods: args.horizon,
        safety_stock_ratio: args.safety_stock,
        seasonal: args.seasonal,
        changepoints: args.changepoints,
        changepoint_range: args.changepoint_range,
        ridge_lambda: args.ridge_lambda,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
    })
}

/// Rewrite argv so `inv` defaults to `inv tui`.
///
/// Rules:
/// - `inv`                      -> `inv tui`
/// - `inv --horizon 60 ...`     -> `inv tui --horizon 60 ...`
/// - `inv --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "table" | "tui" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["inv"])), argv(&["inv", "tui"]));
    }

    #[test]
    fn leading_flag_is_routed_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["inv", "--horizon", "60"])),
            argv(&["inv", "tui", "--horizon", "60"])
        );
    }

    #[test]
    fn subcommands_are_untouched() {
        assert_eq!(
            rewrite_args(argv(&["inv", "fit", "-f", "a.csv"])),
            argv(&["inv", "fit", "-f", "a.csv"])
        );
        assert_eq!(rewrite_args(argv(&["inv", "sample"])), argv(&["inv", "sample"]));
    }

    #[test]
    fn help_and_version_are_untouched() {
        assert_eq!(rewrite_args(argv(&["inv", "--help"])), argv(&["inv", "--help"]));
        assert_eq!(rewrite_args(argv(&["inv", "-V"])), argv(&["inv", "-V"]));
    }
}
