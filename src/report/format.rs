//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{ForecastConfig, Frequency, InventoryRecommendation};
use crate::fit::selection::FitSelection;
use crate::io::ingest::IngestedSeries;

/// Format the full run summary (dataset stats + fit diagnostics + chosen
/// structure).
pub fn format_run_summary(
    ingest: &IngestedSeries,
    freq: Frequency,
    selection: &FitSelection,
    config: &ForecastConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== inv - Inventory Forecast ===\n");
    out.push_str(&format!("Input: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "History: n={} | dates=[{}, {}] | sales=[{:.2}, {:.2}]\n",
        ingest.stats.n_points,
        ingest.stats.ds_min,
        ingest.stats.ds_max,
        ingest.stats.y_min,
        ingest.stats.y_max
    ));
    out.push_str(&format!(
        "Cadence: {} | horizon: {} periods | safety stock: {:.0}%\n",
        freq.label(),
        config.horizon_periods,
        config.safety_stock_ratio * 100.0
    ));

    out.push_str("\nStructure diagnostics:\n");
    for fit in &selection.fits {
        let chosen = if fit.model.structure == selection.best.model.structure {
            "*"
        } else {
            " "
        };
        out.push_str(&format!(
            "{chosen} {:<16} SSE={:.3} RMSE={:.3} BIC={:.3}\n",
            fit.model.structure.display_name(),
            fit.quality.sse,
            fit.quality.rmse,
            fit.quality.bic
        ));
    }
    for (structure, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", structure.display_name()));
    }

    out.push_str("\nChosen structure:\n");
    out.push_str(&format!(
        "- {} ({} changepoints, sigma={:.4})\n",
        selection.best.model.structure.display_name(),
        selection.best.model.changepoints.len(),
        selection.best.model.sigma
    ));
    out.push('\n');

    out
}

/// Format the recommendation table.
pub fn format_recommendation_table(recommendations: &[InventoryRecommendation]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:>14} {:>20}\n",
            "ds", "yhat", "optimal_inventory"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14} {:-<20}\n", "", "", "").trim_end());
    out.push('\n');

    for rec in recommendations {
        out.push_str(
            format!(
                "{:<12} {:>14.2} {:>20.2}\n",
                rec.ds, rec.yhat, rec.optimal_inventory
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn table_has_header_rule_and_rows() {
        let recs = vec![
            InventoryRecommendation {
                ds: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                yhat: 120.0,
                optimal_inventory: 132.0,
            },
            InventoryRecommendation {
                ds: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                yhat: 121.5,
                optimal_inventory: 133.65,
            },
        ];

        let table = format_recommendation_table(&recs);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ds"));
        assert!(lines[0].contains("optimal_inventory"));
        assert!(lines[1].starts_with("---"));
        assert!(lines[2].contains("2024-05-01"));
        assert!(lines[2].contains("132.00"));
        assert!(lines[3].contains("133.65"));
    }
}
