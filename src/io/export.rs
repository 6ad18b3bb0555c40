//! Export forecast results and generated sample data to CSV.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts, so both writers emit plain headers and ISO dates.

use std::fs::File;
use std::path::Path;

use crate::domain::{InventoryRecommendation, SalesRecord};
use crate::error::AppError;

/// Write the recommendation table (`ds,yhat,optimal_inventory`) to a CSV file.
pub fn write_recommendations_csv(
    path: &Path,
    recommendations: &[InventoryRecommendation],
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    let mut writer = csv::Writer::from_writer(file);
    for rec in recommendations {
        writer
            .serialize(rec)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}

/// Write generated sales history (`Date,Sales`) to a CSV file.
///
/// The output round-trips through ingest unchanged.
pub fn write_sales_csv(path: &Path, records: &[SalesRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display()))
    })?;

    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn sales_csv_round_trips_through_ingest() {
        let dir = std::env::temp_dir();
        let path = dir.join("invcast_export_roundtrip_test.csv");

        let records = vec![
            SalesRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                sales: 100.0,
            },
            SalesRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                sales: 103.25,
            },
        ];

        write_sales_csv(&path, &records).unwrap();
        let data = crate::io::load_sales_series(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(data.points.len(), 2);
        assert_eq!(data.points[0].ds, records[0].date);
        assert!((data.points[1].y - 103.25).abs() < 1e-12);
    }

    #[test]
    fn recommendations_csv_has_expected_header() {
        let dir = std::env::temp_dir();
        let path = dir.join("invcast_export_header_test.csv");

        let recs = vec![InventoryRecommendation {
            ds: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            yhat: 200.0,
            optimal_inventory: 220.0,
        }];

        write_recommendations_csv(&path, &recs).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(text.starts_with("ds,yhat,optimal_inventory"));
        assert!(text.contains("2024-02-01"));
    }
}
