//! Sampling frequency inference.
//!
//! The policy is explicit and deterministic: the period is the median
//! positive delta (in days) between consecutive sorted timestamps, floored
//! at one day. Duplicate dates contribute zero deltas and are ignored.

use crate::domain::{Frequency, SeriesPoint};

/// Infer the sampling period from a chronologically sorted series.
///
/// Falls back to daily when the series has no positive deltas (single point
/// or all-duplicate dates).
pub fn infer_frequency(series: &[SeriesPoint]) -> Frequency {
    let mut deltas: Vec<i64> = series
        .windows(2)
        .map(|w| (w[1].ds - w[0].ds).num_days())
        .filter(|&d| d > 0)
        .collect();

    if deltas.is_empty() {
        return Frequency { period_days: 1 };
    }

    deltas.sort_unstable();
    let mid = deltas.len() / 2;
    let median = if deltas.len() % 2 == 1 {
        deltas[mid]
    } else {
        // Round the even-count median down to keep the period integral.
        (deltas[mid - 1] + deltas[mid]) / 2
    };

    Frequency {
        period_days: median.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(days: &[u32]) -> Vec<SeriesPoint> {
        days.iter()
            .map(|&d| SeriesPoint {
                ds: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                y: 1.0,
            })
            .collect()
    }

    #[test]
    fn daily_series_is_daily() {
        let s = series(&[1, 2, 3, 4, 5]);
        assert_eq!(infer_frequency(&s).period_days, 1);
    }

    #[test]
    fn weekly_series_is_weekly() {
        let s = series(&[1, 8, 15, 22]);
        assert_eq!(infer_frequency(&s).period_days, 7);
    }

    #[test]
    fn median_ignores_a_single_gap() {
        // Daily data with one missing day still infers daily.
        let s = series(&[1, 2, 3, 5, 6, 7]);
        assert_eq!(infer_frequency(&s).period_days, 1);
    }

    #[test]
    fn duplicates_and_singletons_fall_back_to_daily() {
        let s = series(&[4, 4, 4]);
        assert_eq!(infer_frequency(&s).period_days, 1);
        let s = series(&[9]);
        assert_eq!(infer_frequency(&s).period_days, 1);
    }
}
