//! Forecast evaluation over history plus a future horizon.

use chrono::Duration;

use crate::domain::{ForecastPoint, Frequency, SeriesPoint};
use crate::models::Forecasts;

/// Evaluate a fitted model at every historical timestamp and at `horizon`
/// future dates spaced `freq.period_days` apart after the last observation.
///
/// The series must be chronologically sorted; the output is sorted too and
/// has length `series.len() + horizon`.
pub fn forecast_series(
    model: &impl Forecasts,
    series: &[SeriesPoint],
    freq: Frequency,
    horizon: usize,
) -> Vec<ForecastPoint> {
    let mut out = Vec::with_capacity(series.len() + horizon);
    for point in series {
        out.push(model.forecast_at(point.ds));
    }
    if let Some(last) = series.last() {
        for ds in future_dates(last.ds, freq, horizon) {
            out.push(model.forecast_at(ds));
        }
    }
    out
}

/// The `horizon` dates following `last`, spaced at the inferred period.
pub fn future_dates(
    last: chrono::NaiveDate,
    freq: Frequency,
    horizon: usize,
) -> impl Iterator<Item = chrono::NaiveDate> {
    (1..=horizon as i64).map(move |k| last + Duration::days(k * freq.period_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdditiveModel, SeasonalStructure};
    use chrono::NaiveDate;

    fn trend_model(origin: NaiveDate, span_days: f64) -> AdditiveModel {
        AdditiveModel {
            structure: SeasonalStructure::Trend,
            origin,
            span_days,
            changepoints: Vec::new(),
            coeffs: vec![10.0, 5.0],
            sigma: 0.0,
        }
    }

    fn daily_series(n: usize) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        (0..n)
            .map(|i| SeriesPoint {
                ds: start + chrono::Duration::days(i as i64),
                y: 0.0,
            })
            .collect()
    }

    #[test]
    fn output_covers_history_plus_horizon() {
        let series = daily_series(10);
        let model = trend_model(series[0].ds, 9.0);
        let forecast = forecast_series(&model, &series, Frequency { period_days: 1 }, 30);

        assert_eq!(forecast.len(), 40);
        assert_eq!(forecast[0].ds, series[0].ds);
        assert_eq!(forecast[9].ds, series[9].ds);
        assert_eq!(forecast[10].ds, series[9].ds + chrono::Duration::days(1));
        assert_eq!(forecast[39].ds, series[9].ds + chrono::Duration::days(30));
    }

    #[test]
    fn future_dates_respect_the_period() {
        let last = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let dates: Vec<_> = future_dates(last, Frequency { period_days: 7 }, 3).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 25).unwrap(),
            ]
        );
    }

    #[test]
    fn empty_series_yields_empty_forecast() {
        let model = trend_model(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1.0);
        let forecast = forecast_series(&model, &[], Frequency { period_days: 1 }, 30);
        assert!(forecast.is_empty());
    }
}
