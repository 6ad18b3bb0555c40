//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Forecast plot elements:
//! - observed sales: `o`
//! - forecast (`yhat`): `-` line
//! - uncertainty interval: `~` lines
//! - trend component: `.` line
//! - a day-of-week effect footer when the model has weekly terms
//!
//! Inventory plot elements:
//! - forecast (`yhat`): `-` line
//! - optimal inventory: `=` line

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastPoint, InventoryRecommendation, SeriesPoint};

/// Render observed history, the forecast, and its trend component.
pub fn render_forecast_ascii(
    series: &[SeriesPoint],
    forecast: &[ForecastPoint],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let dates = series
        .iter()
        .map(|p| p.ds)
        .chain(forecast.iter().map(|p| p.ds));
    let Some((ds_min, ds_max)) = date_range(dates) else {
        return "Plot: no data\n".to_string();
    };

    let values = series.iter().map(|p| p.y).chain(
        forecast
            .iter()
            .flat_map(|p| [p.yhat, p.yhat_lower, p.yhat_upper, p.trend]),
    );
    let (y_min, y_max) = value_range(values).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let yhat: Vec<(f64, f64)> = forecast
        .iter()
        .map(|p| (day_of(p.ds, ds_min), p.yhat))
        .collect();
    let trend: Vec<(f64, f64)> = forecast
        .iter()
        .map(|p| (day_of(p.ds, ds_min), p.trend))
        .collect();
    let lower: Vec<(f64, f64)> = forecast
        .iter()
        .map(|p| (day_of(p.ds, ds_min), p.yhat_lower))
        .collect();
    let upper: Vec<(f64, f64)> = forecast
        .iter()
        .map(|p| (day_of(p.ds, ds_min), p.yhat_upper))
        .collect();

    // Forecast first, trend fills the gaps, the interval band drops behind
    // both, observed points overlay everything.
    let x_max = day_of(ds_max, ds_min);
    draw_series(&mut grid, &yhat, x_max, y_min, y_max, '-');
    draw_series(&mut grid, &trend, x_max, y_min, y_max, '.');
    draw_series(&mut grid, &upper, x_max, y_min, y_max, '~');
    draw_series(&mut grid, &lower, x_max, y_min, y_max, '~');

    for p in series {
        let x = map_x(day_of(p.ds, ds_min), x_max, width);
        let y = map_y(p.y, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{ds_min}, {ds_max}] | y=[{y_min:.2}, {y_max:.2}] | o observed, - yhat, ~ interval, . trend\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    if let Some(effects) = weekday_effects(forecast) {
        out.push_str("Weekly effect:");
        for (label, e) in WEEKDAY_LABELS.iter().zip(effects) {
            out.push_str(&format!(" {label} {e:+.1}"));
        }
        out.push('\n');
    }
    out
}

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Average weekly component per weekday (Monday first). `None` when the
/// model has no weekly terms or some weekday was never observed.
fn weekday_effects(forecast: &[ForecastPoint]) -> Option<[f64; 7]> {
    let mut sums = [0.0; 7];
    let mut counts = [0usize; 7];
    for p in forecast {
        if let Some(w) = p.weekly {
            let i = p.ds.weekday().num_days_from_monday() as usize;
            sums[i] += w;
            counts[i] += 1;
        }
    }
    if counts.iter().any(|&c| c == 0) {
        return None;
    }
    let mut out = [0.0; 7];
    for i in 0..7 {
        out[i] = sums[i] / counts[i] as f64;
    }
    Some(out)
}

/// Render the horizon forecast against the recommended inventory level.
pub fn render_inventory_ascii(
    recommendations: &[InventoryRecommendation],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((ds_min, ds_max)) = date_range(recommendations.iter().map(|r| r.ds)) else {
        return "Plot: no data\n".to_string();
    };

    let values = recommendations
        .iter()
        .flat_map(|r| [r.yhat, r.optimal_inventory]);
    let (y_min, y_max) = value_range(values).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let yhat: Vec<(f64, f64)> = recommendations
        .iter()
        .map(|r| (day_of(r.ds, ds_min), r.yhat))
        .collect();
    let optimal: Vec<(f64, f64)> = recommendations
        .iter()
        .map(|r| (day_of(r.ds, ds_min), r.optimal_inventory))
        .collect();

    let x_max = day_of(ds_max, ds_min);
    draw_series(&mut grid, &optimal, x_max, y_min, y_max, '=');
    draw_series(&mut grid, &yhat, x_max, y_min, y_max, '-');

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{ds_min}, {ds_max}] | units=[{y_min:.2}, {y_max:.2}] | - yhat, = optimal\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn day_of(ds: NaiveDate, origin: NaiveDate) -> f64 {
    (ds - origin).num_days() as f64
}

fn date_range(dates: impl Iterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    let mut min = None;
    let mut max = None;
    for ds in dates {
        min = Some(min.map_or(ds, |m: NaiveDate| m.min(ds)));
        max = Some(max.map_or(ds, |m: NaiveDate| m.max(ds)));
    }
    match (min, max) {
        (Some(a), Some(b)) if b > a => Some((a, b)),
        _ => None,
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max.max(1e-12)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for &(x, y) in points {
        let px = map_x(x, x_max, width);
        let py = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, px, py, ch),
            None => {
                if grid[py][px] == ' ' {
                    grid[py][px] = ch;
                }
            }
        }
        prev = Some((px, py));
    }
}

/// Integer line drawing (Bresenham-ish). Only writes on blank cells so
/// earlier layers keep priority.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_plot_golden_snapshot_small() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d9 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let series = vec![
            SeriesPoint { ds: d0, y: 100.0 },
            SeriesPoint { ds: d9, y: 110.0 },
        ];
        let flat = |ds| ForecastPoint {
            ds,
            yhat: 100.0,
            yhat_lower: 95.0,
            yhat_upper: 105.0,
            trend: 100.0,
            weekly: None,
            yearly: None,
        };
        let forecast = vec![flat(d0), flat(d9)];

        let txt = render_forecast_ascii(&series, &forecast, 10, 5);
        let expected = concat!(
            "Plot: dates=[2024-01-01, 2024-01-10] | y=[94.25, 110.75]",
            " | o observed, - yhat, ~ interval, . trend\n",
            "         o\n",
            "~~~~~~~~~~\n",
            "          \n",
            "o---------\n",
            "~~~~~~~~~~\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn interval_band_brackets_the_forecast_line() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let forecast: Vec<ForecastPoint> = (0..10)
            .map(|i| ForecastPoint {
                ds: d0 + chrono::Duration::days(i),
                yhat: 100.0,
                yhat_lower: 80.0,
                yhat_upper: 120.0,
                trend: 100.0,
                weekly: None,
                yearly: None,
            })
            .collect();

        let txt = render_forecast_ascii(&[], &forecast, 20, 9);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        let upper = rows.iter().position(|r| r.contains('~')).unwrap();
        let yhat = rows.iter().position(|r| r.contains('-')).unwrap();
        let lower = rows.iter().rposition(|r| r.contains('~')).unwrap();
        assert!(upper < yhat && yhat < lower, "rows: {upper} {yhat} {lower}");
    }

    #[test]
    fn weekly_footer_lists_day_of_week_effects() {
        // 2024-01-01 is a Monday; two full weeks cover every weekday.
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let forecast: Vec<ForecastPoint> = (0..14)
            .map(|i| ForecastPoint {
                ds: d0 + chrono::Duration::days(i),
                yhat: 100.0,
                yhat_lower: 95.0,
                yhat_upper: 105.0,
                trend: 100.0,
                weekly: Some((i % 7) as f64),
                yearly: None,
            })
            .collect();

        let txt = render_forecast_ascii(&[], &forecast, 20, 8);
        assert!(txt.contains("Weekly effect: Mon +0.0"));
        assert!(txt.contains("Sun +6.0"));
    }

    #[test]
    fn inventory_plot_draws_both_lines() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let recs: Vec<InventoryRecommendation> = (0..10)
            .map(|i| InventoryRecommendation {
                ds: start + chrono::Duration::days(i),
                yhat: 100.0,
                optimal_inventory: 110.0,
            })
            .collect();

        let txt = render_inventory_ascii(&recs, 20, 8);
        assert!(txt.contains('-'));
        assert!(txt.contains('='));
        assert!(txt.contains("- yhat, = optimal"));
    }

    #[test]
    fn degenerate_input_does_not_panic() {
        let txt = render_forecast_ascii(&[], &[], 10, 5);
        assert_eq!(txt, "Plot: no data\n");
    }
}
