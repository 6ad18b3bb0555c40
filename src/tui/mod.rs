//! Ratatui-based terminal UI.
//!
//! The TUI has two views:
//! - a CSV picker (shown when no input file was passed)
//! - a results view: forecast decomposition chart, horizon/inventory chart,
//!   and the recommendation table
//!
//! Fit failures (bad schema, malformed rows) surface as an error banner in
//! place of the results instead of exiting, so the user can pick another file.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use chrono::NaiveDate;

use crate::app::pipeline::RunOutput;
use crate::cli::FitArgs;
use crate::domain::{ForecastConfig, ForecastPoint, SeasonalSpec};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{ForecastChart, LineSpec};

/// Start the TUI.
pub fn run(args: FitArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Picker,
    Results,
}

struct App {
    view: View,
    files: Vec<PathBuf>,
    selected: usize,
    csv_path: Option<PathBuf>,
    horizon: usize,
    safety_stock: f64,
    seasonal: SeasonalSpec,
    changepoints: usize,
    changepoint_range: f64,
    ridge_lambda: f64,
    run: Option<RunOutput>,
    error: Option<String>,
    status: String,
}

impl App {
    fn new(args: FitArgs) -> Self {
        let mut app = Self {
            view: View::Picker,
            files: crate::cli::picker::discover_csv_files(),
            selected: 0,
            csv_path: None,
            horizon: args.horizon.max(1),
            safety_stock: args.safety_stock,
            seasonal: args.seasonal,
            changepoints: args.changepoints,
            changepoint_range: args.changepoint_range,
            ridge_lambda: args.ridge_lambda,
            run: None,
            error: None,
            status: "Pick a sales CSV.".to_string(),
        };

        if let Some(path) = args.file {
            app.load(path);
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.view {
            View::Picker => self.handle_picker_key(code),
            View::Results => self.handle_results_key(code),
        }
    }

    fn handle_picker_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if !self.files.is_empty() {
                    self.selected = (self.selected + 1).min(self.files.len() - 1);
                }
            }
            KeyCode::Enter => {
                if let Some(path) = self.files.get(self.selected).cloned() {
                    self.load(path);
                }
            }
            KeyCode::Char('r') => {
                self.files = crate::cli::picker::discover_csv_files();
                self.selected = self.selected.min(self.files.len().saturating_sub(1));
                self.status = format!("Found {} CSV file(s).", self.files.len());
            }
            _ => {}
        }
        false
    }

    fn handle_results_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('o') | KeyCode::Esc => {
                self.view = View::Picker;
                self.status = "Pick a sales CSV.".to_string();
            }
            KeyCode::Left => {
                self.horizon = self.horizon.saturating_sub(5).max(1);
                self.refit();
            }
            KeyCode::Right => {
                self.horizon = self.horizon.saturating_add(5);
                self.refit();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.safety_stock += 0.01;
                self.refit();
            }
            KeyCode::Char('-') => {
                self.safety_stock = (self.safety_stock - 0.01).max(0.0);
                self.refit();
            }
            KeyCode::Char('m') => {
                self.seasonal = next_seasonal(self.seasonal);
                self.refit();
            }
            KeyCode::Char('r') => {
                if let Some(path) = self.csv_path.clone() {
                    self.load(path);
                }
            }
            _ => {}
        }
        false
    }

    fn config(&self, csv_path: PathBuf) -> ForecastConfig {
        ForecastConfig {
            csv_path,
            horizon_periods: self.horizon,
            safety_stock_ratio: self.safety_stock,
            seasonal: self.seasonal,
            changepoints: self.changepoints,
            changepoint_range: self.changepoint_range,
            ridge_lambda: self.ridge_lambda,
            plot: false,
            plot_width: 0,
            plot_height: 0,
            export: None,
        }
    }

    /// Load a CSV from disk and fit it. Errors become the banner.
    fn load(&mut self, path: PathBuf) {
        let config = self.config(path.clone());
        match crate::app::pipeline::run_forecast(&config) {
            Ok(run) => {
                self.status = format!(
                    "{}: n={} | {}",
                    path.display(),
                    run.ingest.stats.n_points,
                    run.selection.best.model.structure.display_name()
                );
                self.run = Some(run);
                self.error = None;
                self.csv_path = Some(path);
                self.view = View::Results;
            }
            Err(err) => {
                self.run = None;
                self.error = Some(err.message().to_string());
                self.csv_path = Some(path);
                self.view = View::Results;
                self.status = "Fit failed.".to_string();
            }
        }
    }

    /// Refit the already-loaded series with the current settings.
    fn refit(&mut self) {
        let Some(path) = self.csv_path.clone() else {
            return;
        };
        let config = self.config(path);

        // Reuse the parsed series when we have one; re-read otherwise.
        let result = match &self.run {
            Some(run) => {
                crate::app::pipeline::run_forecast_with_series(&config, run.ingest.clone())
            }
            None => crate::app::pipeline::run_forecast(&config),
        };

        match result {
            Ok(run) => {
                self.status = format!(
                    "horizon={} | safety={:.0}% | {}",
                    self.horizon,
                    self.safety_stock * 100.0,
                    run.selection.best.model.structure.display_name()
                );
                self.run = Some(run);
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err.message().to_string());
                self.status = "Refit failed.".to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.view {
            View::Picker => self.draw_picker(frame, chunks[1]),
            View::Results => self.draw_results(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("inv", Style::default().fg(Color::Cyan)),
            Span::raw(" — sales forecast & inventory planner"),
        ]));

        let file = self
            .csv_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(Span::styled(
            format!(
                "file: {file} | horizon: {} | safety: {:.0}% | seasonal: {:?}",
                self.horizon,
                self.safety_stock * 100.0,
                self.seasonal
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} | cadence: {} | rmse={:.3} bic={:.3}",
                    run.selection.best.model.structure.display_name(),
                    run.freq.label(),
                    run.selection.best.quality.rmse,
                    run.selection.best.quality.bic,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_picker(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if self.files.is_empty() {
            let msg = Paragraph::new(
                "No .csv files found under the current directory.\n\
                 Generate one with `inv sample`, then press r to rescan.",
            )
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("Select a CSV").borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        }

        let items: Vec<ListItem> = self
            .files
            .iter()
            .map(|p| ListItem::new(p.display().to_string()))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Select a CSV").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if let Some(error) = &self.error {
            let banner = Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .block(Block::default().title("Error").borders(Borders::ALL));
            frame.render_widget(banner, area);
            return;
        }

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No data loaded. Press o to pick a CSV.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(area);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        self.draw_forecast_chart(frame, charts[0], run);
        self.draw_inventory_chart(frame, charts[1], run);
        self.draw_table(frame, chunks[1], run);
    }

    fn draw_forecast_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let block = Block::default().title("Sales & Forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let origin = run.ingest.stats.ds_min;
        let day = |ds: NaiveDate| (ds - origin).num_days() as f64;

        let scatter: Vec<(f64, f64)> =
            run.ingest.points.iter().map(|p| (day(p.ds), p.y)).collect();
        let yhat: Vec<(f64, f64)> = run
            .forecast
            .iter()
            .map(|p| (day(p.ds), p.yhat))
            .collect();
        let trend: Vec<(f64, f64)> = run
            .forecast
            .iter()
            .map(|p| (day(p.ds), p.trend))
            .collect();
        let (lower, upper) = interval_series(&run.forecast, origin);
        let seasonal = seasonal_series(&run.forecast, origin);

        let values = scatter
            .iter()
            .chain(yhat.iter())
            .chain(trend.iter())
            .chain(lower.iter())
            .chain(upper.iter())
            .map(|&(_, y)| y);
        let Some((x_bounds, y_bounds)) = chart_bounds(yhat.iter().map(|&(x, _)| x), values) else {
            return;
        };

        // Seasonal fits get a component strip under the main chart when the
        // panel is tall enough to hold both.
        let (main_area, strip_area) = if seasonal.is_some() && inner.height >= 18 {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(9)])
                .split(inner);
            (split[0], Some(split[1]))
        } else {
            (inner, None)
        };

        let lines = [
            LineSpec {
                label: "yhat",
                color: (0, 255, 255),
                dashed: false,
                points: yhat,
            },
            LineSpec {
                label: "interval",
                color: (128, 128, 128),
                dashed: true,
                points: upper,
            },
            LineSpec {
                label: "",
                color: (128, 128, 128),
                dashed: true,
                points: lower,
            },
            LineSpec {
                label: "trend",
                color: (255, 255, 0),
                dashed: true,
                points: trend,
            },
        ];

        let widget = ForecastChart {
            lines: &lines,
            scatter: &scatter,
            x_bounds,
            y_bounds,
            x_label: "day",
            y_label: "sales",
            legend: true,
        };
        frame.render_widget(widget, main_area);

        if let (Some(points), Some(strip)) = (seasonal, strip_area) {
            let values = points.iter().map(|&(_, y)| y);
            let Some((sx, sy)) = chart_bounds(points.iter().map(|&(x, _)| x), values) else {
                return;
            };
            let strip_lines = [LineSpec {
                label: "seasonal",
                color: (255, 0, 255),
                dashed: false,
                points,
            }];
            let widget = ForecastChart {
                lines: &strip_lines,
                scatter: &[],
                x_bounds: sx,
                y_bounds: sy,
                x_label: "day",
                y_label: "effect",
                legend: false,
            };
            frame.render_widget(widget, strip);
        }
    }

    fn draw_inventory_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let block = Block::default().title("Horizon & Inventory").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(first) = run.recommendations.first() else {
            return;
        };
        let origin = first.ds;
        let day = |ds: NaiveDate| (ds - origin).num_days() as f64;

        let yhat: Vec<(f64, f64)> = run
            .recommendations
            .iter()
            .map(|r| (day(r.ds), r.yhat))
            .collect();
        let optimal: Vec<(f64, f64)> = run
            .recommendations
            .iter()
            .map(|r| (day(r.ds), r.optimal_inventory))
            .collect();

        let values = yhat.iter().chain(optimal.iter()).map(|&(_, y)| y);
        let Some((x_bounds, y_bounds)) = chart_bounds(yhat.iter().map(|&(x, _)| x), values) else {
            return;
        };

        let lines = [
            LineSpec {
                label: "yhat",
                color: (0, 255, 255),
                dashed: false,
                points: yhat,
            },
            LineSpec {
                label: "optimal",
                color: (0, 255, 0),
                dashed: true,
                points: optimal,
            },
        ];

        let widget = ForecastChart {
            lines: &lines,
            scatter: &[],
            x_bounds,
            y_bounds,
            x_label: "day",
            y_label: "units",
            legend: true,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &RunOutput) {
        let table = crate::report::format_recommendation_table(&run.recommendations);
        let p = Paragraph::new(table)
            .block(Block::default().title("Recommendations").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.view {
            View::Picker => "↑/↓ select  Enter open  r rescan  q quit",
            View::Results => "o pick file  ←/→ horizon ±5  +/- safety ±1%  m seasonal  r reload  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn next_seasonal(cur: SeasonalSpec) -> SeasonalSpec {
    match cur {
        SeasonalSpec::Auto => SeasonalSpec::None,
        SeasonalSpec::None => SeasonalSpec::Weekly,
        SeasonalSpec::Weekly => SeasonalSpec::Full,
        SeasonalSpec::Full => SeasonalSpec::Auto,
    }
}

/// Lower and upper prediction-interval bounds as chart series.
fn interval_series(
    forecast: &[ForecastPoint],
    origin: NaiveDate,
) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let day = |ds: NaiveDate| (ds - origin).num_days() as f64;
    let lower = forecast
        .iter()
        .map(|p| (day(p.ds), p.yhat_lower))
        .collect();
    let upper = forecast
        .iter()
        .map(|p| (day(p.ds), p.yhat_upper))
        .collect();
    (lower, upper)
}

/// Combined seasonal component (weekly + yearly); `None` for trend-only fits.
fn seasonal_series(forecast: &[ForecastPoint], origin: NaiveDate) -> Option<Vec<(f64, f64)>> {
    if forecast
        .iter()
        .all(|p| p.weekly.is_none() && p.yearly.is_none())
    {
        return None;
    }
    let day = |ds: NaiveDate| (ds - origin).num_days() as f64;
    Some(
        forecast
            .iter()
            .map(|p| (day(p.ds), p.weekly.unwrap_or(0.0) + p.yearly.unwrap_or(0.0)))
            .collect(),
    )
}

/// Common bounds computation: x from the series grid, y padded 5%.
fn chart_bounds(
    xs: impl Iterator<Item = f64>,
    ys: impl Iterator<Item = f64>,
) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for x in xs {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
    }
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for y in ys {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasonal_cycle_covers_all_variants() {
        let mut cur = SeasonalSpec::Auto;
        let mut seen = Vec::new();
        for _ in 0..4 {
            cur = next_seasonal(cur);
            seen.push(cur);
        }
        assert_eq!(cur, SeasonalSpec::Auto);
        assert!(seen.contains(&SeasonalSpec::Weekly));
        assert!(seen.contains(&SeasonalSpec::Full));
    }

    #[test]
    fn chart_bounds_pad_the_y_range() {
        let (x, y) = chart_bounds([0.0, 10.0].into_iter(), [100.0, 200.0].into_iter()).unwrap();
        assert_eq!(x, [0.0, 10.0]);
        assert!(y[0] < 100.0 && y[1] > 200.0);
    }

    #[test]
    fn chart_bounds_reject_non_finite_input() {
        assert!(chart_bounds([f64::NAN].into_iter(), [1.0].into_iter()).is_none());
        assert!(chart_bounds(std::iter::empty(), std::iter::empty()).is_none());
    }

    fn forecast_point(day: i64, weekly: Option<f64>) -> ForecastPoint {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ForecastPoint {
            ds: d0 + chrono::Duration::days(day),
            yhat: 100.0,
            yhat_lower: 90.0,
            yhat_upper: 110.0,
            trend: 100.0,
            weekly,
            yearly: None,
        }
    }

    #[test]
    fn interval_series_brackets_the_forecast() {
        let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let forecast = vec![forecast_point(0, None), forecast_point(1, None)];
        let (lower, upper) = interval_series(&forecast, origin);
        assert_eq!(lower.len(), 2);
        assert_eq!(upper.len(), 2);
        for (&(_, lo), &(_, hi)) in lower.iter().zip(upper.iter()) {
            assert!(lo < 100.0 && 100.0 < hi);
        }
    }

    #[test]
    fn seasonal_series_only_exists_for_seasonal_fits() {
        let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let trend_only = vec![forecast_point(0, None), forecast_point(1, None)];
        assert!(seasonal_series(&trend_only, origin).is_none());

        let weekly = vec![forecast_point(0, Some(3.0)), forecast_point(1, Some(-2.0))];
        let points = seasonal_series(&weekly, origin).unwrap();
        assert_eq!(points, vec![(0.0, 3.0), (1.0, -2.0)]);
    }
}
