//! Plotters-powered forecast chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One line series with display metadata.
pub struct LineSpec {
    /// Legend label; an empty label keeps the series out of the legend
    /// (used for the second edge of the interval band).
    pub label: &'static str,
    pub color: (u8, u8, u8),
    pub dashed: bool,
    pub points: Vec<(f64, f64)>,
}

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test/benchmark the data prep separately.
pub struct ForecastChart<'a> {
    /// Line series (forecast, trend, inventory level, ...).
    pub lines: &'a [LineSpec],
    /// Scatter series for observed sales.
    pub scatter: &'a [(f64, f64)],
    /// X bounds (days since the first observation).
    pub x_bounds: [f64; 2],
    /// Y bounds (units of the input series).
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Draw a series legend (useful when two lines share the panel).
    pub legend: bool,
}

impl<'a> Widget for ForecastChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in
            // low-resolution terminal rendering; axes + labels are enough here.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in self.lines {
                let (r, g, b) = line.color;
                let color = RGBColor(r, g, b);
                let anno = if line.dashed {
                    chart.draw_series(DashedLineSeries::new(
                        line.points.iter().copied(),
                        4,
                        2,
                        color.into(),
                    ))?
                } else {
                    chart.draw_series(LineSeries::new(line.points.iter().copied(), &color))?
                };
                if !line.label.is_empty() {
                    anno.label(line.label)
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color));
                }
            }

            // Observed points last so they stay visible over the lines.
            //
            // `Pixel` instead of `Circle`: the backend maps circle radii into
            // normalized canvas units, producing huge circles in terminals.
            chart.draw_series(
                self.scatter
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), WHITE)),
            )?;

            if self.legend && !self.lines.is_empty() {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .background_style(BLACK.mix(0.6))
                    .border_style(WHITE)
                    .label_font(("sans-serif", 10).into_font().color(&WHITE))
                    .draw()?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
