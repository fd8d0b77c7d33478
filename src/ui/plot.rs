use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotBounds, PlotPoints, Points};
use palette::Srgb;

use crate::charts::{self, LineChart, ScatterChart};

const CHART_HEIGHT: f32 = 280.0;

pub fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Trend line chart
// ---------------------------------------------------------------------------

/// One line per pollutant over the aggregate row index.
pub fn line_chart(ui: &mut Ui, id: &str, chart: &LineChart) {
    ui.strong(chart.title.as_str());

    let n = chart
        .series
        .iter()
        .filter_map(|s| s.points.last())
        .map(|p| p[0])
        .fold(0.0f64, f64::max);

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_boxed_zoom(chart.y_bounds.is_none())
        .allow_drag(chart.y_bounds.is_none())
        .allow_scroll(chart.y_bounds.is_none())
        .allow_zoom(chart.y_bounds.is_none())
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series.points.iter().copied().collect();
                let line = Line::new(points)
                    .name(&series.name)
                    .color(to_color32(series.color))
                    .width(1.5);
                plot_ui.line(line);
            }

            if let Some((y_min, y_max)) = chart.y_bounds {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [0.0, y_min],
                    [n.max(1.0), y_max],
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter chart
// ---------------------------------------------------------------------------

pub fn scatter_chart(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    ui.strong(chart.title.as_str());

    if chart.points.is_empty() {
        ui.label("No rows with both values present.");
        return;
    }

    let color = to_color32(chart.color).gamma_multiply(0.5);
    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .show(ui, |plot_ui| {
            let points: PlotPoints = chart.points.iter().copied().collect();
            plot_ui.points(Points::new(points).radius(1.5).color(color).name("PM2.5"));
        });
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, id: &str, chart: &charts::BarChart) {
    ui.strong(chart.title.as_str());

    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            let value = bar.value.value()?;
            Some(
                Bar::new(i as f64, value)
                    .name(&bar.label)
                    .width(0.6)
                    .fill(to_color32(bar.color)),
            )
        })
        .collect();

    for bar in chart.bars.iter().filter(|b| b.value.is_no_data()) {
        ui.label(format!("{}: {}", bar.label, bar.value));
    }

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(chart.y_label.clone())
        .include_y(0.0)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < f64::EPSILON && i >= 0.0 {
                labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
