use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color;
use crate::data::model::Column;
use crate::metrics::Metric;
use crate::state::AppState;
use crate::ui::plot::to_color32;
use crate::ui::{map, plot, table};

// ---------------------------------------------------------------------------
// Central panel – the report for the current selection
// ---------------------------------------------------------------------------

pub fn report_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset folder to begin  (File → Open dataset folder…)");
        });
        return;
    }

    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing to show for this selection.");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(report.title.as_str());
            ui.label(format!("Showing {}", report.selection.period_label()));
            ui.add_space(8.0);

            // ---- Air-quality status and means ----
            let quality = report.summary.quality;
            ui.label(
                RichText::new(format!("Air status: {quality}"))
                    .size(20.0)
                    .strong()
                    .color(to_color32(color::quality_color(quality))),
            );
            egui::Grid::new("pollutant_means")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for (column, metric) in &report.summary.means {
                        mean_row(ui, *column, *metric);
                    }
                });
            ui.add_space(4.0);
            egui::CollapsingHeader::new("Weather")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    egui::Grid::new("weather_means")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui: &mut Ui| {
                            for (column, metric) in &report.summary.weather {
                                mean_row(ui, *column, *metric);
                            }
                            ui.label("Prevailing wind");
                            match &report.summary.prevailing_wind {
                                Some(dir) => ui.label(dir.as_str()),
                                None => ui.label(RichText::new("data unavailable").weak()),
                            };
                            ui.end_row();
                        });
                });
            ui.separator();

            // ---- Trend + daily table ----
            plot::line_chart(ui, "trend", &report.trend);
            ui.add_space(6.0);
            ui.strong("Daily air-quality means");
            table::daily_table(ui, &report.daily, report.grouping);
            ui.separator();

            // ---- Weather vs PM2.5 ----
            ui.heading("Temperature and dew point against PM2.5");
            ui.columns(2, |cols| {
                plot::scatter_chart(&mut cols[0], "temp_scatter", &report.temp_scatter);
                plot::scatter_chart(&mut cols[1], "dewp_scatter", &report.dewp_scatter);
            });
            ui.label(format!(
                "Correlation of PM2.5 with {}: {}",
                Column::Temp,
                report.corr_temp
            ));
            ui.label(format!(
                "Correlation of PM2.5 with {}: {}",
                Column::Dewp,
                report.corr_dewp
            ));
            ui.separator();

            // ---- Workday vs weekend ----
            plot::bar_chart(ui, "weekday", &report.weekday_chart);
            ui.separator();

            // ---- Map ----
            map::heat_map(ui, &report.map, &state.config.stations, &mut state.heat_texture);
        });
}

fn mean_row(ui: &mut Ui, column: Column, metric: Metric) {
    ui.label(format!("Mean {column}"));
    match metric.value() {
        Some(v) => ui.label(format!("{v:.2} {}", column.unit())),
        None => ui.label(RichText::new(metric.to_string()).weak()),
    };
    ui.end_row();
}
