use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::{Choice, ALL_LOCATIONS, ALL_MONTHS, ALL_YEARS};
use crate::geo::MapArtifact;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – station / year / month selectors
// ---------------------------------------------------------------------------

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Location and period");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the combos.
    let stations: Vec<String> = dataset.stations().map(str::to_string).collect();
    let n_stations = dataset.len();
    let n_rows = dataset.row_count();
    let years = state.year_options.clone();
    let months = state.month_options.clone();

    // ---- Station ----
    ui.strong("Station");
    let mut station = state.selection.station.clone();
    egui::ComboBox::from_id_salt("station")
        .selected_text(station.label(ALL_LOCATIONS))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut station, Choice::All, ALL_LOCATIONS);
            for s in &stations {
                ui.selectable_value(&mut station, Choice::Only(s.clone()), s.as_str());
            }
        });
    state.set_station(station);
    ui.add_space(6.0);

    // ---- Year ----
    ui.strong("Year");
    let mut year = state.selection.year.clone();
    egui::ComboBox::from_id_salt("year")
        .selected_text(year.label(ALL_YEARS))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut year, Choice::All, ALL_YEARS);
            for y in &years {
                ui.selectable_value(&mut year, Choice::Only(*y), y.to_string());
            }
        });
    state.set_year(year);
    ui.add_space(6.0);

    // ---- Month ----
    ui.strong("Month");
    let mut month = state.selection.month.clone();
    egui::ComboBox::from_id_salt("month")
        .selected_text(month.label(ALL_MONTHS))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut month, Choice::All, ALL_MONTHS);
            for m in &months {
                ui.selectable_value(&mut month, Choice::Only(*m), m.to_string());
            }
        });
    state.set_month(month);

    ui.separator();
    ui.label(format!("{n_stations} stations, {n_rows} rows"));
    ui.label(
        RichText::new(state.config.data_dir.display().to_string())
            .small()
            .weak(),
    );

    if !state.warnings.is_empty() {
        ui.separator();
        egui::CollapsingHeader::new(
            RichText::new(format!("Skipped files ({})", state.warnings.len())).strong(),
        )
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for w in &state.warnings {
                ui.label(RichText::new(w).small().color(Color32::YELLOW));
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            let can_export = state.report.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export map as GeoJSON…"))
                .clicked()
            {
                export_map_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(report)) = (&state.dataset, &state.report) {
            ui.label(format!(
                "{} rows loaded, {} selected",
                ds.row_count(),
                report.summary.rows
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open air-quality dataset folder")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(path) = folder {
        state.load_dir(&path);
    }
}

pub fn export_map_dialog(state: &mut AppState) {
    let Some(report) = &state.report else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export map")
        .add_filter("GeoJSON", &["geojson", "json"])
        .set_file_name("air_quality_map.geojson")
        .save_file();

    let Some(path) = file else {
        return;
    };

    match write_geojson(&path, &report.map) {
        Ok(()) => {
            log::info!("Exported {} markers to {}", report.map.markers.len(), path.display());
        }
        Err(e) => {
            log::error!("Failed to export map: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_geojson(path: &Path, map: &MapArtifact) -> Result<()> {
    let text = serde_json::to_string_pretty(&map.to_geojson()).context("serializing GeoJSON")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
