use std::path::Path;

use eframe::egui::TextureHandle;

use crate::config::DashboardConfig;
use crate::data::filter::{self, Choice, FilterSelection};
use crate::data::loader;
use crate::data::model::Dataset;
use crate::report::Report;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The session context: configuration, loaded dataset and the current
/// selection with its report. Independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a folder loads).
    pub dataset: Option<Dataset>,

    pub selection: FilterSelection,

    /// Years and months offered for the selected station.
    pub year_options: Vec<i32>,
    pub month_options: Vec<u32>,

    /// Result of the last render pass (None when it failed).
    pub report: Option<Report>,

    /// Uploaded heat-map texture for `report`; dropped on every rerun.
    pub heat_texture: Option<TextureHandle>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Non-fatal problems from loading (skipped files).
    pub warnings: Vec<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            selection: FilterSelection::default(),
            year_options: Vec::new(),
            month_options: Vec::new(),
            report: None,
            heat_texture: None,
            status_message: None,
            warnings: Vec::new(),
        }
    }

    /// Load the configured data folder.
    pub fn load_configured(&mut self) {
        let dir = self.config.data_dir.clone();
        self.load_dir(&dir);
    }

    /// Load a dataset folder. On failure the previous dataset is kept.
    pub fn load_dir(&mut self, dir: &Path) {
        match loader::load_directory(dir, &self.config.file_prefix) {
            Ok(report) => {
                self.warnings = report.skipped.iter().map(|e| e.to_string()).collect();
                self.config.data_dir = dir.to_path_buf();
                self.set_dataset(report.dataset);
                if self.dataset.as_ref().is_some_and(Dataset::is_empty) {
                    self.status_message =
                        Some(format!("No station files found in {}", dir.display()));
                }
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the selection.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.selection = FilterSelection::default();
        self.status_message = None;
        self.refresh_options();
        self.rerun();
    }

    pub fn set_station(&mut self, station: Choice<String>) {
        if self.selection.station == station {
            return;
        }
        self.selection.station = station;
        self.refresh_options();
        self.rerun();
    }

    pub fn set_year(&mut self, year: Choice<i32>) {
        if self.selection.year != year {
            self.selection.year = year;
            self.rerun();
        }
    }

    pub fn set_month(&mut self, month: Choice<u32>) {
        if self.selection.month != month {
            self.selection.month = month;
            self.rerun();
        }
    }

    /// Recompute year/month options from the selected station's rows and
    /// drop choices that are no longer offered.
    fn refresh_options(&mut self) {
        let Some(ds) = &self.dataset else {
            self.year_options.clear();
            self.month_options.clear();
            return;
        };
        match filter::station_view(ds, &self.selection.station) {
            Ok(view) => {
                self.year_options = filter::year_options(&view);
                self.month_options = filter::month_options(&view);
            }
            Err(_) => {
                self.year_options.clear();
                self.month_options.clear();
            }
        }
        if let Choice::Only(y) = self.selection.year {
            if !self.year_options.contains(&y) {
                self.selection.year = Choice::All;
            }
        }
        if let Choice::Only(m) = self.selection.month {
            if !self.month_options.contains(&m) {
                self.selection.month = Choice::All;
            }
        }
    }

    /// Run one render pass for the current selection.
    pub fn rerun(&mut self) {
        self.heat_texture = None;
        let Some(ds) = &self.dataset else {
            self.report = None;
            return;
        };
        match Report::build(ds, &self.selection, &self.config) {
            Ok(report) => {
                self.report = Some(report);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Render failed: {e}");
                let kind = if e.is_render_warning() { "Warning" } else { "Error" };
                self.report = None;
                self.status_message = Some(format!("{kind}: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::row;
    use crate::data::model::StationTable;

    fn state() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(Dataset::from_tables([
            StationTable::new(
                "Dongsi",
                vec![row("Dongsi", 2013, 3, 1, Some(10.0)), row("Dongsi", 2014, 4, 1, Some(20.0))],
            ),
            StationTable::new("Tiantan", vec![row("Tiantan", 2015, 5, 1, Some(30.0))]),
        ]));
        state
    }

    #[test]
    fn test_station_change_resets_stale_choices() {
        let mut state = state();
        assert_eq!(state.year_options, [2013, 2014, 2015]);
        state.set_station(Choice::Only("Dongsi".to_string()));
        state.set_year(Choice::Only(2014));
        state.set_month(Choice::Only(4));
        assert_eq!(state.report.as_ref().unwrap().summary.rows, 1);

        state.set_station(Choice::Only("Tiantan".to_string()));
        assert_eq!(state.year_options, [2015]);
        assert_eq!(state.month_options, [5]);
        assert_eq!(state.selection.year, Choice::All);
        assert_eq!(state.selection.month, Choice::All);
        assert_eq!(state.report.as_ref().unwrap().summary.rows, 1);
    }

    #[test]
    fn test_warning_keeps_dataset() {
        let mut state = state();
        state.config.stations = crate::geo::StationCoordinates::new([(
            "Dongsi".to_string(),
            crate::geo::Coordinate::new(39.9, 116.4),
        )]);
        state.rerun();
        assert!(state.report.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("Tiantan"));

        state.set_station(Choice::Only("Dongsi".to_string()));
        assert!(state.report.is_some());
        assert!(state.status_message.is_none());
        assert_eq!(state.dataset.as_ref().unwrap().row_count(), 3);
    }

    #[test]
    fn test_missing_folder_sets_status() {
        let mut state = AppState::new(DashboardConfig::default());
        let dir = tempfile::tempdir().unwrap();
        state.load_dir(&dir.path().join("absent"));
        assert!(state.dataset.is_none());
        assert!(state.status_message.unwrap().starts_with("Dataset folder not found"));
    }
}
