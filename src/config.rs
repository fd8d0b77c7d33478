use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::DEFAULT_FILE_PREFIX;
use crate::error::{DashboardError, Result};
use crate::geo::{MapSettings, StationCoordinates};

/// Path of an optional JSON config file.
pub const CONFIG_ENV: &str = "AIR_QUALITY_CONFIG";
/// Overrides `data_dir` from the defaults or the config file.
pub const DATA_DIR_ENV: &str = "AIR_QUALITY_DATA_DIR";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Everything the dashboard needs besides the measurements themselves.
///
/// Example config file (all keys optional):
///
/// ```json
/// {
///   "data_dir": "main_data/PRSA_Data_20130301-20170228",
///   "stations": { "Dongsi": { "lat": 39.9293, "lon": 116.4174 } },
///   "map": { "sample_size": 500, "seed": 42, "heat_radius": 65.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Folder holding one CSV export per station.
    pub data_dir: PathBuf,
    /// File-name prefix stripped before reading the station id.
    pub file_prefix: String,
    pub stations: StationCoordinates,
    pub map: MapSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("main_data").join("PRSA_Data_20130301-20170228"),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            stations: StationCoordinates::beijing(),
            map: MapSettings::default(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then the file named by `AIR_QUALITY_CONFIG`, then
    /// `AIR_QUALITY_DATA_DIR`.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        log::debug!("Using config: {config:?}");
        log::info!(
            "Data folder {}, {} mapped stations",
            config.data_dir.display(),
            config.stations.len()
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("reading {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: DashboardConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.stations.is_empty() {
            return Err(DashboardError::Config("station table is empty".to_string()));
        }
        if self.map.heat_radius <= 0.0 {
            return Err(DashboardError::Config(format!(
                "heat_radius must be positive, got {}",
                self.map.heat_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "data_dir": "/data/prsa" }"#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data/prsa"));
        assert_eq!(config.file_prefix, "PRSA_Data_");
        assert_eq!(config.stations.len(), 12);
        assert_eq!(config.map, MapSettings::default());
    }

    #[test]
    fn test_custom_station_table() {
        let config = DashboardConfig::from_json(
            r#"{
                "stations": { "Lab": { "lat": 1.5, "lon": 2.5 } },
                "map": { "seed": 7 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.stations.len(), 1);
        assert_eq!(config.stations.coordinate("Lab").unwrap(), Coordinate::new(1.5, 2.5));
        assert_eq!(config.map.seed, 7);
        assert_eq!(config.map.sample_size, 500);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            DashboardConfig::from_json(r#"{ "stations": {} }"#),
            Err(DashboardError::Config(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{ "map": { "heat_radius": 0 } }"#),
            Err(DashboardError::Config(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json("not json"),
            Err(DashboardError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        fs::write(&path, r#"{ "file_prefix": "AQ_" }"#).unwrap();
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.file_prefix, "AQ_");
        assert!(DashboardConfig::from_file(&dir.path().join("missing.json")).is_err());
    }
}
