use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, filtering or rendering air-quality data.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The dataset root is missing; nothing can be rendered for this session.
    #[error("Dataset folder not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A station file could not be read as a measurement table.
    #[error("Failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The selected station is not part of the loaded dataset.
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    /// A row references a station with no entry in the coordinate table.
    #[error("No coordinates configured for station: {0}")]
    UnmappedStation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// Errors that only invalidate the current render pass.
    pub fn is_render_warning(&self) -> bool {
        matches!(
            self,
            DashboardError::UnknownStation(_) | DashboardError::UnmappedStation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
