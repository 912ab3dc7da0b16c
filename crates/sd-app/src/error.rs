//! Error types for the sd-app layer.

use std::path::PathBuf;

/// Application error shared by the controller and both front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] sd_session::SessionError),

    #[error(transparent)]
    Layout(#[from] sd_layout::LayoutError),

    #[error(transparent)]
    Core(#[from] sd_core::CoreError),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sd-app operations.
pub type AppResult<T> = Result<T, AppError>;
