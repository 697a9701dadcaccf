//! Unified error types for glance_engine

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for glance_engine operations
#[derive(Debug, Error)]
pub enum GlanceError {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config '{path}': {message}")]
    ReadConfig { path: PathBuf, message: String },

    // === Config Errors ===
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid hex color: {value}")]
    InvalidHexColor { value: String },

    // === Bitmap Errors ===
    #[error("Failed to allocate {width}x{height} bitmap")]
    Allocation { width: i32, height: i32 },

    #[error("Bitmap layout mismatch: {width}x{height} needs {expected} bytes, buffer has {actual}")]
    BitmapLayout { width: i32, height: i32, expected: usize, actual: usize },

    #[error("{0}")]
    Generic(String),
}

/// Result type alias for glance_engine operations
pub type Result<T> = std::result::Result<T, GlanceError>;

// === Convenience constructors ===
impl GlanceError {
    /// Create a generic error from any displayable type
    pub fn generic(msg: impl std::fmt::Display) -> Self {
        Self::Generic(msg.to_string())
    }

    /// Create a config read error
    pub fn read_config(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ReadConfig {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Faults that leave the panel unable to draw a trustworthy frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GlanceError::Allocation { .. } | GlanceError::BitmapLayout { .. })
    }
}
