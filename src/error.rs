//! Error types for MindSalary core
//!
//! The scoring functions themselves are total and never fail. These errors
//! only surface from the outer layers: JSON samples, configuration files,
//! persisted monitor history and the FFI boundary.

use thiserror::Error;

/// Errors that can occur outside the pure scoring path
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse stress sample: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid monitor history: {0}")]
    HistoryError(String),

    #[error("Stress model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Stress model inference failed: {0}")]
    ModelFailure(String),
}
