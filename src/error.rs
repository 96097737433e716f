//! Error taxonomy for thermal-state searches.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for MHETS runs.
#[derive(Error, Debug)]
pub enum MhetsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Storage not found: {}", .0.display())]
    StorageNotFound(PathBuf),

    #[error("Optimizer failure at beta = {beta}: {message}")]
    OptimizerFailure { beta: f64, message: String },

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Numeric anomaly: {0}")]
    NumericAnomaly(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MhetsError {
    fn from(e: serde_json::Error) -> Self {
        MhetsError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for MhetsError {
    fn from(e: serde_yaml::Error) -> Self {
        MhetsError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MhetsError>;
