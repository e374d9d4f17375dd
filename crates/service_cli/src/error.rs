//! Error types for the petrocost runner.

use adapter_feeds::FeedError;
use petro_models::ModelError;
use petro_risk::RiskError;
use thiserror::Error;

use crate::config::ConfigError;

/// Runner error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Market data feed failed
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Formula preset could not be resolved
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Estimator, projector or ladder settings rejected
    #[error("Risk error: {0}")]
    Risk(#[from] RiskError),

    /// CSV output failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Output file could not be written
    #[error("Failed to write {path}: {source}")]
    Output {
        /// Output path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Create an output error for `path`.
    pub fn output(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Output {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for runner operations
pub type Result<T> = std::result::Result<T, CliError>;
