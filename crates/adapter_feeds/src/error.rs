//! Feed error types.

use thiserror::Error;

/// Errors from the crude and sheet feeds.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure or non-success status
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local file could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Sheet is not valid CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Quote outside the plausibility band
    #[error("Price {value} outside plausible range [{min}, {max}]")]
    OutOfRange {
        /// Quoted price
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// No header row in the sheet
    #[error("Sheet has no header row")]
    MissingHeader,

    /// No column maps to crude
    #[error("Sheet has no crude price column (headers: {0})")]
    MissingCrudeColumn(String),

    /// No row survived parsing
    #[error("Sheet contains no rows with a date and a crude price")]
    Empty,
}
