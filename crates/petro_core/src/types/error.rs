//! Error types for structured error handling.
//!
//! This module provides:
//! - `HistoryError`: Errors from building a price history or parsing identifiers
//! - `RegressionError`: Errors from least squares fitting

use thiserror::Error;

/// Errors raised while assembling a [`PriceHistory`](super::PriceHistory).
///
/// # Examples
/// ```
/// use petro_core::types::HistoryError;
///
/// let err = HistoryError::Empty;
/// assert_eq!(format!("{}", err), "Price history contains no usable rows");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// No row with a crude price survived ingestion.
    #[error("Price history contains no usable rows")]
    Empty,

    /// A row without a crude price was handed to the history.
    #[error("Row dated {0} has no crude price")]
    MissingCrude(String),

    /// Unknown commodity code.
    #[error("Unknown commodity: {0}")]
    UnknownCommodity(String),
}

/// Least squares fitting errors.
///
/// # Examples
/// ```
/// use petro_core::types::RegressionError;
///
/// let err = RegressionError::InsufficientData { got: 1, need: 2 };
/// assert!(format!("{}", err).contains("got 1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegressionError {
    /// Fewer observations than the fit requires.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Regressor and response lengths differ.
    #[error("Length mismatch: {xs} regressor values vs {ys} responses")]
    LengthMismatch {
        /// Regressor length
        xs: usize,
        /// Response length
        ys: usize,
    },

    /// Zero variance in the regressor or response.
    #[error("Degenerate input: {0}")]
    Degenerate(String),

    /// Non-finite value in the input.
    #[error("Non-finite input at index {0}")]
    NonFinite(usize),
}
