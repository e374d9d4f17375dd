//! Core commodity and observation types.
//!
//! This module provides:
//! - `commodity`: The closed set of tracked raw price series
//! - `history`: Dated observations and the ordered price history
//! - `error`: Structured error types for history assembly and regression
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`Commodity`] from `commodity`
//! - [`CommodityRow`], [`PriceHistory`] from `history`
//! - [`HistoryError`], [`RegressionError`] from `error`

pub mod commodity;
pub mod error;
pub mod history;

// Re-export commonly used types at module level
pub use commodity::Commodity;
pub use error::{HistoryError, RegressionError};
pub use history::{CommodityRow, PriceHistory};
