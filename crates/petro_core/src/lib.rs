//! # petro_core: Foundation Types for Petrochemical Cost Modelling
//!
//! ## Layer 1 (Foundation) Role
//!
//! petro_core is the bottom layer of the workspace, providing:
//! - Commodity identifiers and sheet header aliases (`types::commodity`)
//! - Dated price observations and the ordered history (`types::history`)
//! - Error types: `RegressionError`, `HistoryError` (`types::error`)
//! - Ordinary least squares fitting (`math::regression`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other petro_* crates, with minimal external dependencies:
//! - num-traits: Generic floating-point arithmetic for the regression code
//! - chrono: Observation dates
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use chrono::NaiveDate;
//! use petro_core::math::regression::LinearFit;
//! use petro_core::types::{Commodity, CommodityRow, PriceHistory};
//!
//! let date = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
//! let row = CommodityRow::new(date)
//!     .with_price(Commodity::Wti, 59.44)
//!     .with_price(Commodity::Naphtha, 540.0);
//! let history = PriceHistory::new(vec![row]).unwrap();
//! assert_eq!(history.anchor().price(Commodity::Wti), Some(59.44));
//!
//! let fit = LinearFit::fit(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
//! assert!((fit.slope - 2.0_f64).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for Commodity and CommodityRow

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
