//! # Petro Models (L2: Business Logic)
//!
//! Blend formulas and derived cost series for the styrene / ABS chain.
//!
//! This crate provides:
//! - Blend ratio presets for SM, ABS and naphtha-cracker economics
//! - Derived quantities (costs, margins, gaps, supply signals) per row
//! - A unified series key spanning raw commodities and derived fields
//!
//! ## Design Principles
//!
//! - **Pure row-wise functions**: derived values are recomputed from the same
//!   row's prices, never stored independently
//! - **Named presets** instead of version flags for formula revisions
//! - **NaN propagation**: a missing input poisons only its dependants
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use petro_core::types::{Commodity, CommodityRow};
//! use petro_models::{DerivedField, DerivedSeriesBuilder, FormulaSet};
//!
//! let row = CommodityRow::new(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
//!     .with_price(Commodity::Wti, 59.44)
//!     .with_price(Commodity::Naphtha, 600.0)
//!     .with_price(Commodity::Benzene, 700.0)
//!     .with_price(Commodity::Ethylene, 800.0)
//!     .with_price(Commodity::Styrene, 1000.0);
//!
//! let builder = DerivedSeriesBuilder::new(FormulaSet::canonical());
//! let derived = builder.build_row(&row);
//!
//! // 700*0.67 + 800*0.25 + 600*0.05 + 150
//! assert!((derived.derived(DerivedField::SmCostActual) - 849.0).abs() < 1e-9);
//! assert!((derived.derived(DerivedField::SmMarginActual) - 151.0).abs() < 1e-9);
//! // No ABS inputs on this row
//! assert!(derived.derived(DerivedField::AbsCostActual).is_nan());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod blend;
pub mod derived;
pub mod error;
pub mod series;

pub use blend::{AbsBlend, CrackerYield, FormulaPreset, FormulaSet, SmBlend};
pub use derived::{DerivedField, DerivedRow, DerivedSeriesBuilder, DerivedValues};
pub use error::ModelError;
pub use series::SeriesKey;
