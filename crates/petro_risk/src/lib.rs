//! # Petro Risk (L3: Application)
//!
//! Crude-oil sensitivities, cost propagation and scenario analysis.
//!
//! This crate provides:
//! - Per-series linear sensitivities to crude with fit-quality diagnostics
//! - The cost projector converting a crude move and a risk premium into
//!   adjusted prices, costs, margins, gaps and an alert level
//! - A ladder of stress scenarios and a runner applying the projector to each
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             petro_risk (L3)             │
//! ├─────────────────────────────────────────┤
//! │  sensitivity/ - SensitivityEstimator,   │
//! │                 SensitivityTable        │
//! │  projector/   - CostProjector, Snapshot │
//! │  scenarios/   - ScenarioLadder, Runner  │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │           petro_models (L2)             │
//! │  FormulaSet, DerivedRow                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use petro_core::types::{Commodity, CommodityRow};
//! use petro_models::{DerivedSeriesBuilder, FormulaSet, SeriesKey};
//! use petro_risk::projector::{CostProjector, ProjectionRequest};
//! use petro_risk::sensitivity::SensitivityTable;
//!
//! let row = CommodityRow::new(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
//!     .with_price(Commodity::Wti, 59.44)
//!     .with_price(Commodity::Naphtha, 560.0);
//! let anchor = DerivedSeriesBuilder::default().build_row(&row);
//!
//! let projector = CostProjector::new(FormulaSet::canonical());
//! let table = SensitivityTable::defaults();
//! let snapshot = projector.project(&anchor, &table, &ProjectionRequest::new(69.44, 0.0));
//!
//! // Naphtha default slope is 6.52 $/t per $1/bbl
//! let nap = snapshot.adjusted(SeriesKey::Commodity(Commodity::Naphtha));
//! assert!((nap - (560.0 + 65.2)).abs() < 1e-9);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod error;
pub mod projector;
pub mod scenarios;
pub mod sensitivity;

pub use error::RiskError;
