//! # Adapter Feeds (A: Adapter)
//!
//! External market data for the cost model.
//!
//! This crate provides:
//! - [`CrudePriceFeed`]: the latest front-month crude settlement, with an
//!   explicit fallback when the upstream quote is unavailable
//! - [`SheetFeed`]: the published weekly price sheet, parsed into a
//!   [`PriceHistory`](petro_core::types::PriceHistory)
//!
//! Both feeds are blocking with short timeouts. The crude feed never fails
//! (it degrades to a constant); the sheet feed is fatal when it yields no data.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod crude;
pub mod error;
mod http;
pub mod sheet;

pub use crude::{
    check_band, parse_chart_close, CrudePriceFeed, FeedQuote, FixedCrudeFeed, YahooCrudeFeed,
    YahooFeedConfig,
};
pub use error::FeedError;
pub use sheet::{parse_sheet, SheetFeed, SheetSource};
