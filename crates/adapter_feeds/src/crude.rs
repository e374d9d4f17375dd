//! Front-month crude price feed.
//!
//! [`YahooCrudeFeed`] reads the Yahoo Finance chart endpoint for `CL=F`
//! (continuous front month, so contract rolls are handled upstream) and
//! takes the most recent non-null daily close. Any failure degrades to a
//! configured fallback quote; the run never stops for lack of a live price.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::FeedError;
use crate::http;

/// A crude price with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuote {
    /// Price ($/bbl)
    pub value: f64,
    /// Where the price came from, for reports
    pub provenance: String,
    /// True when the price is a fallback rather than a live quote
    pub degraded: bool,
}

impl FeedQuote {
    /// Live quote.
    pub fn live(value: f64, provenance: impl Into<String>) -> Self {
        Self {
            value,
            provenance: provenance.into(),
            degraded: false,
        }
    }

    /// Fallback quote.
    pub fn fallback(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            provenance: label.into(),
            degraded: true,
        }
    }
}

/// Source of the latest crude benchmark price.
pub trait CrudePriceFeed {
    /// Latest price. Implementations degrade to a fallback instead of failing.
    fn quote(&self) -> FeedQuote;
}

/// Constant quote for offline runs and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCrudeFeed {
    quote: FeedQuote,
}

impl FixedCrudeFeed {
    /// Feed always returning `quote`.
    pub fn new(quote: FeedQuote) -> Self {
        Self { quote }
    }
}

impl CrudePriceFeed for FixedCrudeFeed {
    fn quote(&self) -> FeedQuote {
        self.quote.clone()
    }
}

/// Yahoo chart feed settings.
#[derive(Debug, Clone, PartialEq)]
pub struct YahooFeedConfig {
    /// Chart endpoint without the ticker
    pub base_url: String,
    /// Ticker symbol
    pub ticker: String,
    /// Connect and request timeout
    pub timeout: Duration,
    /// Lowest plausible price
    pub min_price: f64,
    /// Highest plausible price
    pub max_price: f64,
    /// Price used when the quote is unavailable
    pub fallback_price: f64,
    /// Provenance label of the fallback price
    pub fallback_label: String,
}

impl Default for YahooFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            ticker: "CL=F".to_string(),
            timeout: Duration::from_secs(10),
            min_price: 20.0,
            max_price: 200.0,
            fallback_price: 59.44,
            fallback_label: "fallback (sheet anchor 2026-01-16)".to_string(),
        }
    }
}

impl YahooFeedConfig {
    /// Full chart URL for the ticker.
    pub fn chart_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.ticker)
    }
}

/// Live crude feed backed by the Yahoo Finance chart API.
#[derive(Debug, Clone)]
pub struct YahooCrudeFeed {
    config: YahooFeedConfig,
    client: Client,
}

impl YahooCrudeFeed {
    /// Create the feed.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Http` if the HTTP client cannot be built.
    pub fn new(config: YahooFeedConfig) -> Result<Self, FeedError> {
        let client = http::client(config.timeout)?;
        Ok(Self { config, client })
    }

    /// Settings in use.
    pub fn config(&self) -> &YahooFeedConfig {
        &self.config
    }

    /// Fetch and validate the latest close, without fallback.
    ///
    /// # Errors
    ///
    /// * `FeedError::Http` - transport failure or non-success status
    /// * `FeedError::Malformed` - unexpected body or no close available
    /// * `FeedError::OutOfRange` - close outside the plausibility band
    pub fn fetch(&self) -> Result<f64, FeedError> {
        let body = http::get_text(
            &self.client,
            &self.config.chart_url(),
            &[("range", "2d"), ("interval", "1d")],
        )?;
        let close = parse_chart_close(&body)?;
        check_band(close, self.config.min_price, self.config.max_price)
    }
}

impl CrudePriceFeed for YahooCrudeFeed {
    fn quote(&self) -> FeedQuote {
        match self.fetch() {
            Ok(value) => {
                info!(ticker = %self.config.ticker, value, "Live crude quote");
                FeedQuote::live(value, format!("Yahoo Finance {} (live)", self.config.ticker))
            }
            Err(e) => {
                warn!(
                    ticker = %self.config.ticker,
                    error = %e,
                    fallback = self.config.fallback_price,
                    "Crude quote unavailable, using fallback"
                );
                FeedQuote::fallback(self.config.fallback_price, self.config.fallback_label.clone())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Last non-null close of a Yahoo chart response.
///
/// # Errors
///
/// Returns `FeedError::Malformed` when the body is not a chart response,
/// carries an API error, or has no usable close.
pub fn parse_chart_close(body: &str) -> Result<f64, FeedError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| FeedError::Malformed(format!("chart response: {}", e)))?;

    if let Some(err) = envelope.chart.error.filter(|e| !e.is_null()) {
        return Err(FeedError::Malformed(format!("chart error: {}", err)));
    }

    envelope
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .flat_map(|r| r.indicators.quote)
        .flat_map(|q| q.close)
        .flatten()
        .filter(|v| v.is_finite())
        .last()
        .ok_or_else(|| FeedError::Malformed("no close price in response".to_string()))
}

/// Reject prices outside `[min, max]`.
///
/// # Errors
///
/// Returns `FeedError::OutOfRange` when `value` lies outside the band.
pub fn check_band(value: f64, min: f64, max: f64) -> Result<f64, FeedError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(FeedError::OutOfRange { value, min, max })
    }
}
