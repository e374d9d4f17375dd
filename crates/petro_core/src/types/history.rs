//! Dated price observations and the ordered price history.
//!
//! A [`CommodityRow`] is one weekly observation where any series may be
//! missing. A [`PriceHistory`] holds the usable rows (crude present) sorted
//! ascending by date and exposes the anchor row and the trend window.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::commodity::Commodity;
use super::error::HistoryError;

/// One time-stamped observation of the tracked commodity prices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommodityRow {
    /// Observation date
    pub date: NaiveDate,
    /// Observed prices; absent keys are missing observations
    prices: BTreeMap<Commodity, f64>,
}

impl CommodityRow {
    /// Create an empty row for the given date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            prices: BTreeMap::new(),
        }
    }

    /// Builder-style price insertion. Non-finite values are treated as missing.
    pub fn with_price(mut self, commodity: Commodity, price: f64) -> Self {
        self.set_price(commodity, Some(price));
        self
    }

    /// Set or clear a price. Non-finite values are treated as missing.
    pub fn set_price(&mut self, commodity: Commodity, price: Option<f64>) {
        match price.filter(|p| p.is_finite()) {
            Some(p) => {
                self.prices.insert(commodity, p);
            }
            None => {
                self.prices.remove(&commodity);
            }
        }
    }

    /// Observed price, if present.
    #[inline]
    pub fn price(&self, commodity: Commodity) -> Option<f64> {
        self.prices.get(&commodity).copied()
    }

    /// Observed price, or NaN when missing (for arithmetic that propagates gaps).
    #[inline]
    pub fn price_or_nan(&self, commodity: Commodity) -> f64 {
        self.price(commodity).unwrap_or(f64::NAN)
    }

    /// Crude benchmark price, if present.
    #[inline]
    pub fn crude(&self) -> Option<f64> {
        self.price(Commodity::Wti)
    }

    /// Whether the row can be used by the model (crude present).
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.crude().is_some()
    }

    /// Number of observed series in this row.
    pub fn observed_count(&self) -> usize {
        self.prices.len()
    }
}

/// Usable observations sorted ascending by date. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    rows: Vec<CommodityRow>,
}

impl PriceHistory {
    /// Build a history from rows that all carry a crude price.
    ///
    /// Rows are sorted ascending by date (stable, so same-date rows keep
    /// their input order).
    ///
    /// # Errors
    ///
    /// * `HistoryError::Empty` - no rows given
    /// * `HistoryError::MissingCrude` - a row has no crude price
    pub fn new(mut rows: Vec<CommodityRow>) -> Result<Self, HistoryError> {
        if let Some(bad) = rows.iter().find(|r| !r.is_usable()) {
            return Err(HistoryError::MissingCrude(bad.date.to_string()));
        }
        if rows.is_empty() {
            return Err(HistoryError::Empty);
        }
        rows.sort_by_key(|r| r.date);
        Ok(Self { rows })
    }

    /// Build a history, silently dropping rows without a crude price.
    pub fn from_unfiltered(rows: Vec<CommodityRow>) -> Result<Self, HistoryError> {
        Self::new(rows.into_iter().filter(CommodityRow::is_usable).collect())
    }

    /// All rows, ascending by date.
    #[inline]
    pub fn rows(&self) -> &[CommodityRow] {
        &self.rows
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a constructed history.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The most recent row, the baseline for all adjustments.
    pub fn anchor(&self) -> &CommodityRow {
        // Non-empty by construction.
        &self.rows[self.rows.len() - 1]
    }

    /// The last `n` rows (all rows when fewer are available).
    pub fn window(&self, n: usize) -> &[CommodityRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}
