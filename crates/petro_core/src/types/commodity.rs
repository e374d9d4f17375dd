//! Commodity identifiers for the tracked price series.
//!
//! This module provides the closed set of raw series read from the weekly
//! price sheet, with their CSV codes, display names and the sheet header
//! aliases they are recognised by.
//!
//! # Examples
//!
//! ```
//! use petro_core::types::commodity::Commodity;
//!
//! assert_eq!(Commodity::Benzene.code(), "BZ");
//! assert_eq!(Commodity::from_header("  bz fob korea "), Some(Commodity::Benzene));
//! assert!(Commodity::Wti.is_crude());
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::HistoryError;

/// Raw commodity series tracked by the cost model.
///
/// Prices are USD per metric tonne, except [`Commodity::Wti`] which is USD
/// per barrel and acts as the single exogenous driver of the model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Commodity {
    /// WTI front-month crude future ($/bbl)
    Wti,
    /// Naphtha CFR Japan
    Naphtha,
    /// Benzene FOB Korea
    Benzene,
    /// Ethylene CFR Taiwan / SE Asia
    Ethylene,
    /// Propylene FOB Korea
    Propylene,
    /// Styrene monomer FOB Korea (SM market price)
    Styrene,
    /// Styrene monomer CFR China (regional variant)
    StyreneChina,
    /// Acrylonitrile CFR Far East Asia
    Acrylonitrile,
    /// Butadiene FOB Korea
    Butadiene,
    /// ABS resin CFR China (ABS market price)
    AbsMarket,
}

impl Commodity {
    /// All commodities in canonical column order.
    pub const ALL: [Commodity; 10] = [
        Commodity::Wti,
        Commodity::Naphtha,
        Commodity::Benzene,
        Commodity::Ethylene,
        Commodity::Propylene,
        Commodity::Styrene,
        Commodity::StyreneChina,
        Commodity::Acrylonitrile,
        Commodity::Butadiene,
        Commodity::AbsMarket,
    ];

    /// The commodities projected against crude (everything except crude itself).
    pub fn projected() -> impl Iterator<Item = Commodity> {
        Self::ALL.into_iter().filter(|c| !c.is_crude())
    }

    /// Short code used in CSV column names.
    pub fn code(&self) -> &'static str {
        match self {
            Commodity::Wti => "WTI",
            Commodity::Naphtha => "NAP",
            Commodity::Benzene => "BZ",
            Commodity::Ethylene => "ET",
            Commodity::Propylene => "PP",
            Commodity::Styrene => "SM",
            Commodity::StyreneChina => "SM_CN",
            Commodity::Acrylonitrile => "AN",
            Commodity::Butadiene => "BD",
            Commodity::AbsMarket => "ABS",
        }
    }

    /// Human-readable name for charts and console output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Commodity::Wti => "WTI",
            Commodity::Naphtha => "Naphtha CFR Japan",
            Commodity::Benzene => "BZ FOB Korea",
            Commodity::Ethylene => "ET CFR Taiwan",
            Commodity::Propylene => "PP FOB Korea",
            Commodity::Styrene => "SM FOB Korea",
            Commodity::StyreneChina => "SM CFR China",
            Commodity::Acrylonitrile => "AN CFR FEA",
            Commodity::Butadiene => "BD FOB Korea",
            Commodity::AbsMarket => "ABS CFR China",
        }
    }

    /// Sheet header names accepted for this commodity (lowercase).
    pub fn header_aliases(&self) -> &'static [&'static str] {
        match self {
            Commodity::Wti => &["wti", "wti ($/bbl)", "crude", "cl=f"],
            Commodity::Naphtha => &["nap", "naphtha", "naphtha cfr japan", "nap cfr japan"],
            Commodity::Benzene => &["bz", "benzene", "bz fob korea", "bz_fob_kr"],
            Commodity::Ethylene => &["et", "ethylene", "et cfr taiwan", "et_cfr_tw", "et cfr sea"],
            Commodity::Propylene => &["pp", "pg", "propylene", "pp fob korea", "pg fob korea"],
            Commodity::Styrene => &["sm", "styrene", "sm fob korea", "sm_fob_kr"],
            Commodity::StyreneChina => &["sm_cn", "sm cfr china", "sm_cfr_cn"],
            Commodity::Acrylonitrile => &["an", "acrylonitrile", "an cfr fea", "an_cfr"],
            Commodity::Butadiene => &["bd", "butadiene", "bd fob korea", "bd_fob_kr"],
            Commodity::AbsMarket => &["abs", "abs_mkt", "abs market", "abs cfr china"],
        }
    }

    /// Resolve a sheet header to a commodity (case-insensitive, trimmed).
    pub fn from_header(header: &str) -> Option<Commodity> {
        let normalised = header.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.header_aliases().contains(&normalised.as_str()))
    }

    /// Whether this is the crude benchmark series.
    #[inline]
    pub fn is_crude(&self) -> bool {
        matches!(self, Commodity::Wti)
    }
}

impl FromStr for Commodity {
    type Err = HistoryError;

    /// Parses a CSV code (case-insensitive).
    fn from_str(s: &str) -> Result<Self, HistoryError> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| HistoryError::UnknownCommodity(s.to_string()))
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
