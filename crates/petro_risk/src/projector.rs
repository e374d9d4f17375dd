//! Cost projection under a crude move and a geopolitical risk premium.
//!
//! [`CostProjector::project`] is a pure function of the anchor row, the
//! sensitivity table, the formula set and the request. The pipeline:
//!
//! 1. crude delta = target − anchor crude
//! 2. risk-equivalent delta = premium ÷ equivalence basis (naphtha slope)
//! 3. every raw series shifts by (crude delta + risk-equivalent) × its slope,
//!    with an optional ethylene override
//! 4. a butadiene tight-supply premium from the simulated cracker margin
//! 5. costs and supply signals recomputed from the shifted raw prices
//! 6. ABS market shifts by crude delta × slope plus the flat premium
//! 7. SM margins use a crude-delta-only re-projection
//! 8. ABS gaps = adjusted ABS market − adjusted ABS cost
//! 9. the cracker field takes the simulated margin
//! 10. alert level from the adjusted ABS gap

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use petro_core::types::Commodity;
use petro_models::{DerivedField, DerivedRow, DerivedValues, FormulaSet, SeriesKey};
use tracing::debug;

use crate::error::RiskError;
use crate::sensitivity::SensitivityTable;

/// Below this magnitude the equivalence basis is treated as unusable.
const BASIS_EPSILON: f64 = 1e-9;

/// One projector invocation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectionRequest {
    /// Target crude price ($/bbl)
    pub target_crude: f64,
    /// Flat geopolitical risk premium ($/t)
    pub risk_premium: f64,
    /// Replaces the adjusted ethylene price when set
    pub ethylene_override: Option<f64>,
}

impl ProjectionRequest {
    /// Request without an ethylene override.
    pub fn new(target_crude: f64, risk_premium: f64) -> Self {
        Self {
            target_crude,
            risk_premium,
            ethylene_override: None,
        }
    }

    /// Set the ethylene override.
    pub fn with_ethylene_override(mut self, price: f64) -> Self {
        self.ethylene_override = Some(price);
        self
    }
}

/// Butadiene tight-supply premium parameters.
///
/// A cracker margin squeeze cuts run rates, which tightens butadiene: the
/// premium is `clamp(-(simulated - actual) * scale, 0, cap)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TightPremiumConfig {
    /// Premium per $1 of cracker margin lost
    pub scale: f64,
    /// Upper bound ($/t)
    pub cap: f64,
}

impl Default for TightPremiumConfig {
    fn default() -> Self {
        Self {
            scale: 0.5,
            cap: 150.0,
        }
    }
}

impl TightPremiumConfig {
    /// Premium for a cracker margin change. Non-finite changes give zero.
    #[inline]
    pub fn premium(&self, margin_delta: f64) -> f64 {
        if !margin_delta.is_finite() {
            return 0.0;
        }
        (-margin_delta * self.scale).max(0.0).min(self.cap)
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidParameter` for negative or non-finite values.
    pub fn validate(&self) -> Result<(), RiskError> {
        for (name, value) in [
            ("tight_premium_scale", self.scale),
            ("tight_premium_cap", self.cap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RiskError::InvalidParameter {
                    name,
                    reason: format!("must be finite and non-negative, got {}", value),
                });
            }
        }
        Ok(())
    }
}

/// Alert classification of the adjusted ABS gap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlertLevel {
    /// Gap below zero
    NegativeMargin,
    /// Gap below the alert threshold
    Alert,
    /// Gap at or above the alert threshold
    Normal,
    /// Gap could not be computed
    Unknown,
}

impl AlertLevel {
    /// Classify a gap against a threshold.
    pub fn classify(gap: f64, threshold: f64) -> Self {
        if gap.is_nan() {
            Self::Unknown
        } else if gap < 0.0 {
            Self::NegativeMargin
        } else if gap < threshold {
            Self::Alert
        } else {
            Self::Normal
        }
    }

    /// Identifier written to the CSV.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NegativeMargin => "NEGATIVE_MARGIN",
            Self::Alert => "ALERT",
            Self::Normal => "NORMAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Console flag.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::NegativeMargin => "⚠ negative",
            Self::Alert => "⚠ alert",
            Self::Normal => "✓",
            Self::Unknown => "?",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Anchor value and projected value of one series.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldValue {
    /// Value on the anchor row (NaN when missing)
    pub actual: f64,
    /// Projected value (NaN when an input was missing)
    pub adjusted: f64,
}

impl FieldValue {
    /// Adjusted minus actual.
    #[inline]
    pub fn change(&self) -> f64 {
        self.adjusted - self.actual
    }
}

/// Result of one projection. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    fields: BTreeMap<SeriesKey, FieldValue>,
    anchor_date: NaiveDate,
    crude_realtime: f64,
    crude_anchor: f64,
    crude_delta: f64,
    risk_premium: f64,
    risk_equiv_delta: f64,
    total_delta: f64,
    cracker_margin: f64,
    bd_tight_premium: f64,
    alert: AlertLevel,
}

impl Snapshot {
    /// Value pair for `key` (both NaN when unknown).
    pub fn field(&self, key: SeriesKey) -> FieldValue {
        self.fields.get(&key).copied().unwrap_or(FieldValue {
            actual: f64::NAN,
            adjusted: f64::NAN,
        })
    }

    /// Anchor value of `key`.
    #[inline]
    pub fn actual(&self, key: SeriesKey) -> f64 {
        self.field(key).actual
    }

    /// Projected value of `key`.
    #[inline]
    pub fn adjusted(&self, key: SeriesKey) -> f64 {
        self.field(key).adjusted
    }

    /// All fields in column order (crude first).
    pub fn fields(&self) -> impl Iterator<Item = (SeriesKey, FieldValue)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, *v))
    }

    /// Date of the anchor row.
    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor_date
    }

    /// Crude price the projection targets.
    pub fn crude_realtime(&self) -> f64 {
        self.crude_realtime
    }

    /// Crude price on the anchor row.
    pub fn crude_anchor(&self) -> f64 {
        self.crude_anchor
    }

    /// Target minus anchor crude.
    pub fn crude_delta(&self) -> f64 {
        self.crude_delta
    }

    /// Flat risk premium.
    pub fn risk_premium(&self) -> f64 {
        self.risk_premium
    }

    /// Crude-equivalent move of the risk premium.
    pub fn risk_equiv_delta(&self) -> f64 {
        self.risk_equiv_delta
    }

    /// Crude delta plus risk-equivalent delta.
    pub fn total_delta(&self) -> f64 {
        self.total_delta
    }

    /// Simulated cracker margin (butadiene before its tight premium).
    pub fn cracker_margin(&self) -> f64 {
        self.cracker_margin
    }

    /// Butadiene tight-supply premium.
    pub fn bd_tight_premium(&self) -> f64 {
        self.bd_tight_premium
    }

    /// Alert level of the adjusted ABS gap.
    pub fn alert(&self) -> AlertLevel {
        self.alert
    }

    /// Adjusted actual ABS gap.
    pub fn abs_gap(&self) -> f64 {
        self.adjusted(SeriesKey::Derived(DerivedField::AbsGapActual))
    }

    /// Adjusted theoretical ABS gap.
    pub fn abs_gap_theoretical(&self) -> f64 {
        self.adjusted(SeriesKey::Derived(DerivedField::AbsGapTheoretical))
    }
}

/// Converts crude moves and risk premia into adjusted prices and margins.
#[derive(Clone, Debug)]
pub struct CostProjector {
    formulas: FormulaSet,
    tight_premium: TightPremiumConfig,
    alert_threshold: f64,
}

impl Default for CostProjector {
    fn default() -> Self {
        Self::new(FormulaSet::canonical())
    }
}

impl CostProjector {
    /// Default ABS gap alert threshold ($/t).
    pub const DEFAULT_ALERT_THRESHOLD: f64 = 150.0;

    /// Create a projector with default premium and alert settings.
    pub fn new(formulas: FormulaSet) -> Self {
        Self {
            formulas,
            tight_premium: TightPremiumConfig::default(),
            alert_threshold: Self::DEFAULT_ALERT_THRESHOLD,
        }
    }

    /// Set the butadiene tight-premium parameters.
    pub fn with_tight_premium(mut self, config: TightPremiumConfig) -> Self {
        self.tight_premium = config;
        self
    }

    /// Set the ABS gap alert threshold.
    pub fn with_alert_threshold(mut self, threshold: f64) -> Self {
        self.alert_threshold = threshold;
        self
    }

    /// Formulas in use.
    pub fn formulas(&self) -> &FormulaSet {
        &self.formulas
    }

    /// Tight-premium parameters in use.
    pub fn tight_premium(&self) -> &TightPremiumConfig {
        &self.tight_premium
    }

    /// Alert threshold in use.
    pub fn alert_threshold(&self) -> f64 {
        self.alert_threshold
    }

    /// Crude-equivalent move of a flat premium. Zero when the premium is zero
    /// or the basis is unusable.
    pub fn risk_equivalent(risk_premium: f64, basis: f64) -> f64 {
        if risk_premium == 0.0 || !basis.is_finite() || basis.abs() < BASIS_EPSILON {
            0.0
        } else {
            risk_premium / basis
        }
    }

    /// Project the anchor row.
    pub fn project(
        &self,
        anchor: &DerivedRow,
        table: &SensitivityTable,
        request: &ProjectionRequest,
    ) -> Snapshot {
        let crude_anchor = anchor.price(Commodity::Wti);
        let crude_delta = request.target_crude - crude_anchor;
        let risk_equiv_delta =
            Self::risk_equivalent(request.risk_premium, table.equivalence_basis());
        let total_delta = crude_delta + risk_equiv_delta;

        let mut raw = self.shift_raw(anchor, table, request, total_delta);

        let cracker_actual = anchor.derived(DerivedField::CrackerMargin);
        let cracker_margin = self.simulate_cracker(&raw);
        let bd_tight_premium = self.tight_premium.premium(cracker_margin - cracker_actual);
        *raw.entry(Commodity::Butadiene).or_insert(f64::NAN) += bd_tight_premium;

        let abs_slope = table.slope(SeriesKey::Commodity(Commodity::AbsMarket));
        raw.insert(
            Commodity::AbsMarket,
            anchor.price(Commodity::AbsMarket) + crude_delta * abs_slope + request.risk_premium,
        );

        let costs = DerivedValues::compute(&self.formulas, |c| lookup(&raw, c));

        let mut crude_only = self.shift_raw(anchor, table, request, crude_delta);
        *crude_only.entry(Commodity::Butadiene).or_insert(f64::NAN) += bd_tight_premium;
        let margins = DerivedValues::compute(&self.formulas, |c| lookup(&crude_only, c));

        let mut fields = BTreeMap::new();
        for commodity in Commodity::ALL {
            fields.insert(
                SeriesKey::Commodity(commodity),
                FieldValue {
                    actual: anchor.price(commodity),
                    adjusted: lookup(&raw, commodity),
                },
            );
        }
        for field in DerivedField::ALL {
            let adjusted = match field {
                DerivedField::SmMarginActual | DerivedField::SmMarginTheoretical => {
                    margins.get(field)
                }
                DerivedField::CrackerMargin => cracker_margin,
                _ => costs.get(field),
            };
            fields.insert(
                SeriesKey::Derived(field),
                FieldValue {
                    actual: anchor.derived(field),
                    adjusted,
                },
            );
        }

        let gap = costs.get(DerivedField::AbsGapActual);
        let alert = AlertLevel::classify(gap, self.alert_threshold);

        debug!(
            target_crude = request.target_crude,
            risk_premium = request.risk_premium,
            crude_delta,
            risk_equiv_delta,
            cracker_margin,
            bd_tight_premium,
            abs_gap = gap,
            alert = %alert,
            "Projection"
        );

        Snapshot {
            fields,
            anchor_date: anchor.date(),
            crude_realtime: request.target_crude,
            crude_anchor,
            crude_delta,
            risk_premium: request.risk_premium,
            risk_equiv_delta,
            total_delta,
            cracker_margin,
            bd_tight_premium,
            alert,
        }
    }

    /// Shift every raw series by `delta` times its slope. Crude is set to the
    /// target and the ethylene override applied.
    fn shift_raw(
        &self,
        anchor: &DerivedRow,
        table: &SensitivityTable,
        request: &ProjectionRequest,
        delta: f64,
    ) -> BTreeMap<Commodity, f64> {
        let mut raw: BTreeMap<Commodity, f64> = Commodity::ALL
            .into_iter()
            .map(|c| {
                let price = if c.is_crude() {
                    request.target_crude
                } else {
                    anchor.price(c) + delta * table.slope(SeriesKey::Commodity(c))
                };
                (c, price)
            })
            .collect();
        if let Some(ethylene) = request.ethylene_override {
            raw.insert(Commodity::Ethylene, ethylene);
        }
        raw
    }

    fn simulate_cracker(&self, raw: &BTreeMap<Commodity, f64>) -> f64 {
        self.formulas.cracker.margin(
            lookup(raw, Commodity::Ethylene),
            lookup(raw, Commodity::Propylene),
            lookup(raw, Commodity::Butadiene),
            lookup(raw, Commodity::Benzene),
            lookup(raw, Commodity::Naphtha),
        )
    }
}

#[inline]
fn lookup(raw: &BTreeMap<Commodity, f64>, commodity: Commodity) -> f64 {
    raw.get(&commodity).copied().unwrap_or(f64::NAN)
}
