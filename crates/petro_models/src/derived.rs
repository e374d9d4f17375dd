//! Derived quantities computed row-wise from commodity prices.
//!
//! Every [`DerivedField`] is a pure function of the same row's prices and the
//! ratios of a [`FormulaSet`]. Missing inputs give NaN for the dependent
//! fields of that row only; the rest of the row and the table are unaffected.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use petro_core::types::{Commodity, CommodityRow, PriceHistory};
use tracing::debug;

use crate::blend::FormulaSet;
use crate::series::SeriesKey;

/// Quantities derived from raw commodity prices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DerivedField {
    /// SM production cost, actual blend
    SmCostActual,
    /// SM production cost, theoretical blend
    SmCostTheoretical,
    /// SM market minus actual cost
    SmMarginActual,
    /// SM market minus theoretical cost
    SmMarginTheoretical,
    /// SM actual minus theoretical cost (positive means tight supply)
    SmSupplySignal,
    /// ABS production cost on SM market price
    AbsCostActual,
    /// ABS production cost on SM theoretical cost
    AbsCostTheoretical,
    /// ABS market minus actual cost
    AbsGapActual,
    /// ABS market minus theoretical cost
    AbsGapTheoretical,
    /// ABS actual minus theoretical cost
    AbsSupplySignal,
    /// Naphtha cracker margin
    CrackerMargin,
}

impl DerivedField {
    /// All derived fields in column order.
    pub const ALL: [DerivedField; 11] = [
        DerivedField::SmCostActual,
        DerivedField::SmCostTheoretical,
        DerivedField::SmMarginActual,
        DerivedField::SmMarginTheoretical,
        DerivedField::SmSupplySignal,
        DerivedField::AbsCostActual,
        DerivedField::AbsCostTheoretical,
        DerivedField::AbsGapActual,
        DerivedField::AbsGapTheoretical,
        DerivedField::AbsSupplySignal,
        DerivedField::CrackerMargin,
    ];

    /// Short code used in CSV column names.
    pub fn code(&self) -> &'static str {
        match self {
            DerivedField::SmCostActual => "SM_Cost",
            DerivedField::SmCostTheoretical => "SM_Cost_Theo",
            DerivedField::SmMarginActual => "SM_Margin",
            DerivedField::SmMarginTheoretical => "SM_Margin_Theo",
            DerivedField::SmSupplySignal => "SM_Supply",
            DerivedField::AbsCostActual => "ABS_Cost",
            DerivedField::AbsCostTheoretical => "ABS_Cost_Theo",
            DerivedField::AbsGapActual => "ABS_Gap",
            DerivedField::AbsGapTheoretical => "ABS_Gap_Theo",
            DerivedField::AbsSupplySignal => "ABS_Supply",
            DerivedField::CrackerMargin => "Cracker",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            DerivedField::SmCostActual => "SM cost",
            DerivedField::SmCostTheoretical => "SM cost (theoretical)",
            DerivedField::SmMarginActual => "SM margin",
            DerivedField::SmMarginTheoretical => "SM margin (theoretical)",
            DerivedField::SmSupplySignal => "SM supply signal",
            DerivedField::AbsCostActual => "ABS cost",
            DerivedField::AbsCostTheoretical => "ABS cost (theoretical)",
            DerivedField::AbsGapActual => "ABS gap",
            DerivedField::AbsGapTheoretical => "ABS gap (theoretical)",
            DerivedField::AbsSupplySignal => "ABS supply signal",
            DerivedField::CrackerMargin => "Cracker margin",
        }
    }
}

/// One value per [`DerivedField`]; NaN where an input was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedValues {
    values: BTreeMap<DerivedField, f64>,
}

impl DerivedValues {
    /// Evaluate every derived field from a price lookup.
    ///
    /// `price` returns NaN for missing observations.
    pub fn compute(formulas: &FormulaSet, price: impl Fn(Commodity) -> f64) -> Self {
        let naphtha = price(Commodity::Naphtha);
        let benzene = price(Commodity::Benzene);
        let ethylene = price(Commodity::Ethylene);
        let propylene = price(Commodity::Propylene);
        let styrene = price(Commodity::Styrene);
        let acrylonitrile = price(Commodity::Acrylonitrile);
        let butadiene = price(Commodity::Butadiene);
        let abs_market = price(Commodity::AbsMarket);

        let sm_cost = formulas.sm_actual.cost(benzene, ethylene, naphtha);
        let sm_cost_theo = formulas.sm_theoretical.cost(benzene, ethylene, naphtha);
        let abs_cost = formulas.abs.cost(styrene, acrylonitrile, butadiene);
        let abs_cost_theo = formulas.abs.cost(sm_cost_theo, acrylonitrile, butadiene);
        let cracker = formulas
            .cracker
            .margin(ethylene, propylene, butadiene, benzene, naphtha);

        let values = BTreeMap::from([
            (DerivedField::SmCostActual, sm_cost),
            (DerivedField::SmCostTheoretical, sm_cost_theo),
            (DerivedField::SmMarginActual, styrene - sm_cost),
            (DerivedField::SmMarginTheoretical, styrene - sm_cost_theo),
            (DerivedField::SmSupplySignal, sm_cost - sm_cost_theo),
            (DerivedField::AbsCostActual, abs_cost),
            (DerivedField::AbsCostTheoretical, abs_cost_theo),
            (DerivedField::AbsGapActual, abs_market - abs_cost),
            (DerivedField::AbsGapTheoretical, abs_market - abs_cost_theo),
            (DerivedField::AbsSupplySignal, abs_cost - abs_cost_theo),
            (DerivedField::CrackerMargin, cracker),
        ]);
        Self { values }
    }

    /// Value of a field (NaN when its inputs were missing).
    #[inline]
    pub fn get(&self, field: DerivedField) -> f64 {
        self.values.get(&field).copied().unwrap_or(f64::NAN)
    }

    /// Iterate in column order.
    pub fn iter(&self) -> impl Iterator<Item = (DerivedField, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of fields that could not be computed.
    pub fn missing_count(&self) -> usize {
        self.values.values().filter(|v| v.is_nan()).count()
    }
}

/// A commodity row together with its derived quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    row: CommodityRow,
    values: DerivedValues,
}

impl DerivedRow {
    /// Derive every field of `row` with `formulas`.
    pub fn new(row: CommodityRow, formulas: &FormulaSet) -> Self {
        let values = DerivedValues::compute(formulas, |c| row.price_or_nan(c));
        Self { row, values }
    }

    /// Observation date.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.row.date
    }

    /// Underlying raw observation.
    #[inline]
    pub fn row(&self) -> &CommodityRow {
        &self.row
    }

    /// Derived values.
    #[inline]
    pub fn values(&self) -> &DerivedValues {
        &self.values
    }

    /// Raw price, NaN when missing.
    #[inline]
    pub fn price(&self, commodity: Commodity) -> f64 {
        self.row.price_or_nan(commodity)
    }

    /// Derived value, NaN when an input was missing.
    #[inline]
    pub fn derived(&self, field: DerivedField) -> f64 {
        self.values.get(field)
    }

    /// Value of any series, NaN when missing.
    pub fn value(&self, key: SeriesKey) -> f64 {
        match key {
            SeriesKey::Commodity(c) => self.price(c),
            SeriesKey::Derived(d) => self.derived(d),
        }
    }
}

/// Applies a [`FormulaSet`] row-wise to a price table.
#[derive(Debug, Clone, Default)]
pub struct DerivedSeriesBuilder {
    formulas: FormulaSet,
}

impl DerivedSeriesBuilder {
    /// Create a builder for the given formulas.
    pub fn new(formulas: FormulaSet) -> Self {
        Self { formulas }
    }

    /// Formulas in use.
    pub fn formulas(&self) -> &FormulaSet {
        &self.formulas
    }

    /// Derive a single row.
    pub fn build_row(&self, row: &CommodityRow) -> DerivedRow {
        DerivedRow::new(row.clone(), &self.formulas)
    }

    /// Derive every row, preserving order. Never fails.
    pub fn build(&self, rows: &[CommodityRow]) -> Vec<DerivedRow> {
        let derived: Vec<DerivedRow> = rows.iter().map(|r| self.build_row(r)).collect();
        let missing: usize = derived.iter().map(|d| d.values.missing_count()).sum();
        debug!(
            rows = derived.len(),
            missing_fields = missing,
            preset = %self.formulas.preset(),
            "Derived series built"
        );
        derived
    }

    /// Derive every row of a history.
    pub fn build_history(&self, history: &PriceHistory) -> Vec<DerivedRow> {
        self.build(history.rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn full_row() -> CommodityRow {
        CommodityRow::new(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
            .with_price(Commodity::Wti, 59.44)
            .with_price(Commodity::Naphtha, 560.0)
            .with_price(Commodity::Benzene, 705.33)
            .with_price(Commodity::Ethylene, 720.0)
            .with_price(Commodity::Propylene, 735.0)
            .with_price(Commodity::Styrene, 913.0)
            .with_price(Commodity::StyreneChina, 925.0)
            .with_price(Commodity::Acrylonitrile, 1150.0)
            .with_price(Commodity::Butadiene, 1020.0)
            .with_price(Commodity::AbsMarket, 1190.0)
    }

    #[test]
    fn test_canonical_values() {
        let d = DerivedRow::new(full_row(), &FormulaSet::canonical());

        let sm_cost = 705.33 * 0.67 + 720.0 * 0.25 + 560.0 * 0.05 + 150.0;
        let sm_theo = 705.33 * 0.80 + 720.0 * 0.30 + 150.0;
        let abs_cost = 913.0 * 0.60 + 1150.0 * 0.25 + 1020.0 * 0.15;
        let abs_theo = sm_theo * 0.60 + 1150.0 * 0.25 + 1020.0 * 0.15;

        assert_relative_eq!(d.derived(DerivedField::SmCostActual), sm_cost, epsilon = 1e-9);
        assert_relative_eq!(d.derived(DerivedField::SmCostTheoretical), sm_theo, epsilon = 1e-9);
        assert_relative_eq!(
            d.derived(DerivedField::SmSupplySignal),
            sm_cost - sm_theo,
            epsilon = 1e-9
        );
        assert_relative_eq!(d.derived(DerivedField::AbsCostActual), abs_cost, epsilon = 1e-9);
        assert_relative_eq!(d.derived(DerivedField::AbsCostTheoretical), abs_theo, epsilon = 1e-9);
        assert_relative_eq!(
            d.derived(DerivedField::AbsGapActual),
            1190.0 - abs_cost,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            d.derived(DerivedField::AbsSupplySignal),
            abs_cost - abs_theo,
            epsilon = 1e-9
        );
        assert_eq!(d.values().missing_count(), 0);
    }

    #[test]
    fn test_missing_input_isolated() {
        let mut row = full_row();
        row.set_price(Commodity::Acrylonitrile, None);
        let d = DerivedRow::new(row, &FormulaSet::canonical());

        // AN feeds only the ABS costs and everything built on them
        assert!(d.derived(DerivedField::AbsCostActual).is_nan());
        assert!(d.derived(DerivedField::AbsCostTheoretical).is_nan());
        assert!(d.derived(DerivedField::AbsGapActual).is_nan());
        assert!(d.derived(DerivedField::AbsSupplySignal).is_nan());
        assert!(!d.derived(DerivedField::SmCostActual).is_nan());
        assert!(!d.derived(DerivedField::SmMarginActual).is_nan());
        assert!(!d.derived(DerivedField::CrackerMargin).is_nan());
        assert_eq!(d.values().missing_count(), 5);
    }

    #[test]
    fn test_value_by_key() {
        let d = DerivedRow::new(full_row(), &FormulaSet::canonical());
        assert_eq!(d.value(SeriesKey::Commodity(Commodity::Styrene)), 913.0);
        assert_eq!(
            d.value(SeriesKey::Derived(DerivedField::CrackerMargin)),
            d.derived(DerivedField::CrackerMargin)
        );
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2026, 1, 16).unwrap());
    }

    #[test]
    fn test_builder_preserves_order() {
        let first = full_row();
        let mut second = full_row();
        second.date = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        second.set_price(Commodity::Benzene, None);

        let out = DerivedSeriesBuilder::default().build(&[first, second]);
        assert_eq!(out.len(), 2);
        assert!(!out[0].derived(DerivedField::SmCostActual).is_nan());
        assert!(out[1].derived(DerivedField::SmCostActual).is_nan());
        assert_eq!(out[1].date(), NaiveDate::from_ymd_opt(2026, 1, 9).unwrap());
    }

    #[test]
    fn test_legacy_preset_changes_sm_cost_only() {
        let canonical = DerivedRow::new(full_row(), &FormulaSet::canonical());
        let legacy = DerivedRow::new(full_row(), &FormulaSet::legacy_v1());
        assert_relative_eq!(
            legacy.derived(DerivedField::SmCostActual),
            705.33 * 0.78 + 720.0 * 0.28 + 45.0,
            epsilon = 1e-9
        );
        assert_eq!(
            legacy.derived(DerivedField::AbsCostActual),
            canonical.derived(DerivedField::AbsCostActual)
        );
        assert_eq!(
            legacy.derived(DerivedField::CrackerMargin),
            canonical.derived(DerivedField::CrackerMargin)
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn test_margin_and_gap_identities(
                nap in 300.0_f64..900.0,
                bz in 500.0_f64..1200.0,
                et in 500.0_f64..1200.0,
                sm in 700.0_f64..1400.0,
                an in 900.0_f64..1800.0,
                bd in 600.0_f64..2000.0,
                abs in 900.0_f64..2000.0,
            ) {
                let row = CommodityRow::new(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
                    .with_price(Commodity::Wti, 60.0)
                    .with_price(Commodity::Naphtha, nap)
                    .with_price(Commodity::Benzene, bz)
                    .with_price(Commodity::Ethylene, et)
                    .with_price(Commodity::Styrene, sm)
                    .with_price(Commodity::Acrylonitrile, an)
                    .with_price(Commodity::Butadiene, bd)
                    .with_price(Commodity::AbsMarket, abs);
                let d = DerivedRow::new(row, &FormulaSet::canonical());

                prop_assert_eq!(
                    d.derived(DerivedField::SmMarginActual),
                    sm - d.derived(DerivedField::SmCostActual)
                );
                prop_assert_eq!(
                    d.derived(DerivedField::SmMarginTheoretical),
                    sm - d.derived(DerivedField::SmCostTheoretical)
                );
                prop_assert_eq!(
                    d.derived(DerivedField::AbsGapActual),
                    abs - d.derived(DerivedField::AbsCostActual)
                );
                prop_assert_eq!(
                    d.derived(DerivedField::AbsGapTheoretical),
                    abs - d.derived(DerivedField::AbsCostTheoretical)
                );
            }
        }
    }
}
