//! Per-series sensitivity of prices and derived quantities to crude.
//!
//! Each tracked series is regressed on the crude column of the full history.
//! A fit is only trusted when it has enough observations and explains enough
//! of the variance; otherwise the series falls back to a hand-tuned default
//! slope. Every series falls back independently.

use std::collections::BTreeMap;
use std::fmt;

use petro_core::math::LinearFit;
use petro_core::types::{Commodity, RegressionError};
use petro_models::{DerivedField, DerivedRow, SeriesKey};
use tracing::{debug, info};

use crate::error::RiskError;

/// Default slope ($ per $1/bbl of crude) used when a fit is rejected.
///
/// Raw priors are hand-tuned; derived priors are the canonical blends of the
/// raw priors. Crude moves one for one with itself.
pub fn default_slope(key: SeriesKey) -> f64 {
    match key {
        SeriesKey::Commodity(c) => match c {
            Commodity::Wti => 1.0,
            Commodity::Naphtha => 6.52,
            Commodity::Benzene => 9.65,
            Commodity::Ethylene => 4.20,
            Commodity::Propylene => 5.80,
            Commodity::Styrene => 9.80,
            Commodity::StyreneChina => 9.50,
            Commodity::Acrylonitrile => 3.50,
            Commodity::Butadiene => 15.20,
            Commodity::AbsMarket => 7.58,
        },
        SeriesKey::Derived(d) => match d {
            DerivedField::SmCostActual => 7.84,
            DerivedField::SmCostTheoretical => 8.98,
            DerivedField::SmMarginActual => 1.96,
            DerivedField::SmMarginTheoretical => 0.82,
            DerivedField::SmSupplySignal => -1.14,
            DerivedField::AbsCostActual => 9.04,
            DerivedField::AbsCostTheoretical => 8.54,
            DerivedField::AbsGapActual => -1.46,
            DerivedField::AbsGapTheoretical => -0.96,
            DerivedField::AbsSupplySignal => 0.49,
            DerivedField::CrackerMargin => -3.13,
        },
    }
}

/// Where a sensitivity slope came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensitivitySource {
    /// Fitted slope accepted
    Fitted,
    /// Fit below the R² threshold; default slope used
    WeakFit,
    /// Too few paired observations; default slope used
    InsufficientData,
    /// Zero variance in crude or target; default slope used
    Degenerate,
}

impl SensitivitySource {
    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fitted => "fitted",
            Self::WeakFit => "weak-fit",
            Self::InsufficientData => "insufficient-data",
            Self::Degenerate => "degenerate",
        }
    }

    /// Whether the default slope is in use.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Fitted)
    }
}

impl fmt::Display for SensitivitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Slope of one series against crude with its fit diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensitivity {
    /// $ change in the series per $1/bbl change in crude
    pub slope: f64,
    /// Coefficient of determination, when a regression was run
    pub r_squared: Option<f64>,
    /// Number of paired observations
    pub samples: usize,
    /// Provenance of `slope`
    pub source: SensitivitySource,
}

impl Sensitivity {
    /// Default-slope sensitivity for `key`.
    pub fn fallback(
        key: SeriesKey,
        samples: usize,
        r_squared: Option<f64>,
        source: SensitivitySource,
    ) -> Self {
        Self {
            slope: default_slope(key),
            r_squared,
            samples,
            source,
        }
    }
}

/// Acceptance rules for fitted slopes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Minimum paired observations before fitting
    pub min_samples: usize,
    /// Minimum R² for a fitted slope to be used
    pub r2_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_samples: 6,
            r2_threshold: 0.5,
        }
    }
}

impl EstimatorConfig {
    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidParameter` when `min_samples < 2` or
    /// `r2_threshold` lies outside [0, 1].
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.min_samples < LinearFit::<f64>::MIN_SAMPLES {
            return Err(RiskError::InvalidParameter {
                name: "min_samples",
                reason: format!("must be at least {}", LinearFit::<f64>::MIN_SAMPLES),
            });
        }
        if !(0.0..=1.0).contains(&self.r2_threshold) {
            return Err(RiskError::InvalidParameter {
                name: "r2_threshold",
                reason: "must lie in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

/// Sensitivities for every tracked series. Rebuilt each run, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct SensitivityTable {
    entries: BTreeMap<SeriesKey, Sensitivity>,
}

impl SensitivityTable {
    /// Table holding the default slope for every tracked series.
    pub fn defaults() -> Self {
        let entries = SeriesKey::tracked()
            .into_iter()
            .map(|k| {
                (
                    k,
                    Sensitivity::fallback(k, 0, None, SensitivitySource::InsufficientData),
                )
            })
            .collect();
        Self { entries }
    }

    /// Replace one entry.
    pub fn insert(&mut self, key: SeriesKey, sensitivity: Sensitivity) {
        self.entries.insert(key, sensitivity);
    }

    /// Entry for `key`, if tracked.
    pub fn get(&self, key: SeriesKey) -> Option<&Sensitivity> {
        self.entries.get(&key)
    }

    /// Slope for `key`, falling back to the default slope for untracked keys.
    #[inline]
    pub fn slope(&self, key: SeriesKey) -> f64 {
        self.entries
            .get(&key)
            .map(|s| s.slope)
            .unwrap_or_else(|| default_slope(key))
    }

    /// Slope used to convert a flat risk premium into a crude-equivalent
    /// move: the naphtha sensitivity.
    pub fn equivalence_basis(&self) -> f64 {
        self.slope(SeriesKey::Commodity(Commodity::Naphtha))
    }

    /// Entries in column order.
    pub fn iter(&self) -> impl Iterator<Item = (SeriesKey, &Sensitivity)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries using a fitted slope.
    pub fn fitted_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| s.source == SensitivitySource::Fitted)
            .count()
    }
}

impl Default for SensitivityTable {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Estimates crude sensitivities from a derived history.
#[derive(Clone, Debug, Default)]
pub struct SensitivityEstimator {
    config: EstimatorConfig,
}

impl SensitivityEstimator {
    /// Create an estimator.
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Acceptance rules in use.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate every tracked series.
    pub fn estimate(&self, rows: &[DerivedRow]) -> SensitivityTable {
        let entries: BTreeMap<_, _> = SeriesKey::tracked()
            .into_iter()
            .map(|k| (k, self.estimate_series(rows, k)))
            .collect();
        let table = SensitivityTable { entries };
        info!(
            rows = rows.len(),
            fitted = table.fitted_count(),
            fallback = table.len() - table.fitted_count(),
            basis = table.equivalence_basis(),
            "Sensitivities estimated"
        );
        table
    }

    /// Estimate one series.
    pub fn estimate_series(&self, rows: &[DerivedRow], key: SeriesKey) -> Sensitivity {
        let (xs, ys): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .map(|r| (r.price(Commodity::Wti), r.value(key)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .unzip();
        let samples = xs.len();

        let sensitivity = if samples < self.config.min_samples {
            Sensitivity::fallback(key, samples, None, SensitivitySource::InsufficientData)
        } else {
            match LinearFit::fit(&xs, &ys) {
                Ok(fit) if fit.r_squared >= self.config.r2_threshold => Sensitivity {
                    slope: fit.slope,
                    r_squared: Some(fit.r_squared),
                    samples,
                    source: SensitivitySource::Fitted,
                },
                Ok(fit) => Sensitivity::fallback(
                    key,
                    samples,
                    Some(fit.r_squared),
                    SensitivitySource::WeakFit,
                ),
                Err(RegressionError::InsufficientData { .. }) => Sensitivity::fallback(
                    key,
                    samples,
                    None,
                    SensitivitySource::InsufficientData,
                ),
                Err(_) => {
                    Sensitivity::fallback(key, samples, None, SensitivitySource::Degenerate)
                }
            }
        };

        debug!(
            series = key.code(),
            slope = sensitivity.slope,
            r_squared = ?sensitivity.r_squared,
            samples,
            source = %sensitivity.source,
            "Sensitivity"
        );
        sensitivity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};
    use petro_core::types::CommodityRow;
    use petro_models::{DerivedSeriesBuilder, FormulaSet};

    fn rows_with(crude: &[f64], f: impl Fn(usize, f64) -> Option<f64>) -> Vec<DerivedRow> {
        let start = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
        let rows: Vec<_> = crude
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let mut row = CommodityRow::new(start + Duration::weeks(i as i64))
                    .with_price(Commodity::Wti, x);
                row.set_price(Commodity::Benzene, f(i, x));
                row
            })
            .collect();
        DerivedSeriesBuilder::new(FormulaSet::canonical()).build(&rows)
    }

    const CRUDE: [f64; 8] = [58.55, 60.08, 57.44, 56.66, 56.74, 57.32, 59.12, 59.44];
    const BZ: SeriesKey = SeriesKey::Commodity(Commodity::Benzene);

    #[test]
    fn test_fitted_slope_accepted() {
        let rows = rows_with(&CRUDE, |_, x| Some(9.0 * x + 150.0));
        let s = SensitivityEstimator::default().estimate_series(&rows, BZ);
        assert_eq!(s.source, SensitivitySource::Fitted);
        assert_relative_eq!(s.slope, 9.0, epsilon = 1e-9);
        assert_relative_eq!(s.r_squared.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(s.samples, 8);
    }

    #[test]
    fn test_weak_fit_uses_default() {
        // Alternating response, essentially uncorrelated with crude
        let rows = rows_with(&CRUDE, |i, _| Some(if i % 2 == 0 { 700.0 } else { 640.0 }));
        let s = SensitivityEstimator::default().estimate_series(&rows, BZ);
        assert_eq!(s.source, SensitivitySource::WeakFit);
        assert_eq!(s.slope, 9.65);
        assert!(s.r_squared.unwrap() < 0.5);
    }

    #[test]
    fn test_insufficient_data() {
        let rows = rows_with(&CRUDE, |i, x| (i < 5).then_some(9.0 * x));
        let s = SensitivityEstimator::default().estimate_series(&rows, BZ);
        assert_eq!(s.source, SensitivitySource::InsufficientData);
        assert_eq!(s.samples, 5);
        assert_eq!(s.r_squared, None);
        assert_eq!(s.slope, 9.65);
    }

    #[test]
    fn test_degenerate_constant_target() {
        let rows = rows_with(&CRUDE, |_, _| Some(1170.0));
        let s = SensitivityEstimator::default().estimate_series(&rows, BZ);
        assert_eq!(s.source, SensitivitySource::Degenerate);
        assert_eq!(s.slope, 9.65);
    }

    #[test]
    fn test_degenerate_constant_crude() {
        let rows = rows_with(&[59.44; 8], |i, _| Some(600.0 + i as f64));
        let s = SensitivityEstimator::default().estimate_series(&rows, BZ);
        assert_eq!(s.source, SensitivitySource::Degenerate);
    }

    #[test]
    fn test_estimate_covers_tracked_series() {
        let rows = rows_with(&CRUDE, |_, x| Some(9.0 * x + 150.0));
        let table = SensitivityEstimator::default().estimate(&rows);
        assert_eq!(table.len(), SeriesKey::tracked().len());
        assert_eq!(table.fitted_count(), 1);
        // Naphtha absent from every row
        assert_eq!(table.equivalence_basis(), 6.52);
        let nap = table.get(SeriesKey::Commodity(Commodity::Naphtha)).unwrap();
        assert_eq!(nap.source, SensitivitySource::InsufficientData);
        assert_eq!(nap.samples, 0);
    }

    #[test]
    fn test_defaults_table() {
        let table = SensitivityTable::defaults();
        assert_eq!(table.slope(SeriesKey::Commodity(Commodity::Butadiene)), 15.20);
        assert_eq!(table.slope(SeriesKey::Derived(DerivedField::CrackerMargin)), -3.13);
        assert_eq!(table.slope(SeriesKey::Commodity(Commodity::Wti)), 1.0);
        assert!(table.get(SeriesKey::Commodity(Commodity::Wti)).is_none());
    }

    #[test]
    fn test_derived_defaults_match_canonical_blend() {
        let s = |c| default_slope(SeriesKey::Commodity(c));
        let sm_cost = s(Commodity::Benzene) * 0.67
            + s(Commodity::Ethylene) * 0.25
            + s(Commodity::Naphtha) * 0.05;
        assert_relative_eq!(
            default_slope(SeriesKey::Derived(DerivedField::SmCostActual)),
            sm_cost,
            epsilon = 0.01
        );
        let abs_cost = s(Commodity::Styrene) * 0.60
            + s(Commodity::Acrylonitrile) * 0.25
            + s(Commodity::Butadiene) * 0.15;
        assert_relative_eq!(
            default_slope(SeriesKey::Derived(DerivedField::AbsCostActual)),
            abs_cost,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_config_validate() {
        assert!(EstimatorConfig::default().validate().is_ok());
        let bad = EstimatorConfig {
            min_samples: 1,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(RiskError::InvalidParameter { name: "min_samples", .. })
        ));
        let bad = EstimatorConfig {
            r2_threshold: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(SensitivitySource::WeakFit.to_string(), "weak-fit");
        assert!(SensitivitySource::Degenerate.is_fallback());
        assert!(!SensitivitySource::Fitted.is_fallback());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            #[test]
            fn test_threshold_decides_source(
                noise in prop::collection::vec(-200.0_f64..200.0, 8),
                slope in -15.0_f64..15.0,
            ) {
                let rows = rows_with(&CRUDE, |i, x| Some(slope * x + 600.0 + noise[i]));
                let s = SensitivityEstimator::default().estimate_series(&rows, BZ);
                match s.source {
                    SensitivitySource::Fitted => {
                        let ys: Vec<f64> = CRUDE
                            .iter()
                            .enumerate()
                            .map(|(i, x)| slope * x + 600.0 + noise[i])
                            .collect();
                        let fit = LinearFit::fit(&CRUDE, &ys).unwrap();
                        prop_assert!(fit.r_squared >= 0.5);
                        prop_assert!((s.slope - fit.slope).abs() < 1e-9);
                    }
                    SensitivitySource::WeakFit => {
                        prop_assert!(s.r_squared.unwrap() < 0.5);
                        prop_assert_eq!(s.slope, 9.65);
                    }
                    _ => prop_assert_eq!(s.slope, 9.65),
                }
            }
        }
    }
}
