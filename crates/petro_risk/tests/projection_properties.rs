//! End-to-end properties of the estimate / project / ladder pipeline.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use petro_core::types::{Commodity, CommodityRow, PriceHistory};
use petro_models::{DerivedField, DerivedRow, DerivedSeriesBuilder, FormulaSet, SeriesKey};
use petro_risk::projector::{AlertLevel, CostProjector, ProjectionRequest, TightPremiumConfig};
use petro_risk::scenarios::{ScenarioLadder, ScenarioRunner};
use petro_risk::sensitivity::{SensitivityEstimator, SensitivitySource, SensitivityTable};

/// Eight weekly rows shaped like the published sheet, anchor 2026-01-16.
fn sheet_history() -> PriceHistory {
    let crude = [58.55, 60.08, 57.44, 56.66, 56.74, 57.32, 59.12, 59.44];
    let start = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
    let rows = crude
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let wiggle = if i % 2 == 0 { 4.0 } else { -4.0 };
            CommodityRow::new(start + Duration::weeks(i as i64))
                .with_price(Commodity::Wti, w)
                .with_price(Commodity::Naphtha, 180.0 + 6.5 * w + wiggle)
                .with_price(Commodity::Benzene, 130.0 + 9.6 * w)
                .with_price(Commodity::Ethylene, 470.0 + 4.2 * w - wiggle)
                .with_price(Commodity::Propylene, 390.0 + 5.8 * w)
                .with_price(Commodity::Styrene, 330.0 + 9.8 * w + wiggle)
                .with_price(Commodity::StyreneChina, 360.0 + 9.5 * w)
                .with_price(Commodity::Acrylonitrile, 950.0 + 3.5 * w + wiggle)
                .with_price(Commodity::Butadiene, 120.0 + 15.2 * w - wiggle)
                .with_price(Commodity::AbsMarket, 740.0 + 7.6 * w)
        })
        .collect();
    PriceHistory::new(rows).unwrap()
}

fn pipeline() -> (DerivedRow, SensitivityTable) {
    let history = sheet_history();
    let derived = DerivedSeriesBuilder::new(FormulaSet::canonical()).build_history(&history);
    let table = SensitivityEstimator::default().estimate(&derived);
    let anchor = derived.last().cloned().unwrap();
    (anchor, table)
}

#[test]
fn test_fitted_sensitivities_on_clean_history() {
    let (_, table) = pipeline();
    let bz = table.get(SeriesKey::Commodity(Commodity::Benzene)).unwrap();
    assert_eq!(bz.source, SensitivitySource::Fitted);
    assert_relative_eq!(bz.slope, 9.6, epsilon = 1e-9);
    assert_eq!(bz.samples, 8);
    assert!(table.equivalence_basis() > 5.0 && table.equivalence_basis() < 8.0);
}

#[test]
fn test_anchor_target_no_premium_is_noop() {
    let (anchor, table) = pipeline();
    let request = ProjectionRequest::new(59.44, 0.0);
    let snap = CostProjector::default().project(&anchor, &table, &request);
    for (key, value) in snap.fields() {
        assert_eq!(value.adjusted, value.actual, "{} moved", key);
    }
}

#[test]
fn test_risk_equivalent_with_default_basis() {
    let (anchor, _) = pipeline();
    let table = SensitivityTable::defaults();
    let request = ProjectionRequest::new(59.44, 100.0);
    let snap = CostProjector::default().project(&anchor, &table, &request);

    assert_relative_eq!(snap.risk_equiv_delta(), 15.337, epsilon = 1e-3);
    for c in [Commodity::Naphtha, Commodity::Benzene, Commodity::Acrylonitrile] {
        let key = SeriesKey::Commodity(c);
        assert_relative_eq!(
            snap.adjusted(key),
            snap.actual(key) + snap.risk_equiv_delta() * table.slope(key),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_tight_premium_fifteen() {
    let (anchor, table) = pipeline();
    let et = anchor.price(Commodity::Ethylene);
    let request = ProjectionRequest::new(anchor.price(Commodity::Wti), 0.0)
        .with_ethylene_override(et - 100.0);
    let projector = CostProjector::default().with_tight_premium(TightPremiumConfig {
        scale: 0.5,
        cap: 150.0,
    });
    let snap = projector.project(&anchor, &table, &request);
    assert_relative_eq!(snap.bd_tight_premium(), 15.0, epsilon = 1e-9);
    assert_relative_eq!(
        snap.adjusted(SeriesKey::Commodity(Commodity::Butadiene)),
        anchor.price(Commodity::Butadiene) + 15.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_gap_identity_after_projection() {
    let (anchor, table) = pipeline();
    let request = ProjectionRequest::new(85.0, 120.0);
    let snap = CostProjector::default().project(&anchor, &table, &request);
    let market = snap.adjusted(SeriesKey::Commodity(Commodity::AbsMarket));
    assert_relative_eq!(
        snap.abs_gap(),
        market - snap.adjusted(SeriesKey::Derived(DerivedField::AbsCostActual)),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        snap.abs_gap_theoretical(),
        market - snap.adjusted(SeriesKey::Derived(DerivedField::AbsCostTheoretical)),
        epsilon = 1e-9
    );
}

#[test]
fn test_ladder_order_and_deterioration() {
    let (anchor, table) = pipeline();
    let outcomes = ScenarioRunner::default().run(&anchor, &table, &ScenarioLadder::canonical());

    let labels: Vec<_> = outcomes.iter().map(|o| o.spec.label.as_str()).collect();
    assert_eq!(labels, ["Base", "Mild", "Moderate", "Severe", "Crisis"]);
    assert_eq!(outcomes[0].snapshot.crude_realtime(), 59.44);
    assert_eq!(outcomes[4].snapshot.crude_realtime(), 100.0);

    // Costs rise faster than the ABS market under stress
    for pair in outcomes.windows(2) {
        assert!(pair[1].abs_gap() < pair[0].abs_gap());
    }
    let worst = ScenarioRunner::worst_case(&outcomes).unwrap();
    assert_eq!(worst.spec.label, "Crisis");
    assert_ne!(worst.alert(), AlertLevel::Unknown);
}

#[test]
fn test_legacy_preset_projects() {
    let history = sheet_history();
    let formulas = FormulaSet::legacy_v1();
    let derived = DerivedSeriesBuilder::new(formulas).build_history(&history);
    let table = SensitivityEstimator::default().estimate(&derived);
    let anchor = derived.last().cloned().unwrap();

    let request = ProjectionRequest::new(70.0, 50.0);
    let canonical = CostProjector::default().project(&anchor, &table, &request);
    let legacy = CostProjector::new(formulas).project(&anchor, &table, &request);
    let key = SeriesKey::Derived(DerivedField::SmCostActual);
    assert!(legacy.adjusted(key) < canonical.adjusted(key));
}
