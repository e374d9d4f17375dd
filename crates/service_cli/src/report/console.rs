//! Plain-text run summary for stdout.

use std::fmt::Write as _;

use petro_core::types::Commodity;
use petro_models::{DerivedField, SeriesKey};
use petro_risk::scenarios::ScenarioRunner;

use crate::pipeline::RunOutput;

use super::{signed_usd, usd};

const RULE: &str = "────────────────────────────────────────";

/// Render the snapshot block and one line per scenario.
pub fn render(output: &RunOutput) -> String {
    let snap = &output.current;
    let mut out = String::new();

    let raw = |c: Commodity| snap.adjusted(SeriesKey::Commodity(c));
    let derived = |d: DerivedField| snap.adjusted(SeriesKey::Derived(d));
    let sm_margin = derived(DerivedField::SmMarginActual);
    let margin_flag = if sm_margin < 0.0 {
        "⚠ negative"
    } else if sm_margin.is_nan() {
        "?"
    } else {
        "✓"
    };

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "  WTI          : ${:.2} ({})",
        snap.crude_realtime(),
        output.quote.provenance
    );
    let _ = writeln!(
        out,
        "  Anchor       : {} (WTI ${:.2}, delta {:+.2})",
        snap.anchor_date(),
        snap.crude_anchor(),
        snap.crude_delta()
    );
    let _ = writeln!(out, "  Preset       : {}", output.preset);
    if snap.risk_premium() != 0.0 {
        let _ = writeln!(
            out,
            "  Risk premium : {}/t (crude-equivalent {:+.2})",
            signed_usd(snap.risk_premium()),
            snap.risk_equiv_delta()
        );
    }
    let _ = writeln!(out, "  BZ           : {}/t", usd(raw(Commodity::Benzene)));
    let _ = writeln!(out, "  ET           : {}/t", usd(raw(Commodity::Ethylene)));
    let _ = writeln!(out, "  SM Market    : {}/t", usd(raw(Commodity::Styrene)));
    let _ = writeln!(
        out,
        "  SM Cost      : {}/t",
        usd(derived(DerivedField::SmCostActual))
    );
    let _ = writeln!(out, "  SM Margin    : {}/t  {}", signed_usd(sm_margin), margin_flag);
    let _ = writeln!(out, "  ABS Market   : {}/t", usd(raw(Commodity::AbsMarket)));
    let _ = writeln!(
        out,
        "  ABS Cost     : {}/t",
        usd(derived(DerivedField::AbsCostActual))
    );
    let _ = writeln!(
        out,
        "  ABS Gap      : {}/t  {}",
        signed_usd(snap.abs_gap()),
        snap.alert().flag()
    );
    if snap.bd_tight_premium() > 0.0 {
        let _ = writeln!(out, "  BD premium   : {}/t", signed_usd(snap.bd_tight_premium()));
    }
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(out, "[ Risk scenarios ]");
    for outcome in &output.scenarios {
        let _ = writeln!(
            out,
            "  {:20} | WTI ${:5.0} | Risk +${:3.0} | ABS Gap {}/t {}",
            outcome.spec.label,
            outcome.spec.crude_price,
            outcome.spec.risk_premium,
            signed_usd(outcome.abs_gap()),
            outcome.alert().flag()
        );
    }
    if let Some(worst) = ScenarioRunner::worst_case(&output.scenarios) {
        let _ = writeln!(
            out,
            "  Worst case: {} ({}/t)",
            worst.spec.label,
            signed_usd(worst.abs_gap())
        );
    }

    out
}
