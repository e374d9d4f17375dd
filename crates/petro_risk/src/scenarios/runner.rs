//! Applies the cost projector across a scenario ladder.

use petro_models::DerivedRow;
use tracing::info;

use super::ladder::{ScenarioLadder, ScenarioSpec};
use crate::projector::{AlertLevel, CostProjector, ProjectionRequest, Snapshot};
use crate::sensitivity::SensitivityTable;

/// A scenario and its projection.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioOutcome {
    /// Scenario that was run
    pub spec: ScenarioSpec,
    /// Projection at the scenario's crude price and premium
    pub snapshot: Snapshot,
}

impl ScenarioOutcome {
    /// Adjusted actual ABS gap.
    pub fn abs_gap(&self) -> f64 {
        self.snapshot.abs_gap()
    }

    /// Adjusted theoretical ABS gap.
    pub fn abs_gap_theoretical(&self) -> f64 {
        self.snapshot.abs_gap_theoretical()
    }

    /// Alert level of the ABS gap.
    pub fn alert(&self) -> AlertLevel {
        self.snapshot.alert()
    }
}

/// Runs a projector over every rung of a ladder.
#[derive(Clone, Debug, Default)]
pub struct ScenarioRunner {
    projector: CostProjector,
}

impl ScenarioRunner {
    /// Create a runner.
    pub fn new(projector: CostProjector) -> Self {
        Self { projector }
    }

    /// Projector in use.
    pub fn projector(&self) -> &CostProjector {
        &self.projector
    }

    /// Project every scenario, in ladder order.
    pub fn run(
        &self,
        anchor: &DerivedRow,
        table: &SensitivityTable,
        ladder: &ScenarioLadder,
    ) -> Vec<ScenarioOutcome> {
        let outcomes: Vec<_> = ladder
            .specs()
            .iter()
            .map(|spec| {
                let request = ProjectionRequest::new(spec.crude_price, spec.risk_premium);
                ScenarioOutcome {
                    spec: spec.clone(),
                    snapshot: self.projector.project(anchor, table, &request),
                }
            })
            .collect();

        let alerts = outcomes
            .iter()
            .filter(|o| matches!(o.alert(), AlertLevel::Alert | AlertLevel::NegativeMargin))
            .count();
        info!(scenarios = outcomes.len(), alerts, "Scenario ladder projected");
        outcomes
    }

    /// Outcome with the smallest ABS gap, ignoring unknown gaps.
    pub fn worst_case(outcomes: &[ScenarioOutcome]) -> Option<&ScenarioOutcome> {
        outcomes
            .iter()
            .filter(|o| !o.abs_gap().is_nan())
            .min_by(|a, b| {
                a.abs_gap()
                    .partial_cmp(&b.abs_gap())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
