//! Ordered scenario specifications.

use std::collections::HashSet;

use super::presets::ScenarioPreset;
use crate::error::RiskError;

/// One rung of the ladder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioSpec {
    /// Label used in reports and CSV column names
    pub label: String,
    /// Crude price ($/bbl)
    pub crude_price: f64,
    /// Flat risk premium ($/t)
    pub risk_premium: f64,
}

impl ScenarioSpec {
    /// Create a scenario.
    pub fn new(label: impl Into<String>, crude_price: f64, risk_premium: f64) -> Self {
        Self {
            label: label.into(),
            crude_price,
            risk_premium,
        }
    }

    fn validate(&self) -> Result<(), RiskError> {
        let reason = if self.label.trim().is_empty() {
            Some("label is empty".to_string())
        } else if !self.crude_price.is_finite() || self.crude_price <= 0.0 {
            Some(format!("crude price must be positive, got {}", self.crude_price))
        } else if !self.risk_premium.is_finite() {
            Some(format!("risk premium must be finite, got {}", self.risk_premium))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(RiskError::InvalidScenario {
                label: self.label.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl From<ScenarioPreset> for ScenarioSpec {
    fn from(preset: ScenarioPreset) -> Self {
        Self::new(preset.name(), preset.crude_price(), preset.risk_premium())
    }
}

/// Non-empty, uniquely labelled list of scenarios in execution order.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioLadder {
    specs: Vec<ScenarioSpec>,
}

impl ScenarioLadder {
    /// Build a ladder.
    ///
    /// # Errors
    ///
    /// * `RiskError::EmptyLadder` - no scenarios
    /// * `RiskError::DuplicateScenario` - two scenarios share a label
    /// * `RiskError::InvalidScenario` - empty label, non-positive crude or
    ///   non-finite premium
    pub fn new(specs: Vec<ScenarioSpec>) -> Result<Self, RiskError> {
        if specs.is_empty() {
            return Err(RiskError::EmptyLadder);
        }
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.label.as_str()) {
                return Err(RiskError::DuplicateScenario(spec.label.clone()));
            }
        }
        Ok(Self { specs })
    }

    /// Base, Mild, Moderate, Severe, Crisis.
    pub fn canonical() -> Self {
        Self {
            specs: ScenarioPreset::ALL.into_iter().map(ScenarioSpec::from).collect(),
        }
    }

    /// Scenarios in order.
    pub fn specs(&self) -> &[ScenarioSpec] {
        &self.specs
    }

    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Always false for a constructed ladder.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for ScenarioLadder {
    fn default() -> Self {
        Self::canonical()
    }
}
