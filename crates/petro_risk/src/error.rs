//! Error types for risk configuration.

use thiserror::Error;

/// Errors raised while configuring the estimator, projector or ladder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// Estimator or projector parameter out of range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Ladder with no scenarios
    #[error("Scenario ladder is empty")]
    EmptyLadder,

    /// Two scenarios share a label
    #[error("Duplicate scenario label: {0}")]
    DuplicateScenario(String),

    /// Scenario with a non-finite or non-positive crude price or a
    /// non-finite premium
    #[error("Invalid scenario '{label}': {reason}")]
    InvalidScenario {
        /// Scenario label
        label: String,
        /// Why it was rejected
        reason: String,
    },
}
