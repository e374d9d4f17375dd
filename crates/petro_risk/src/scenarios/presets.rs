//! Canonical crude / risk-premium stress levels.

/// Stress levels of the canonical ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScenarioPreset {
    /// Crude at the sheet anchor, no premium
    Base,
    /// Mild supply disruption
    Mild,
    /// Moderate supply disruption
    Moderate,
    /// Severe supply disruption
    Severe,
    /// Crisis
    Crisis,
}

impl ScenarioPreset {
    /// All presets in ladder order.
    pub const ALL: [ScenarioPreset; 5] = [
        Self::Base,
        Self::Mild,
        Self::Moderate,
        Self::Severe,
        Self::Crisis,
    ];

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Crisis => "Crisis",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Base => "WTI $59.44, no risk premium",
            Self::Mild => "WTI $70, risk premium +$50/t",
            Self::Moderate => "WTI $80, risk premium +$100/t",
            Self::Severe => "WTI $90, risk premium +$150/t",
            Self::Crisis => "WTI $100, risk premium +$200/t",
        }
    }

    /// Crude price ($/bbl).
    pub fn crude_price(&self) -> f64 {
        match self {
            Self::Base => 59.44,
            Self::Mild => 70.0,
            Self::Moderate => 80.0,
            Self::Severe => 90.0,
            Self::Crisis => 100.0,
        }
    }

    /// Flat risk premium ($/t).
    pub fn risk_premium(&self) -> f64 {
        match self {
            Self::Base => 0.0,
            Self::Mild => 50.0,
            Self::Moderate => 100.0,
            Self::Severe => 150.0,
            Self::Crisis => 200.0,
        }
    }
}
