//! Blend ratio presets.
//!
//! A [`FormulaSet`] bundles every fixed ratio used to turn raw commodity
//! prices into production costs: the SM blends (actual and theoretical), the
//! ABS blend and the naphtha-cracker yield slate.
//!
//! Two revisions exist and are selectable by name:
//!
//! | Preset | SM actual blend | Fixed cost |
//! |---|---|---|
//! | `canonical` | BZ×0.67 + ET×0.25 + NAP×0.05 | 150 |
//! | `legacy-v1` | BZ×0.78 + ET×0.28 | 45 |
//!
//! The theoretical SM blend (BZ×0.80 + ET×0.30) and the ABS and cracker
//! formulas are shared.

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Named formula revisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FormulaPreset {
    /// Final revision, naphtha-inclusive SM blend with $150 conversion cost
    #[default]
    Canonical,
    /// First revision, kept for reproducing older reports
    LegacyV1,
}

impl FormulaPreset {
    /// All presets.
    pub const ALL: [FormulaPreset; 2] = [FormulaPreset::Canonical, FormulaPreset::LegacyV1];

    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::LegacyV1 => "legacy-v1",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Canonical => "SM = BZ*0.67 + ET*0.25 + NAP*0.05 + 150",
            Self::LegacyV1 => "SM = BZ*0.78 + ET*0.28 + 45 (deprecated)",
        }
    }

    /// Whether the preset is only kept for backwards compatibility.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Self::LegacyV1)
    }

    /// Build the formula set for this preset.
    pub fn formulas(&self) -> FormulaSet {
        match self {
            Self::Canonical => FormulaSet::canonical(),
            Self::LegacyV1 => FormulaSet::legacy_v1(),
        }
    }
}

impl FromStr for FormulaPreset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == normalised)
            .ok_or_else(|| ModelError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for FormulaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Styrene monomer cost blend: benzene, ethylene and naphtha weights plus a
/// fixed conversion cost ($/t).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmBlend {
    /// Benzene weight
    pub benzene: f64,
    /// Ethylene weight
    pub ethylene: f64,
    /// Naphtha weight (zero drops the term entirely)
    pub naphtha: f64,
    /// Fixed conversion cost
    pub fixed_cost: f64,
}

impl SmBlend {
    /// SM production cost.
    ///
    /// A zero-weight naphtha term is skipped so a missing naphtha price does
    /// not poison blends that never use it.
    #[inline]
    pub fn cost(&self, benzene: f64, ethylene: f64, naphtha: f64) -> f64 {
        let mut cost = benzene * self.benzene + ethylene * self.ethylene + self.fixed_cost;
        if self.naphtha != 0.0 {
            cost += naphtha * self.naphtha;
        }
        cost
    }

    fn params(&self) -> [(&'static str, f64); 4] {
        [
            ("benzene", self.benzene),
            ("ethylene", self.ethylene),
            ("naphtha", self.naphtha),
            ("fixed_cost", self.fixed_cost),
        ]
    }
}

/// ABS resin cost blend: styrene, acrylonitrile and butadiene weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbsBlend {
    /// Styrene weight
    pub styrene: f64,
    /// Acrylonitrile weight
    pub acrylonitrile: f64,
    /// Butadiene weight
    pub butadiene: f64,
}

impl AbsBlend {
    /// ABS production cost from a styrene price (market or theoretical cost).
    #[inline]
    pub fn cost(&self, styrene: f64, acrylonitrile: f64, butadiene: f64) -> f64 {
        styrene * self.styrene + acrylonitrile * self.acrylonitrile + butadiene * self.butadiene
    }
}

/// Naphtha cracker economics: product yields valued at market, less one unit
/// of naphtha feed and a processing cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrackerYield {
    /// Ethylene yield
    pub ethylene: f64,
    /// Propylene yield
    pub propylene: f64,
    /// Butadiene yield
    pub butadiene: f64,
    /// Benzene yield
    pub benzene: f64,
    /// Processing cost ($/t of feed)
    pub processing_cost: f64,
}

impl CrackerYield {
    /// Cracker margin per tonne of naphtha feed.
    #[inline]
    pub fn margin(
        &self,
        ethylene: f64,
        propylene: f64,
        butadiene: f64,
        benzene: f64,
        naphtha: f64,
    ) -> f64 {
        ethylene * self.ethylene
            + propylene * self.propylene
            + butadiene * self.butadiene
            + benzene * self.benzene
            - naphtha
            - self.processing_cost
    }
}

/// Complete set of blend ratios used by the cost model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormulaSet {
    preset: FormulaPreset,
    /// Actual SM blend
    pub sm_actual: SmBlend,
    /// Theoretical ("textbook") SM blend, used as supply-signal baseline
    pub sm_theoretical: SmBlend,
    /// ABS blend
    pub abs: AbsBlend,
    /// Cracker yield slate
    pub cracker: CrackerYield,
}

const ABS_BLEND: AbsBlend = AbsBlend {
    styrene: 0.60,
    acrylonitrile: 0.25,
    butadiene: 0.15,
};

const CRACKER_YIELD: CrackerYield = CrackerYield {
    ethylene: 0.30,
    propylene: 0.15,
    butadiene: 0.045,
    benzene: 0.06,
    processing_cost: 50.0,
};

impl FormulaSet {
    /// Final revision of the blend ratios.
    pub fn canonical() -> Self {
        Self {
            preset: FormulaPreset::Canonical,
            sm_actual: SmBlend {
                benzene: 0.67,
                ethylene: 0.25,
                naphtha: 0.05,
                fixed_cost: 150.0,
            },
            sm_theoretical: SmBlend {
                benzene: 0.80,
                ethylene: 0.30,
                naphtha: 0.0,
                fixed_cost: 150.0,
            },
            abs: ABS_BLEND,
            cracker: CRACKER_YIELD,
        }
    }

    /// First revision of the blend ratios.
    ///
    /// Deprecated: only kept to reproduce reports produced before the
    /// naphtha term was added. Prefer [`FormulaSet::canonical`].
    pub fn legacy_v1() -> Self {
        Self {
            preset: FormulaPreset::LegacyV1,
            sm_actual: SmBlend {
                benzene: 0.78,
                ethylene: 0.28,
                naphtha: 0.0,
                fixed_cost: 45.0,
            },
            sm_theoretical: SmBlend {
                benzene: 0.80,
                ethylene: 0.30,
                naphtha: 0.0,
                fixed_cost: 45.0,
            },
            abs: ABS_BLEND,
            cracker: CRACKER_YIELD,
        }
    }

    /// Look up a preset by configuration name.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownPreset` for unrecognised names.
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        name.parse::<FormulaPreset>().map(|p| p.formulas())
    }

    /// Preset this set was built from.
    pub fn preset(&self) -> FormulaPreset {
        self.preset
    }

    /// Check every weight and constant is finite.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NonFiniteParameter` naming the first bad value.
    pub fn validate(&self) -> Result<(), ModelError> {
        let sm = self
            .sm_actual
            .params()
            .into_iter()
            .chain(self.sm_theoretical.params());
        let abs = [
            ("abs.styrene", self.abs.styrene),
            ("abs.acrylonitrile", self.abs.acrylonitrile),
            ("abs.butadiene", self.abs.butadiene),
        ];
        let cracker = [
            ("cracker.ethylene", self.cracker.ethylene),
            ("cracker.propylene", self.cracker.propylene),
            ("cracker.butadiene", self.cracker.butadiene),
            ("cracker.benzene", self.cracker.benzene),
            ("cracker.processing_cost", self.cracker.processing_cost),
        ];
        match sm.chain(abs).chain(cracker).find(|(_, v)| !v.is_finite()) {
            Some((name, _)) => Err(ModelError::NonFiniteParameter(name)),
            None => Ok(()),
        }
    }
}

impl Default for FormulaSet {
    fn default() -> Self {
        Self::canonical()
    }
}
