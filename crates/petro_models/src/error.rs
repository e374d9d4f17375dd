//! Error types for formula selection.

use thiserror::Error;

/// Errors raised while selecting or validating blend formulas.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Preset name not recognised
    #[error("Unknown formula preset '{0}' (expected one of: canonical, legacy-v1)")]
    UnknownPreset(String),

    /// Blend weight or constant is not finite
    #[error("Non-finite blend parameter: {0}")]
    NonFiniteParameter(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_display() {
        let err = ModelError::UnknownPreset("v3".to_string());
        assert_eq!(
            format!("{}", err),
            "Unknown formula preset 'v3' (expected one of: canonical, legacy-v1)"
        );
    }

    #[test]
    fn test_non_finite_display() {
        let err = ModelError::NonFiniteParameter("sm_actual.benzene");
        assert_eq!(format!("{}", err), "Non-finite blend parameter: sm_actual.benzene");
    }
}
