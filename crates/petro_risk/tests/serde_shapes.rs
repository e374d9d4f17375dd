//! Integration tests for the serialised shapes of risk types.
//!
//! Only built with the `serde` feature.

#![cfg(feature = "serde")]

use approx::assert_relative_eq;
use petro_risk::projector::{AlertLevel, FieldValue, ProjectionRequest};
use petro_risk::scenarios::{ScenarioPreset, ScenarioSpec};
use petro_risk::sensitivity::{Sensitivity, SensitivitySource};

#[test]
fn test_projection_request_round_trip() {
    let request = ProjectionRequest::new(65.0, 50.0).with_ethylene_override(690.0);

    let json = serde_json::to_string(&request).unwrap();
    assert!(json.contains("\"target_crude\":65.0"));
    assert!(json.contains("\"ethylene_override\":690.0"));

    let back: ProjectionRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, request);

    let plain: ProjectionRequest =
        serde_json::from_str(r#"{"target_crude":80.0,"risk_premium":0.0,"ethylene_override":null}"#)
            .unwrap();
    assert_eq!(plain, ProjectionRequest::new(80.0, 0.0));
}

#[test]
fn test_alert_level_as_variant_name() {
    let json = serde_json::to_string(&AlertLevel::NegativeMargin).unwrap();
    assert_eq!(json, "\"NegativeMargin\"");

    for level in [
        AlertLevel::NegativeMargin,
        AlertLevel::Alert,
        AlertLevel::Normal,
        AlertLevel::Unknown,
    ] {
        let json = serde_json::to_string(&level).unwrap();
        let back: AlertLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, level);
    }
}

#[test]
fn test_sensitivity_round_trip() {
    let fitted = Sensitivity {
        slope: 8.5,
        r_squared: Some(0.75),
        samples: 8,
        source: SensitivitySource::Fitted,
    };
    let json = serde_json::to_string(&fitted).unwrap();
    assert!(json.contains("\"source\":\"Fitted\""));
    let back: Sensitivity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fitted);

    let weak = Sensitivity {
        slope: 7.0,
        r_squared: None,
        samples: 2,
        source: SensitivitySource::InsufficientData,
    };
    let json = serde_json::to_string(&weak).unwrap();
    assert!(json.contains("\"r_squared\":null"));
    let back: Sensitivity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, weak);
}

#[test]
fn test_scenario_spec_round_trip() {
    let spec = ScenarioSpec::from(ScenarioPreset::Severe);
    let json = serde_json::to_string(&spec).unwrap();
    let back: ScenarioSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);

    let custom: ScenarioSpec =
        serde_json::from_str(r#"{"label":"Spike","crude_price":110.0,"risk_premium":250.0}"#)
            .unwrap();
    assert_eq!(custom, ScenarioSpec::new("Spike", 110.0, 250.0));
}

#[test]
fn test_field_value_round_trip() {
    let value = FieldValue {
        actual: 1190.0,
        adjusted: 1215.5,
    };
    let json = serde_json::to_string(&value).unwrap();
    let back: FieldValue = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
    assert_relative_eq!(back.change(), 25.5);
}
