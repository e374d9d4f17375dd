//! End-to-end runs against a local sheet with the crude feed offline.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use service_cli::report::{chart, console};
use service_cli::{pipeline, AppConfig, CliError};

const SHEET: &str = "\
Date,WTI ($/bbl),Naphtha CFR Japan,BZ FOB Korea,ET CFR Taiwan,PG FOB Korea,\
SM FOB Korea,SM CFR China,AN CFR FEA,BD FOB Korea,ABS CFR China
2025-11-28,58.55,552.50,657.00,705.00,730.00,811.00,826.00,1010.00,800.00,1200.00
2025-12-05,60.08,561.75,673.30,710.00,735.00,813.00,830.00,1015.00,830.00,1195.00
2025-12-12,57.44,545.00,655.70,700.00,725.00,801.00,818.00,1020.00,840.00,1170.00
2025-12-19,56.66,540.25,655.70,700.00,722.00,795.50,812.00,1025.00,890.00,1170.00
2025-12-26,56.74,541.00,669.20,705.00,724.00,829.50,845.00,1035.00,,1170.00
2026-01-02,57.32,544.50,666.00,705.00,726.00,848.00,862.00,1040.00,,
2026-01-09,59.12,556.00,670.70,710.00,732.00,866.00,880.00,1050.00,1070.00,1180.00
2026-01-16,59.44,560.25,705.33,710.00,735.00,913.00,925.00,1060.00,1150.00,1190.00
";

fn offline_config(dir: &Path, sheet: &str) -> AppConfig {
    let sheet_path = dir.join("weekly.csv");
    fs::write(&sheet_path, sheet).unwrap();

    let mut config = AppConfig::default();
    config.crude.offline = true;
    config.sheet.source = sheet_path.display().to_string();
    config.output.chart_path = dir.join("out").join("report.svg");
    config.output.csv_path = dir.join("out").join("result.csv");
    config
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<String>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let record = reader.records().next().unwrap().unwrap();
    (headers, record.iter().map(String::from).collect())
}

fn cell<'a>(headers: &[String], values: &'a [String], name: &str) -> &'a str {
    let i = headers
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("missing column {}", name));
    &values[i]
}

#[test]
fn test_offline_run_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path(), SHEET);

    let output = pipeline::execute(&config).unwrap();

    assert!(output.quote.degraded);
    assert_relative_eq!(output.current.crude_realtime(), 59.44);
    assert_relative_eq!(output.current.crude_delta(), 0.0);
    assert_eq!(output.derived.len(), 8);
    assert_eq!(output.scenarios.len(), 5);

    let (headers, values) = read_csv(&config.output.csv_path);
    assert_eq!(headers.len(), values.len());
    assert_eq!(headers[0], "UpdateTime");
    assert_eq!(cell(&headers, &values, "WTI_Degraded"), "true");
    assert_eq!(cell(&headers, &values, "WTI_Realtime"), "59.44");
    assert_eq!(cell(&headers, &values, "Anchor_Date"), "2026-01-16");
    assert_eq!(cell(&headers, &values, "Crude_Delta"), "0.00");
    assert_eq!(cell(&headers, &values, "ABS_Actual"), "1190.00");
    assert_eq!(cell(&headers, &values, "ABS_Landed"), "1190.00");
    for label in ["Base", "Mild", "Moderate", "Severe", "Crisis"] {
        assert!(headers.contains(&format!("Scenario_{}_Gap", label)));
        assert!(headers.contains(&format!("Scenario_{}_Gap_Theo", label)));
    }
    assert!(headers.contains(&"Sens_BZ".to_string()));
    assert!(headers.contains(&"R2_ABS_Cost".to_string()));
    assert!(!headers.contains(&"Sens_WTI".to_string()));

    let svg = fs::read_to_string(&config.output.chart_path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("SM Profitability"));
    assert!(svg.contains("ABS Margin Trend (8W)"));
    assert!(svg.contains("Risk Scenarios"));
    assert!(svg.contains("Raw Material Trend"));
    assert!(svg.contains("fallback (sheet anchor 2026-01-16)"));
    assert!(!svg.contains("NaN"));
}

#[test]
fn test_outputs_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path(), SHEET);

    pipeline::execute(&config).unwrap();
    pipeline::execute(&config).unwrap();

    let text = fs::read_to_string(&config.output.csv_path).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_risk_premium_raises_costs() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(dir.path(), SHEET);
    config.model.risk_premium = 100.0;

    let output = pipeline::execute(&config).unwrap();
    let snap = &output.current;
    assert!(snap.risk_equiv_delta() > 0.0);
    assert_relative_eq!(
        snap.total_delta(),
        snap.crude_delta() + snap.risk_equiv_delta(),
        epsilon = 1e-12
    );
}

#[test]
fn test_missing_values_are_empty_cells() {
    // Anchor without ABS market: ABS gaps are unknown
    let sheet = SHEET.replace(
        "2026-01-16,59.44,560.25,705.33,710.00,735.00,913.00,925.00,1060.00,1150.00,1190.00",
        "2026-01-16,59.44,560.25,705.33,710.00,735.00,913.00,925.00,1060.00,1150.00,",
    );
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path(), &sheet);

    let output = pipeline::execute(&config).unwrap();
    assert!(output.current.abs_gap().is_nan());
    assert_eq!(output.current.alert().code(), "UNKNOWN");

    let (headers, values) = read_csv(&config.output.csv_path);
    assert_eq!(cell(&headers, &values, "ABS_Gap_Adjusted"), "");
    assert_eq!(cell(&headers, &values, "Alert"), "UNKNOWN");
    assert_eq!(cell(&headers, &values, "Scenario_Base_Gap"), "");

    let svg = chart::render(&output);
    assert!(!svg.contains("NaN"));
}

#[test]
fn test_missing_sheet_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(dir.path(), SHEET);
    config.sheet.source = dir.path().join("absent.csv").display().to_string();

    let err = pipeline::execute(&config).unwrap_err();
    assert!(matches!(err, CliError::Feed(_)));
    assert!(!config.output.csv_path.exists());
}

#[test]
fn test_sheet_without_crude_rows_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(
        dir.path(),
        "Date,WTI,BZ\n2026-01-16,,705.33\n2026-01-09,,670.7\n",
    );
    assert!(matches!(pipeline::execute(&config), Err(CliError::Feed(_))));
}

#[test]
fn test_console_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path(), SHEET);
    let output = pipeline::execute(&config).unwrap();

    let text = console::render(&output);
    assert!(text.contains("WTI          : $59.44"));
    assert!(text.contains("SM Margin"));
    assert!(text.contains("[ Risk scenarios ]"));
    for label in ["Base", "Mild", "Moderate", "Severe", "Crisis"] {
        assert!(text.contains(label));
    }
    assert!(text.contains("Worst case:"));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("petrocost.toml");
    fs::write(
        &path,
        r#"
        [crude]
        offline = true

        [model]
        preset = "legacy-v1"

        [[scenarios]]
        label = "Spike"
        crude_price = 110.0
        risk_premium = 250.0
        "#,
    )
    .unwrap();

    let config = AppConfig::load_or_default(&path).unwrap();
    assert!(config.crude.offline);
    assert_eq!(config.ladder().unwrap().len(), 1);
    assert!(config.validate().is_ok());

    let absent = AppConfig::load_or_default(&dir.path().join("none.toml")).unwrap();
    assert_eq!(absent, AppConfig::default());
}
