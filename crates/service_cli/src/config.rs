//! Configuration for the petrocost runner.
//!
//! Loaded from TOML. Every section has defaults, so an absent file or an
//! empty one runs the canonical model against the bundled weekly sheet.
//! Selected values can be overridden from `PETROCOST_*` environment
//! variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use adapter_feeds::{SheetFeed, SheetSource, YahooFeedConfig};
use petro_models::{FormulaPreset, FormulaSet, ModelError};
use petro_risk::projector::{CostProjector, TightPremiumConfig};
use petro_risk::scenarios::{ScenarioLadder, ScenarioSpec};
use petro_risk::sensitivity::EstimatorConfig;
use petro_risk::RiskError;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Default tracing directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Crude price feed
    #[serde(default)]
    pub crude: CrudeConfig,
    /// Weekly price sheet
    #[serde(default)]
    pub sheet: SheetConfig,
    /// Model parameters
    #[serde(default)]
    pub model: ModelConfig,
    /// Output artifacts
    #[serde(default)]
    pub output: OutputConfig,
    /// Scenario ladder override; empty means the canonical ladder
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[crude]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrudeConfig {
    /// Chart endpoint without the ticker
    pub url: String,
    /// Ticker symbol
    pub ticker: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Price used when no live quote is available
    pub fallback_price: f64,
    /// Provenance label of the fallback price
    pub fallback_label: String,
    /// Lowest plausible price
    pub min_price: f64,
    /// Highest plausible price
    pub max_price: f64,
    /// Skip the network and use the fallback price
    pub offline: bool,
}

impl Default for CrudeConfig {
    fn default() -> Self {
        let feed = YahooFeedConfig::default();
        Self {
            url: feed.base_url,
            ticker: feed.ticker,
            timeout_secs: feed.timeout.as_secs(),
            fallback_price: feed.fallback_price,
            fallback_label: feed.fallback_label,
            min_price: feed.min_price,
            max_price: feed.max_price,
            offline: false,
        }
    }
}

/// `[sheet]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetConfig {
    /// Published CSV URL or local path
    pub source: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Rows shown in the trend panel
    pub window: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            source: "data/weekly_prices.csv".to_string(),
            timeout_secs: 15,
            window: 8,
        }
    }
}

/// `[model]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Formula preset name
    pub preset: String,
    /// Minimum paired observations before fitting a slope
    pub min_samples: usize,
    /// Minimum R² for a fitted slope
    pub r2_threshold: f64,
    /// BD premium per $1 of cracker margin lost
    pub tight_premium_scale: f64,
    /// BD premium cap ($/t)
    pub tight_premium_cap: f64,
    /// ABS gap alert threshold ($/t)
    pub alert_threshold: f64,
    /// Risk premium applied to the current snapshot ($/t)
    pub risk_premium: f64,
    /// Ethylene price override for the current snapshot ($/t)
    pub ethylene_override: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let estimator = EstimatorConfig::default();
        let tight = TightPremiumConfig::default();
        Self {
            preset: FormulaPreset::default().name().to_string(),
            min_samples: estimator.min_samples,
            r2_threshold: estimator.r2_threshold,
            tight_premium_scale: tight.scale,
            tight_premium_cap: tight.cap,
            alert_threshold: CostProjector::DEFAULT_ALERT_THRESHOLD,
            risk_premium: 0.0,
            ethylene_override: None,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Dashboard chart (SVG)
    pub chart_path: PathBuf,
    /// Single-row result CSV
    pub csv_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chart_path: PathBuf::from("risk_simulation_report.svg"),
            csv_path: PathBuf::from("simulation_result.csv"),
        }
    }
}

/// One `[[scenarios]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    /// Display label
    pub label: String,
    /// Crude price ($/bbl)
    pub crude_price: f64,
    /// Risk premium ($/t)
    #[serde(default)]
    pub risk_premium: f64,
}

impl From<&ScenarioConfig> for ScenarioSpec {
    fn from(s: &ScenarioConfig) -> Self {
        ScenarioSpec::new(s.label.clone(), s.crude_price, s.risk_premium)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            crude: CrudeConfig::default(),
            sheet: SheetConfig::default(),
            model: ModelConfig::default(),
            output: OutputConfig::default(),
            scenarios: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// * `ConfigError::Io` - file unreadable
    /// * `ConfigError::Parse` - invalid TOML or wrong value types
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for invalid TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`, or use defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::load`] for a file that exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply `PETROCOST_*` environment overrides.
    pub fn with_env_override(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup("PETROCOST_LOG_LEVEL") {
            self.log_level = level.trim().to_lowercase();
        }
        if let Some(source) = lookup("PETROCOST_SHEET_SOURCE") {
            self.sheet.source = source;
        }
        if let Some(offline) = lookup("PETROCOST_CRUDE_OFFLINE").and_then(|v| parse_flag(&v)) {
            self.crude.offline = offline;
        }
        if let Some(preset) = lookup("PETROCOST_MODEL_PRESET") {
            self.model.preset = preset;
        }
        if let Some(path) = lookup("PETROCOST_CHART_PATH") {
            self.output.chart_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("PETROCOST_CSV_PATH") {
            self.output.csv_path = PathBuf::from(path);
        }
        self
    }

    /// Check every setting, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` listing each invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {}, got '{}'",
                LOG_LEVELS.join("/"),
                self.log_level
            ));
        }

        let crude = &self.crude;
        if crude.timeout_secs == 0 {
            errors.push("crude.timeout_secs must be greater than 0".to_string());
        }
        if crude.ticker.trim().is_empty() {
            errors.push("crude.ticker must not be empty".to_string());
        }
        if !(crude.min_price.is_finite() && crude.max_price.is_finite())
            || crude.min_price >= crude.max_price
        {
            errors.push(format!(
                "crude.min_price ({}) must be below crude.max_price ({})",
                crude.min_price, crude.max_price
            ));
        } else if !(crude.min_price..=crude.max_price).contains(&crude.fallback_price) {
            errors.push(format!(
                "crude.fallback_price ({}) must lie in [{}, {}]",
                crude.fallback_price, crude.min_price, crude.max_price
            ));
        }

        if self.sheet.source.trim().is_empty() {
            errors.push("sheet.source must not be empty".to_string());
        }
        if self.sheet.timeout_secs == 0 {
            errors.push("sheet.timeout_secs must be greater than 0".to_string());
        }
        if self.sheet.window == 0 {
            errors.push("sheet.window must be at least 1".to_string());
        }

        if let Err(e) = self.formulas() {
            errors.push(format!("model.preset: {}", e));
        }
        if let Err(e) = self.estimator().validate() {
            errors.push(format!("model: {}", e));
        }
        if let Err(e) = self.tight_premium().validate() {
            errors.push(format!("model: {}", e));
        }
        if !self.model.alert_threshold.is_finite() {
            errors.push("model.alert_threshold must be finite".to_string());
        }
        if !self.model.risk_premium.is_finite() {
            errors.push("model.risk_premium must be finite".to_string());
        }
        if let Some(et) = self.model.ethylene_override {
            if !et.is_finite() || et <= 0.0 {
                errors.push(format!(
                    "model.ethylene_override must be positive, got {}",
                    et
                ));
            }
        }

        if let Err(e) = self.ladder() {
            errors.push(format!("scenarios: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load (or default), apply environment overrides, then validate.
    ///
    /// # Errors
    ///
    /// Any load or validation error.
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_or_default(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }

    /// Formula set for the configured preset.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownPreset` for an unrecognised name.
    pub fn formulas(&self) -> Result<FormulaSet, ModelError> {
        FormulaSet::from_name(&self.model.preset)
    }

    /// Sensitivity acceptance rules.
    pub fn estimator(&self) -> EstimatorConfig {
        EstimatorConfig {
            min_samples: self.model.min_samples,
            r2_threshold: self.model.r2_threshold,
        }
    }

    /// BD tight-premium parameters.
    pub fn tight_premium(&self) -> TightPremiumConfig {
        TightPremiumConfig {
            scale: self.model.tight_premium_scale,
            cap: self.model.tight_premium_cap,
        }
    }

    /// Projector for the configured model.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownPreset` for an unrecognised preset.
    pub fn projector(&self) -> Result<CostProjector, ModelError> {
        Ok(CostProjector::new(self.formulas()?)
            .with_tight_premium(self.tight_premium())
            .with_alert_threshold(self.model.alert_threshold))
    }

    /// Configured scenario ladder, or the canonical one.
    ///
    /// # Errors
    ///
    /// Returns a `RiskError` for duplicate labels or invalid entries.
    pub fn ladder(&self) -> Result<ScenarioLadder, RiskError> {
        if self.scenarios.is_empty() {
            Ok(ScenarioLadder::canonical())
        } else {
            ScenarioLadder::new(self.scenarios.iter().map(ScenarioSpec::from).collect())
        }
    }

    /// Yahoo chart feed settings.
    pub fn yahoo(&self) -> YahooFeedConfig {
        YahooFeedConfig {
            base_url: self.crude.url.clone(),
            ticker: self.crude.ticker.clone(),
            timeout: Duration::from_secs(self.crude.timeout_secs),
            min_price: self.crude.min_price,
            max_price: self.crude.max_price,
            fallback_price: self.crude.fallback_price,
            fallback_label: self.crude.fallback_label.clone(),
        }
    }

    /// Weekly sheet feed.
    pub fn sheet_feed(&self) -> SheetFeed {
        SheetFeed::new(
            SheetSource::parse(&self.sheet.source),
            Duration::from_secs(self.sheet.timeout_secs),
        )
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(String),
    /// TOML could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
    /// One or more settings are invalid
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
