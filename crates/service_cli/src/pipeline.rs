//! One-shot run: fetch, derive, estimate, project, write.

use adapter_feeds::{CrudePriceFeed, FeedQuote, FixedCrudeFeed, YahooCrudeFeed};
use chrono::{DateTime, Utc};
use petro_core::types::PriceHistory;
use petro_models::{DerivedRow, DerivedSeriesBuilder, FormulaPreset};
use petro_risk::projector::{ProjectionRequest, Snapshot};
use petro_risk::scenarios::{ScenarioOutcome, ScenarioRunner};
use petro_risk::sensitivity::{SensitivityEstimator, SensitivityTable};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::report::{chart, csv_writer};

/// Everything a run produces, ready for rendering.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Wall-clock time of the run
    pub generated_at: DateTime<Utc>,
    /// Crude quote used as the real-time price
    pub quote: FeedQuote,
    /// Formula preset in use
    pub preset: FormulaPreset,
    /// Derived history, ascending by date
    pub derived: Vec<DerivedRow>,
    /// Most recent derived row
    pub anchor: DerivedRow,
    /// Trend window length
    pub window: usize,
    /// Fitted or default sensitivities
    pub sensitivities: SensitivityTable,
    /// Projection at the quoted crude price
    pub current: Snapshot,
    /// Scenario ladder outcomes, in ladder order
    pub scenarios: Vec<ScenarioOutcome>,
    /// ABS gap alert threshold ($/t)
    pub alert_threshold: f64,
}

impl RunOutput {
    /// The last `window` derived rows.
    pub fn window_rows(&self) -> &[DerivedRow] {
        let start = self.derived.len().saturating_sub(self.window);
        &self.derived[start..]
    }
}

/// Crude feed for the configuration: fixed fallback when offline, Yahoo otherwise.
///
/// # Errors
///
/// Returns `CliError::Feed` if the HTTP client cannot be built.
pub fn crude_feed(config: &AppConfig) -> Result<Box<dyn CrudePriceFeed>> {
    if config.crude.offline {
        info!(price = config.crude.fallback_price, "Offline mode, using fallback crude price");
        return Ok(Box::new(FixedCrudeFeed::new(FeedQuote::fallback(
            config.crude.fallback_price,
            config.crude.fallback_label.clone(),
        ))));
    }
    Ok(Box::new(YahooCrudeFeed::new(config.yahoo())?))
}

/// Run the model on an already loaded history.
///
/// # Errors
///
/// Returns an error if the configured preset, estimator or ladder is invalid.
pub fn compute(
    config: &AppConfig,
    history: &PriceHistory,
    quote: FeedQuote,
    generated_at: DateTime<Utc>,
) -> Result<RunOutput> {
    let projector = config.projector()?;
    let estimator_config = config.estimator();
    estimator_config.validate()?;
    let ladder = config.ladder()?;

    let builder = DerivedSeriesBuilder::new(*projector.formulas());
    let derived = builder.build_history(history);
    let anchor = builder.build_row(history.anchor());

    let sensitivities = SensitivityEstimator::new(estimator_config).estimate(&derived);

    let mut request = ProjectionRequest::new(quote.value, config.model.risk_premium);
    if let Some(et) = config.model.ethylene_override {
        request = request.with_ethylene_override(et);
    }
    let current = projector.project(&anchor, &sensitivities, &request);

    let runner = ScenarioRunner::new(projector);
    let scenarios = runner.run(&anchor, &sensitivities, &ladder);
    if let Some(worst) = ScenarioRunner::worst_case(&scenarios) {
        info!(
            scenario = %worst.spec.label,
            abs_gap = worst.abs_gap(),
            alert = %worst.alert(),
            "Worst scenario"
        );
    }

    Ok(RunOutput {
        generated_at,
        quote,
        preset: runner.projector().formulas().preset(),
        derived,
        anchor,
        window: config.sheet.window,
        sensitivities,
        current,
        scenarios,
        alert_threshold: runner.projector().alert_threshold(),
    })
}

/// Write the chart and the result CSV.
///
/// # Errors
///
/// Returns `CliError::Output` or `CliError::Csv` if a file cannot be written.
pub fn write_outputs(config: &AppConfig, output: &RunOutput) -> Result<()> {
    chart::write(&config.output.chart_path, output)?;
    csv_writer::write(&config.output.csv_path, output)?;
    Ok(())
}

/// Full run: load the sheet, quote crude, compute and write outputs.
///
/// # Errors
///
/// Sheet feed failures are fatal; crude feed failures degrade to the
/// fallback quote inside the feed.
pub fn execute(config: &AppConfig) -> Result<RunOutput> {
    let preset = config.formulas()?.preset();
    if preset.is_deprecated() {
        warn!(preset = %preset, "Using deprecated formula preset");
    }

    let history = config.sheet_feed().load()?;
    let quote = crude_feed(config)?.quote();
    info!(
        price = quote.value,
        source = %quote.provenance,
        degraded = quote.degraded,
        "Crude price"
    );

    let output = compute(config, &history, quote, Utc::now())?;
    write_outputs(config, &output)?;
    info!(
        alert = %output.current.alert(),
        abs_gap = output.current.abs_gap(),
        scenarios = output.scenarios.len(),
        "Run complete"
    );
    Ok(output)
}
