//! Single-row result CSV.
//!
//! One header row and one data row, overwritten each run. Numbers carry two
//! decimals; unknown values are empty cells.

use std::path::Path;

use petro_core::types::Commodity;
use petro_models::{DerivedField, SeriesKey};

use crate::error::{CliError, Result};
use crate::pipeline::RunOutput;

use super::write_file;

/// Flat header/value view of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    columns: Vec<(String, String)>,
}

impl ResultRecord {
    /// Flatten a run into named columns.
    pub fn from_run(output: &RunOutput) -> Self {
        let snap = &output.current;
        let mut record = Self {
            columns: Vec::new(),
        };

        record.text(
            "UpdateTime",
            output.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        );
        record.text("WTI_Source", output.quote.provenance.clone());
        record.text("WTI_Degraded", output.quote.degraded.to_string());
        record.number("WTI_Realtime", snap.crude_realtime());
        record.number("WTI_Anchor", snap.crude_anchor());
        record.text("Anchor_Date", snap.anchor_date().to_string());
        record.number("Crude_Delta", snap.crude_delta());
        record.number("Risk_Premium", snap.risk_premium());
        record.number("Risk_Equiv_Delta", snap.risk_equiv_delta());
        record.number("Total_Delta", snap.total_delta());
        record.number("Cracker_Margin", snap.cracker_margin());
        record.number("BD_Tight_Premium", snap.bd_tight_premium());
        record.text("Alert", snap.alert().code().to_string());

        for key in SeriesKey::all() {
            let field = snap.field(key);
            record.number(format!("{}_Actual", key.code()), field.actual);
            record.number(format!("{}_Adjusted", key.code()), field.adjusted);
        }

        for outcome in &output.scenarios {
            let label = column_label(&outcome.spec.label);
            record.number(format!("Scenario_{}_Gap", label), outcome.abs_gap());
            record.number(
                format!("Scenario_{}_Gap_Theo", label),
                outcome.abs_gap_theoretical(),
            );
        }

        for (key, sensitivity) in output.sensitivities.iter() {
            record.number(format!("Sens_{}", key.code()), sensitivity.slope);
            record.number(
                format!("R2_{}", key.code()),
                sensitivity.r_squared.unwrap_or(f64::NAN),
            );
        }

        // Columns read by the older dashboard sheet
        record.number(
            "Margin",
            snap.adjusted(SeriesKey::Derived(DerivedField::SmMarginActual)),
        );
        record.number(
            "ABS_Landed",
            snap.adjusted(SeriesKey::Commodity(Commodity::AbsMarket)),
        );

        record
    }

    fn text(&mut self, name: impl Into<String>, value: String) {
        self.columns.push((name.into(), value));
    }

    fn number(&mut self, name: impl Into<String>, value: f64) {
        let cell = if value.is_finite() {
            format!("{:.2}", value)
        } else {
            String::new()
        };
        self.columns.push((name.into(), cell));
    }

    /// Column names in order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(h, _)| h.as_str())
    }

    /// Cell for `header`, if present.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Encode as CSV text.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Csv` if encoding fails.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.headers())?;
        writer.write_record(self.columns.iter().map(|(_, v)| v.as_str()))?;
        writer
            .into_inner()
            .map_err(|e| CliError::from(csv::Error::from(e.into_error())))
    }
}

/// Scenario labels become part of column names.
fn column_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Write the result CSV for `output`.
///
/// # Errors
///
/// Returns `CliError::Csv` or `CliError::Output` on failure.
pub fn write(path: &Path, output: &RunOutput) -> Result<()> {
    let bytes = ResultRecord::from_run(output).to_csv()?;
    write_file(path, &bytes)
}
