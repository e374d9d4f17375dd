//! Run artifacts.
//!
//! - [`chart`]: four-panel SVG dashboard
//! - [`csv_writer`]: single-row result CSV
//! - [`console`]: plain-text run summary

pub mod chart;
pub mod console;
pub mod csv_writer;

use std::path::Path;

use crate::error::{CliError, Result};

/// Write `contents` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::output(path, e))?;
    }
    std::fs::write(path, contents).map_err(|e| CliError::output(path, e))?;
    tracing::info!(path = %path.display(), size = contents.len(), "Report written to file");
    Ok(())
}

/// `1234.5` → `"1,235"`; non-finite values render as `"n/a"`.
pub(crate) fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    // Half away from zero; `{:.0}` alone rounds half to even
    let rounded = format!("{:.0}", value.abs().round());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// `$1,235`, `-$25`.
pub(crate) fn usd(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let text = thousands(value);
    match text.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", text),
    }
}

/// `+$194`, `-$25`.
pub(crate) fn signed_usd(value: f64) -> String {
    if value.is_finite() && value >= 0.0 {
        format!("+{}", usd(value))
    } else {
        usd(value)
    }
}
