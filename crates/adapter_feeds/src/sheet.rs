//! Weekly price sheet feed.
//!
//! The sheet is a published CSV: the first column holds the observation
//! date, the remaining columns hold commodity prices under loosely
//! formatted headers. Parsing is lenient about cell contents (blanks,
//! dashes, `N/A`, thousands separators) and strict about structure: without
//! a crude column or a single usable row there is nothing to model.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use petro_core::types::{Commodity, CommodityRow, PriceHistory};
use tracing::{debug, info};

use crate::error::FeedError;
use crate::http;

/// Accepted date formats for the first column.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];

/// Where the sheet lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSource {
    /// Published CSV URL
    Url(String),
    /// Local CSV file
    Path(PathBuf),
}

impl SheetSource {
    /// `http://` and `https://` locations are URLs, anything else a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SheetSource::Url(trimmed.to_string())
        } else {
            SheetSource::Path(PathBuf::from(trimmed))
        }
    }

    /// Location for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            SheetSource::Url(url) => url.clone(),
            SheetSource::Path(path) => path.display().to_string(),
        }
    }
}

/// Reads and parses the weekly price sheet.
#[derive(Debug, Clone)]
pub struct SheetFeed {
    source: SheetSource,
    timeout: Duration,
}

impl SheetFeed {
    /// Create a feed.
    pub fn new(source: SheetSource, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Source in use.
    pub fn source(&self) -> &SheetSource {
        &self.source
    }

    /// Raw CSV text.
    ///
    /// # Errors
    ///
    /// * `FeedError::Http` - URL unreachable or non-success status
    /// * `FeedError::Io` - file unreadable
    pub fn fetch_text(&self) -> Result<String, FeedError> {
        match &self.source {
            SheetSource::Url(url) => {
                let client = http::client(self.timeout)?;
                http::get_text(&client, url, &[])
            }
            SheetSource::Path(path) => std::fs::read_to_string(path).map_err(|source| {
                FeedError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }),
        }
    }

    /// Fetch and parse the sheet.
    ///
    /// # Errors
    ///
    /// Any fetch error, or a parse error from [`parse_sheet`].
    pub fn load(&self) -> Result<PriceHistory, FeedError> {
        let text = self.fetch_text()?;
        let history = parse_sheet(&text)?;
        info!(
            source = %self.source.describe(),
            rows = history.len(),
            anchor = %history.anchor().date,
            "Price sheet loaded"
        );
        Ok(history)
    }
}

/// Parse sheet CSV text into a price history.
///
/// # Errors
///
/// * `FeedError::Csv` - malformed CSV
/// * `FeedError::MissingHeader` - empty input
/// * `FeedError::MissingCrudeColumn` - no header maps to crude
/// * `FeedError::Empty` - no row has both a date and a crude price
pub fn parse_sheet(text: &str) -> Result<PriceHistory, FeedError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(FeedError::MissingHeader);
    }

    let mut columns: Vec<(usize, Commodity)> = Vec::new();
    for (i, header) in headers.iter().enumerate().skip(1) {
        match Commodity::from_header(header) {
            Some(c) if !columns.iter().any(|(_, seen)| *seen == c) => columns.push((i, c)),
            Some(c) => debug!(header, commodity = %c, "Duplicate column ignored"),
            None => debug!(header, "Unrecognised column ignored"),
        }
    }
    if !columns.iter().any(|(_, c)| c.is_crude()) {
        return Err(FeedError::MissingCrudeColumn(
            headers.iter().collect::<Vec<_>>().join(", "),
        ));
    }

    let mut rows = Vec::new();
    let mut undated = 0usize;
    for record in reader.records() {
        let record = record?;
        let Some(date) = record.get(0).and_then(parse_date) else {
            undated += 1;
            continue;
        };
        let mut row = CommodityRow::new(date);
        for &(i, commodity) in &columns {
            row.set_price(commodity, record.get(i).and_then(parse_number));
        }
        rows.push(row);
    }

    let parsed = rows.len();
    let history = PriceHistory::from_unfiltered(rows).map_err(|_| FeedError::Empty)?;
    debug!(
        columns = columns.len(),
        rows = history.len(),
        undated,
        without_crude = parsed - history.len(),
        "Sheet parsed"
    );
    Ok(history)
}

/// Parse a date cell. A trailing time component is ignored.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let token = cell.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// Parse a price cell; blanks, dashes and text are missing.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
