// src/process/mod.rs
//! Table parsing: raw export text → accepted, normalized rows.

pub mod columns;
pub mod normalize;
pub mod report;

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

pub use columns::{ColumnWindow, ColumnWindowConfig, REQUIRED_COLUMNS};
pub use normalize::{
    normalize, CountSource, HeaderLayout, NormalizedRow, RawRecord, RejectReason, RowOutcome,
};
pub use report::{ParseReport, RejectedSample};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

/// Which line of the input held the header that was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRow {
    First,
    /// The first line was a title and was discarded.
    Second,
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub layout: HeaderLayout,
    pub header_row: HeaderRow,
    pub rows: Vec<NormalizedRow>,
    pub report: ParseReport,
}

/// Raw bytes (as handed back by storage) as text.
pub fn decode(raw: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(raw)
        .map_err(|e| ParseError::MalformedInput(format!("input is not valid UTF-8: {}", e)))
}

/// Decode raw bytes and parse them.
pub fn parse_bytes(raw: &[u8], window: &ColumnWindow) -> Result<ParsedTable, ParseError> {
    parse_table(decode(raw)?, window)
}

/// Parse a delimited export.
///
/// The first line is tried as the header; if it lacks a required column the
/// first line is dropped and the second line is tried instead. Every data
/// record under the winning header goes through [`normalize`]; rejected rows
/// only show up in the report.
#[instrument(level = "info", skip(raw, window), fields(bytes = raw.len()))]
pub fn parse_table(raw: &str, window: &ColumnWindow) -> Result<ParsedTable, ParseError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let candidates = [
        (HeaderRow::First, text),
        (HeaderRow::Second, without_first_line(text)),
    ];

    let mut best: Option<(usize, &'static str)> = None;
    for (header_row, body) in candidates {
        let layout = HeaderLayout::new(read_header(body)?, window);
        match first_missing(&layout) {
            None => {
                debug!(?header_row, columns = layout.names().len(), "header accepted");
                return read_rows(body, layout, header_row);
            }
            Some(missing) => {
                let found = REQUIRED_COLUMNS.iter().filter(|c| layout.contains(c)).count();
                trace!(?header_row, missing, found, "header rejected");
                if best.map_or(true, |(n, _)| found > n) {
                    best = Some((found, missing));
                }
            }
        }
    }

    let missing = best.map(|(_, m)| m).unwrap_or(REQUIRED_COLUMNS[0]);
    Err(ParseError::MissingColumn(missing.to_string()))
}

fn without_first_line(text: &str) -> &str {
    match text.find('\n') {
        Some(i) => &text[i + 1..],
        None => "",
    }
}

fn first_missing(layout: &HeaderLayout) -> Option<&'static str> {
    REQUIRED_COLUMNS.iter().copied().find(|c| !layout.contains(c))
}

fn reader(body: &str, has_headers: bool) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(body.as_bytes())
}

fn read_header(body: &str) -> Result<Vec<String>, ParseError> {
    let mut record = StringRecord::new();
    let found = reader(body, false)
        .read_record(&mut record)
        .map_err(|e| ParseError::MalformedInput(e.to_string()))?;
    if !found {
        return Ok(Vec::new());
    }
    Ok(record.iter().map(|h| h.trim().to_string()).collect())
}

fn read_rows(
    body: &str,
    layout: HeaderLayout,
    header_row: HeaderRow,
) -> Result<ParsedTable, ParseError> {
    let width = layout.names().len();
    let mut rows = Vec::new();
    let mut report = ParseReport::default();

    for (idx, result) in reader(body, true).records().enumerate() {
        let n = idx + 1;
        let record = result
            .map_err(|e| ParseError::MalformedInput(format!("record {}: {}", n, e)))?;
        // Short records are allowed: exports close with `,,,,` trailer rows
        // narrower than the header, and their missing cells read as empty.
        if record.iter().skip(width).any(|c| !c.trim().is_empty()) {
            return Err(ParseError::MalformedInput(format!(
                "record {} has {} fields but the header has {}",
                n,
                record.len(),
                width
            )));
        }

        match normalize(&RawRecord::new(&layout, &record)) {
            RowOutcome::Accepted(row) => {
                report.record_accepted(row.counted_from);
                rows.push(row);
            }
            RowOutcome::Rejected(reason) => {
                debug!(record = n, %reason, "row rejected");
                report.record_rejected(n, &reason);
            }
        }
    }

    info!(
        ?header_row,
        accepted = report.accepted,
        rejected = report.rejected_total(),
        from_competitions = report.from_competitions,
        "parsed table"
    );

    Ok(ParsedTable {
        layout,
        header_row,
        rows,
        report,
    })
}
