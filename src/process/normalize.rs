// src/process/normalize.rs

use csv::StringRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::HashMap, fmt};

use super::columns::{ColumnWindow, NOMINATED_CLUB, NAME, SURNAME, TEAM, TOTAL_ROUNDS};

/// A trailing `(<digits>)` at the end of a competition cell.
static TRAILING_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([0-9]+)\)\s*$").expect("trailing count regex should compile"));

/// Finals rounds are marked inline and do not count towards the season.
const FINALS_MARKER: &str = "(f)";

/// Resolved header row: names, name → position lookup and the counted competition columns.
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    competition: Vec<usize>,
}

impl HeaderLayout {
    pub fn new(names: Vec<String>, window: &ColumnWindow) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, n) in names.iter().enumerate() {
            // first occurrence wins for duplicated names
            positions.entry(n.clone()).or_insert(i);
        }
        let competition = window.competition_indices(&names);
        Self {
            names,
            positions,
            competition,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    pub fn competition_columns(&self) -> &[usize] {
        &self.competition
    }
}

/// One source record viewed through its header row.
pub struct RawRecord<'a> {
    layout: &'a HeaderLayout,
    cells: &'a StringRecord,
}

impl<'a> RawRecord<'a> {
    pub fn new(layout: &'a HeaderLayout, cells: &'a StringRecord) -> Self {
        Self { layout, cells }
    }

    /// Cell under the named column; `None` when the column or the cell is absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = *self.layout.positions.get(column)?;
        self.cells.get(idx)
    }

    fn text(&self, column: &str) -> String {
        self.get(column).map(str::trim).unwrap_or_default().to_string()
    }
}

/// Where a row's count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    Competitions,
    TotalColumn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub surname: String,
    pub name: String,
    pub nominated_club: String,
    pub team: String,
    pub effective_count: u32,
    pub counted_from: CountSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectReason {
    MissingTotal,
    InvalidTotal(String),
    NegativeTotal(i64),
    MissingClub,
    MissingTeam,
}

impl RejectReason {
    /// Stable label used to bucket rejections in the parse report.
    pub fn kind(&self) -> &'static str {
        match self {
            RejectReason::MissingTotal => "missing total",
            RejectReason::InvalidTotal(_) => "invalid total",
            RejectReason::NegativeTotal(_) => "negative total",
            RejectReason::MissingClub => "missing club",
            RejectReason::MissingTeam => "missing team",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidTotal(v) => write!(f, "invalid total `{}`", v),
            RejectReason::NegativeTotal(v) => write!(f, "negative total {}", v),
            other => f.write_str(other.kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(NormalizedRow),
    Rejected(RejectReason),
}

/// Turn one record into a canonical row.
///
/// Rows with any non-empty counted competition cell are scored from those cells:
/// trailing `(n)` counts are summed and each `(f)` marker takes one away, floored
/// at zero. Every other row falls back to `Total Rounds Played`. Rows without a
/// usable count, club or team are rejected.
pub fn normalize(record: &RawRecord<'_>) -> RowOutcome {
    let competition = record.layout.competition_columns();
    let cells: Vec<&str> = competition
        .iter()
        .filter_map(|&i| record.cells.get(i))
        .map(str::trim)
        .collect();
    let has_competition_data = cells.iter().any(|c| !c.is_empty());

    let (effective_count, counted_from) = if has_competition_data {
        (count_competition_cells(&cells), CountSource::Competitions)
    } else {
        match parse_total(record.get(TOTAL_ROUNDS)) {
            Ok(n) => (n, CountSource::TotalColumn),
            Err(reason) => return RowOutcome::Rejected(reason),
        }
    };

    let nominated_club = record.text(NOMINATED_CLUB);
    if nominated_club.is_empty() {
        return RowOutcome::Rejected(RejectReason::MissingClub);
    }
    let team = record.text(TEAM);
    if team.is_empty() {
        return RowOutcome::Rejected(RejectReason::MissingTeam);
    }

    RowOutcome::Accepted(NormalizedRow {
        surname: record.text(SURNAME),
        name: record.text(NAME),
        nominated_club,
        team,
        effective_count,
        counted_from,
    })
}

fn count_competition_cells(cells: &[&str]) -> u32 {
    let mut rounds: u32 = 0;
    let mut finals: u32 = 0;
    for cell in cells {
        if let Some(n) = TRAILING_COUNT
            .captures(cell)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            rounds = rounds.saturating_add(n);
        }
        finals = finals.saturating_add(cell.matches(FINALS_MARKER).count() as u32);
    }
    rounds.saturating_sub(finals)
}

fn parse_total(raw: Option<&str>) -> Result<u32, RejectReason> {
    let v = raw.map(str::trim).unwrap_or_default();
    if v.is_empty() {
        return Err(RejectReason::MissingTotal);
    }
    let n: i64 = v
        .parse()
        .map_err(|_| RejectReason::InvalidTotal(v.to_string()))?;
    if n < 0 {
        return Err(RejectReason::NegativeTotal(n));
    }
    u32::try_from(n).map_err(|_| RejectReason::InvalidTotal(v.to_string()))
}
