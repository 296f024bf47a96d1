// src/process/columns.rs

use anyhow::{ensure, Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Columns every export must carry, in the order missing ones are reported.
pub const SURNAME: &str = "Surname";
pub const NAME: &str = "Name";
pub const NOMINATED_CLUB: &str = "Nominated Club";
pub const TEAM: &str = "Team";
pub const TOTAL_ROUNDS: &str = "Total Rounds Played";

pub const REQUIRED_COLUMNS: [&str; 5] = [SURNAME, NAME, NOMINATED_CLUB, TEAM, TOTAL_ROUNDS];

/// Which header positions hold per-competition round counts, as it appears in config.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnWindowConfig {
    /// First competition column, 1-indexed.
    pub first: usize,
    /// Last competition column, 1-indexed and inclusive.
    pub last: usize,
    /// Case-insensitive patterns; a matching header is never counted.
    pub exclude: Vec<String>,
}

impl Default for ColumnWindowConfig {
    fn default() -> Self {
        Self {
            first: 6,
            last: 18,
            exclude: vec![
                r"\b6\s*-?\s*a\s*-?\s*side\b".to_string(),
                r"\b7\s*-?\s*a\s*-?\s*side\b".to_string(),
            ],
        }
    }
}

impl ColumnWindowConfig {
    /// Compile the exclusion patterns.
    pub fn build(&self) -> Result<ColumnWindow> {
        ensure!(self.first >= 1, "columns.first is 1-indexed, got {}", self.first);
        ensure!(
            self.first <= self.last,
            "columns.first ({}) is past columns.last ({})",
            self.first,
            self.last
        );
        let exclude = self
            .exclude
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("invalid column exclusion pattern `{}`", p))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ColumnWindow {
            first: self.first,
            last: self.last,
            exclude,
        })
    }
}

/// Compiled competition-column window.
#[derive(Debug, Clone)]
pub struct ColumnWindow {
    first: usize,
    last: usize,
    exclude: Vec<Regex>,
}

impl Default for ColumnWindow {
    fn default() -> Self {
        ColumnWindowConfig::default()
            .build()
            .expect("default column window should compile")
    }
}

impl ColumnWindow {
    pub fn is_excluded(&self, header: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(header))
    }

    /// Zero-based indices of the counted competition columns for `headers`.
    ///
    /// A header that stops short of `last` has no competition columns at all,
    /// so every row falls back to the total. Excluded names and the required
    /// identity/total columns are skipped.
    pub fn competition_indices(&self, headers: &[String]) -> Vec<usize> {
        if headers.len() < self.last {
            return Vec::new();
        }
        (self.first - 1..self.last)
            .filter(|&i| {
                let h = headers[i].as_str();
                !REQUIRED_COLUMNS.contains(&h) && !self.is_excluded(h)
            })
            .collect()
    }
}
