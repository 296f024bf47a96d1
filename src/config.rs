// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::eligibility::EligibilityRules;
use crate::process::{ColumnWindow, ColumnWindowConfig};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Where the latest upload is kept.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/matches-played-count-per-member.csv"),
        }
    }
}

/// Everything tunable, all optional. Missing keys keep their defaults.
///
/// ```yaml
/// columns:
///   first: 6
///   last: 18
///   exclude: ['\b6\s*-?\s*a\s*-?\s*side\b']
/// rules:
///   min_matches: 4
///   max_higher_share: 0.51
/// store:
///   path: data/matches.csv
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub columns: ColumnWindowConfig,
    pub rules: EligibilityRules,
    pub store: StoreConfig,
}

impl Config {
    /// Read `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no config file, using defaults");
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(text)?;
        // surface bad patterns now rather than at first upload
        cfg.column_window()?;
        Ok(cfg)
    }

    pub fn column_window(&self) -> Result<ColumnWindow> {
        self.columns.build()
    }
}
