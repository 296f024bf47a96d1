// src/eligibility/rules.rs

use anyhow::bail;
use serde::Deserialize;
use std::{fmt, str::FromStr};

use crate::aggregate::PlayerAtClub;
use crate::grade::extract_grade;

/// Thresholds for the two eligibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilityRules {
    /// Rule 1: matches needed at or below the target grade.
    pub min_matches: u32,
    /// Rule 2: share of matches in higher grades that disqualifies (inclusive).
    pub max_higher_share: f64,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            min_matches: 4,
            max_higher_share: 0.51,
        }
    }
}

impl EligibilityRules {
    /// Rule 1: enough matches in teams whose grade is the target's or numerically greater.
    pub fn passes_participation_floor(&self, player: &PlayerAtClub, target_grade: u32) -> bool {
        let qualifying: u64 = player
            .matches_by_team
            .iter()
            .filter(|(team, _)| grade_in(player, team) >= target_grade)
            .map(|(_, &n)| u64::from(n))
            .sum();
        qualifying >= u64::from(self.min_matches)
    }

    /// Rule 2: share of matches in higher-ranked teams (numerically lower grade)
    /// must stay strictly below the threshold. No matches at all fails.
    pub fn passes_higher_share(&self, player: &PlayerAtClub, target_grade: u32) -> bool {
        if player.total_club_matches < 1 {
            return false;
        }
        let higher: u64 = player
            .matches_by_team
            .iter()
            .filter(|(team, _)| grade_in(player, team) < target_grade)
            .map(|(_, &n)| u64::from(n))
            .sum();
        let share = higher as f64 / f64::from(player.total_club_matches);
        share < self.max_higher_share
    }
}

fn grade_in(player: &PlayerAtClub, team: &str) -> u32 {
    player
        .grades_by_team
        .get(team)
        .copied()
        .unwrap_or_else(|| extract_grade(team))
}

/// Which rules a player has to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSelection {
    Rule1,
    Rule2,
    #[default]
    Both,
}

impl RuleSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSelection::Rule1 => "rule1",
            RuleSelection::Rule2 => "rule2",
            RuleSelection::Both => "both",
        }
    }

    pub(crate) fn includes_rule1(&self) -> bool {
        matches!(self, RuleSelection::Rule1 | RuleSelection::Both)
    }

    pub(crate) fn includes_rule2(&self) -> bool {
        matches!(self, RuleSelection::Rule2 | RuleSelection::Both)
    }
}

impl FromStr for RuleSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rule1" => Ok(RuleSelection::Rule1),
            "rule2" => Ok(RuleSelection::Rule2),
            "both" => Ok(RuleSelection::Both),
            other => bail!("unknown rule selection `{}` (expected rule1, rule2 or both)", other),
        }
    }
}

impl fmt::Display for RuleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
