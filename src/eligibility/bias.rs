// src/eligibility/bias.rs

use serde::Serialize;
use std::{cmp::Ordering, fmt};

use super::EligiblePlayer;
use crate::grade::extract_grade;

/// Whether a player has mostly played above or below the team they are being
/// picked for. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Higher,
    Lower,
    Equal,
}

impl Bias {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Higher => "higher",
            Bias::Lower => "lower",
            Bias::Equal => "equal",
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_bias(player: &EligiblePlayer, target_team: &str) -> Bias {
    let target = extract_grade(target_team);
    let (mut higher, mut lower) = (0u64, 0u64);
    for (team, &n) in &player.matches_by_team {
        match extract_grade(team).cmp(&target) {
            Ordering::Less => higher += u64::from(n),
            Ordering::Greater => lower += u64::from(n),
            Ordering::Equal => {}
        }
    }
    match higher.cmp(&lower) {
        Ordering::Greater => Bias::Higher,
        Ordering::Less => Bias::Lower,
        Ordering::Equal => Bias::Equal,
    }
}
