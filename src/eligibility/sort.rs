// src/eligibility/sort.rs

use anyhow::bail;
use std::{cmp::Reverse, str::FromStr};

use super::bias::{classify_bias, Bias};
use super::EligiblePlayer;

/// Result orderings offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Surname,
    MostMatches,
    Bias,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "surname" | "name" => Ok(SortKey::Surname),
            "matches" | "most-matches" => Ok(SortKey::MostMatches),
            "bias" => Ok(SortKey::Bias),
            other => bail!("unknown sort `{}` (expected surname, matches or bias)", other),
        }
    }
}

fn bias_rank(b: Bias) -> u8 {
    match b {
        Bias::Higher => 0,
        Bias::Equal => 1,
        Bias::Lower => 2,
    }
}

/// ASCII case-insensitive (surname, name) key.
fn name_key(p: &EligiblePlayer) -> (String, String) {
    (p.surname.to_ascii_lowercase(), p.name.to_ascii_lowercase())
}

/// Order players in place. Bias is judged against `target_team`.
pub fn sort_players(players: &mut [EligiblePlayer], key: SortKey, target_team: &str) {
    match key {
        SortKey::Surname => players.sort_by_cached_key(name_key),
        SortKey::MostMatches => {
            players.sort_by_cached_key(|p| (Reverse(p.total_club_matches), name_key(p)))
        }
        SortKey::Bias => players
            .sort_by_cached_key(|p| (bias_rank(classify_bias(p, target_team)), name_key(p))),
    }
}
