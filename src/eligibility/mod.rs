// src/eligibility/mod.rs

pub mod bias;
pub mod rules;
pub mod sort;

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::aggregate::{ParsedData, PlayerAtClub};
use crate::grade::extract_grade;

pub use bias::{classify_bias, Bias};
pub use rules::{EligibilityRules, RuleSelection};
pub use sort::{sort_players, SortKey};

/// A player who passed the selected rules. Owns its per-team map, so callers
/// can change it freely without touching the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligiblePlayer {
    pub surname: String,
    pub name: String,
    pub total_club_matches: u32,
    pub matches_by_team: BTreeMap<String, u32>,
}

impl From<&PlayerAtClub> for EligiblePlayer {
    fn from(p: &PlayerAtClub) -> Self {
        Self {
            surname: p.surname.clone(),
            name: p.name.clone(),
            total_club_matches: p.total_club_matches,
            matches_by_team: p.matches_by_team.clone(),
        }
    }
}

/// Players of `club` eligible for `target_team` under the default thresholds.
pub fn evaluate(
    data: &ParsedData,
    club: &str,
    target_team: &str,
    selection: RuleSelection,
) -> Vec<EligiblePlayer> {
    evaluate_with(&EligibilityRules::default(), data, club, target_team, selection)
}

/// As [`evaluate`], with explicit thresholds. An unknown club yields no players.
pub fn evaluate_with(
    rules: &EligibilityRules,
    data: &ParsedData,
    club: &str,
    target_team: &str,
    selection: RuleSelection,
) -> Vec<EligiblePlayer> {
    let target_grade = extract_grade(target_team);
    let players = data.players_for(club);

    let eligible: Vec<EligiblePlayer> = players
        .iter()
        .filter(|p| !selection.includes_rule1() || rules.passes_participation_floor(p, target_grade))
        .filter(|p| !selection.includes_rule2() || rules.passes_higher_share(p, target_grade))
        .map(EligiblePlayer::from)
        .collect();

    debug!(
        club,
        target_team,
        target_grade,
        %selection,
        candidates = players.len(),
        eligible = eligible.len(),
        "evaluated eligibility"
    );
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::process::{CountSource, NormalizedRow};

    fn row(surname: &str, team: &str, n: u32) -> NormalizedRow {
        NormalizedRow {
            surname: surname.to_string(),
            name: "Pat".to_string(),
            nominated_club: "Oak FC".to_string(),
            team: team.to_string(),
            effective_count: n,
            counted_from: CountSource::TotalColumn,
        }
    }

    /// Target is Premier 2 throughout.
    /// - Floor: 6 at P2, 1 at P1. Passes both.
    /// - Climber: 3 at P2, 6 at P1. Floor 3 fails, share 6/9 fails.
    /// - Fringe: 3 at R3. Floor 3 fails, share 0 passes.
    /// - Regular: 5 at R3, 6 at P1. Floor 5 passes, share 6/11 fails.
    fn data() -> ParsedData {
        aggregate(&[
            row("Floor", "Premier 2", 6),
            row("Floor", "Premier 1", 1),
            row("Climber", "Premier 2", 3),
            row("Climber", "Premier 1", 6),
            row("Fringe", "Reserves 3", 3),
            row("Regular", "Reserves 3", 5),
            row("Regular", "Premier 1", 6),
        ])
    }

    fn surnames(mut players: Vec<EligiblePlayer>) -> Vec<String> {
        sort_players(&mut players, SortKey::Surname, "Premier 2");
        players.into_iter().map(|p| p.surname).collect()
    }

    #[test]
    fn rule_selection_combines_rules() {
        let data = data();
        assert_eq!(
            surnames(evaluate(&data, "Oak FC", "Premier 2", RuleSelection::Rule1)),
            ["Floor", "Regular"]
        );
        assert_eq!(
            surnames(evaluate(&data, "Oak FC", "Premier 2", RuleSelection::Rule2)),
            ["Floor", "Fringe"]
        );
        assert_eq!(
            surnames(evaluate(&data, "Oak FC", "Premier 2", RuleSelection::Both)),
            ["Floor"]
        );
    }

    #[test]
    fn unknown_club_is_empty() {
        let data = data();
        assert!(evaluate(&data, "Pine Rovers", "Premier 2", RuleSelection::Both).is_empty());
    }

    #[test]
    fn results_are_independent_copies() {
        let data = data();
        let mut first = evaluate(&data, "Oak FC", "Premier 2", RuleSelection::Both);
        first[0].matches_by_team.insert("Premier 2".to_string(), 0);
        first[0].total_club_matches = 0;

        let again = evaluate(&data, "Oak FC", "Premier 2", RuleSelection::Both);
        assert_eq!(again[0].matches_by_team["Premier 2"], 6);
        assert_eq!(again[0].total_club_matches, 7);
    }

    #[test]
    fn thresholds_can_be_relaxed() {
        let data = data();
        let rules = EligibilityRules {
            min_matches: 3,
            max_higher_share: 0.7,
        };
        assert_eq!(
            surnames(evaluate_with(&rules, &data, "Oak FC", "Premier 2", RuleSelection::Both)),
            ["Climber", "Floor", "Fringe", "Regular"]
        );
    }
}
