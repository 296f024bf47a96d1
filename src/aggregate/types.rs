// src/aggregate/types.rs

use serde::Serialize;
use std::collections::BTreeMap;

/// A team and the grade derived from its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamGrade {
    pub team: String,
    pub grade: u32,
}

/// Season totals for one player at one nominated club.
///
/// Players are keyed by `(surname, name)` within a club; two people sharing
/// both are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAtClub {
    pub surname: String,
    pub name: String,
    pub total_club_matches: u32,
    pub matches_by_team: BTreeMap<String, u32>,
    pub grades_by_team: BTreeMap<String, u32>,
}

impl PlayerAtClub {
    pub(crate) fn new(surname: &str, name: &str) -> Self {
        Self {
            surname: surname.to_string(),
            name: name.to_string(),
            total_club_matches: 0,
            matches_by_team: BTreeMap::new(),
            grades_by_team: BTreeMap::new(),
        }
    }

    pub(crate) fn add(&mut self, team: &str, grade: u32, matches: u32) {
        self.total_club_matches = self.total_club_matches.saturating_add(matches);
        let slot = self.matches_by_team.entry(team.to_string()).or_default();
        *slot = slot.saturating_add(matches);
        self.grades_by_team.insert(team.to_string(), grade);
    }
}

/// The whole dataset from one upload. Built once by [`super::aggregate`] and
/// never modified afterwards; a new upload produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedData {
    pub(crate) clubs: Vec<String>,
    pub(crate) teams_by_club: BTreeMap<String, Vec<TeamGrade>>,
    pub(crate) players_by_club: BTreeMap<String, Vec<PlayerAtClub>>,
}

impl ParsedData {
    /// Clubs in lexicographic order.
    pub fn clubs(&self) -> &[String] {
        &self.clubs
    }

    /// The club's teams, highest ranked (lowest grade) first. Empty for unknown clubs.
    pub fn teams_for(&self, club: &str) -> &[TeamGrade] {
        self.teams_by_club
            .get(club)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The club's players in no particular order. Empty for unknown clubs.
    pub fn players_for(&self, club: &str) -> &[PlayerAtClub] {
        self.players_by_club
            .get(club)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn player_count(&self) -> usize {
        self.players_by_club.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty()
    }
}
