// src/aggregate/mod.rs

pub mod types;

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use crate::grade::extract_grade;
use crate::process::NormalizedRow;

pub use types::{ParsedData, PlayerAtClub, TeamGrade};

#[derive(Default)]
struct ClubTotals {
    /// Teams in discovery order, each graded once.
    teams: Vec<TeamGrade>,
    team_index: HashMap<String, usize>,
    players: Vec<PlayerAtClub>,
    player_index: HashMap<(String, String), usize>,
}

impl ClubTotals {
    fn grade_of(&mut self, team: &str) -> u32 {
        if let Some(&i) = self.team_index.get(team) {
            return self.teams[i].grade;
        }
        let grade = extract_grade(team);
        self.team_index.insert(team.to_string(), self.teams.len());
        self.teams.push(TeamGrade {
            team: team.to_string(),
            grade,
        });
        grade
    }

    fn player(&mut self, surname: &str, name: &str) -> &mut PlayerAtClub {
        let key = (surname.to_string(), name.to_string());
        let idx = match self.player_index.get(&key) {
            Some(&i) => i,
            None => {
                self.players.push(PlayerAtClub::new(surname, name));
                self.player_index.insert(key, self.players.len() - 1);
                self.players.len() - 1
            }
        };
        &mut self.players[idx]
    }
}

/// Fold accepted rows into per-club, per-player, per-team totals.
///
/// Duplicate rows for the same player and team are summed. Clubs come out
/// sorted; each club's teams are ordered by grade with ties left in the order
/// they were first seen.
#[instrument(level = "info", skip(rows), fields(rows = rows.len()))]
pub fn aggregate(rows: &[NormalizedRow]) -> ParsedData {
    // 1) sum per (surname, name, club, team), keeping first-seen order
    let mut group_index: HashMap<(&str, &str, &str, &str), usize> = HashMap::new();
    let mut groups: Vec<(&NormalizedRow, u32)> = Vec::new();
    for row in rows {
        let key = (
            row.surname.as_str(),
            row.name.as_str(),
            row.nominated_club.as_str(),
            row.team.as_str(),
        );
        match group_index.get(&key) {
            Some(&i) => groups[i].1 = groups[i].1.saturating_add(row.effective_count),
            None => {
                group_index.insert(key, groups.len());
                groups.push((row, row.effective_count));
            }
        }
    }

    // 2) per club: grade each team once, accumulate players
    let mut clubs: BTreeMap<String, ClubTotals> = BTreeMap::new();
    for (row, total) in groups {
        let club = clubs.entry(row.nominated_club.clone()).or_default();
        let grade = club.grade_of(&row.team);
        club.player(&row.surname, &row.name).add(&row.team, grade, total);
    }

    // 3) order
    let mut data = ParsedData::default();
    for (name, mut totals) in clubs {
        totals.teams.sort_by_key(|t| t.grade);
        debug!(
            club = %name,
            teams = totals.teams.len(),
            players = totals.players.len(),
            "club aggregated"
        );
        data.clubs.push(name.clone());
        data.teams_by_club.insert(name.clone(), totals.teams);
        data.players_by_club.insert(name, totals.players);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CountSource;

    fn row(surname: &str, name: &str, club: &str, team: &str, n: u32) -> NormalizedRow {
        NormalizedRow {
            surname: surname.to_string(),
            name: name.to_string(),
            nominated_club: club.to_string(),
            team: team.to_string(),
            effective_count: n,
            counted_from: CountSource::TotalColumn,
        }
    }

    fn sample_rows() -> Vec<NormalizedRow> {
        vec![
            row("Smith", "John", "Oak FC", "Premier 2", 5),
            row("Smith", "John", "Oak FC", "Premier 1", 2),
            row("Jones", "Amy", "Elm United", "Division 3", 7),
            row("Smith", "John", "Oak FC", "Premier 2", 1),
            row("Brown", "Ann", "Oak FC", "Midweek", 4),
            row("Brown", "Ann", "Oak FC", "Reserves 2", 3),
            row("Smith", "John", "Elm United", "Division 3", 2),
        ]
    }

    /// Sort everything that aggregation leaves in discovery order.
    fn normalized(mut data: ParsedData) -> ParsedData {
        for teams in data.teams_by_club.values_mut() {
            teams.sort_by(|a, b| (a.grade, &a.team).cmp(&(b.grade, &b.team)));
        }
        for players in data.players_by_club.values_mut() {
            players.sort_by(|a, b| (&a.surname, &a.name).cmp(&(&b.surname, &b.name)));
        }
        data
    }

    #[test]
    fn sums_duplicates_and_totals_per_club() {
        let data = aggregate(&sample_rows());
        assert_eq!(data.clubs(), ["Elm United", "Oak FC"]);

        let smith = data
            .players_for("Oak FC")
            .iter()
            .find(|p| p.surname == "Smith")
            .unwrap();
        assert_eq!(smith.total_club_matches, 8);
        assert_eq!(smith.matches_by_team["Premier 2"], 6);
        assert_eq!(smith.matches_by_team["Premier 1"], 2);
        assert_eq!(smith.grades_by_team["Premier 1"], 1);

        // the same person nominated elsewhere is a separate record
        let elm = data.players_for("Elm United");
        assert_eq!(elm.len(), 2);
        assert!(elm.iter().any(|p| p.surname == "Smith" && p.total_club_matches == 2));
    }

    #[test]
    fn teams_sorted_by_grade_with_stable_ties() {
        let rows = vec![
            row("A", "A", "Oak FC", "Reserves 2", 1),
            row("B", "B", "Oak FC", "Premier 2", 1),
            row("C", "C", "Oak FC", "Premier 1", 1),
            row("D", "D", "Oak FC", "Social", 1),
        ];
        let data = aggregate(&rows);
        let teams: Vec<(&str, u32)> = data
            .teams_for("Oak FC")
            .iter()
            .map(|t| (t.team.as_str(), t.grade))
            .collect();
        assert_eq!(
            teams,
            vec![("Social", 0), ("Premier 1", 1), ("Reserves 2", 2), ("Premier 2", 2)]
        );
    }

    #[test]
    fn row_order_does_not_change_the_result() {
        let rows = sample_rows();
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut rotated = rows.clone();
        rotated.rotate_left(3);

        let expected = normalized(aggregate(&rows));
        assert_eq!(normalized(aggregate(&reversed)), expected);
        assert_eq!(normalized(aggregate(&rotated)), expected);
    }

    #[test]
    fn team_matches_add_up_to_club_total() {
        let data = aggregate(&sample_rows());
        for club in data.clubs() {
            for p in data.players_for(club) {
                let sum: u32 = p.matches_by_team.values().sum();
                assert_eq!(sum, p.total_club_matches, "{} {} at {}", p.name, p.surname, club);
            }
        }
    }

    #[test]
    fn unknown_club_is_empty_and_no_rows_is_empty() {
        let data = aggregate(&sample_rows());
        assert!(data.teams_for("Pine Rovers").is_empty());
        assert!(data.players_for("Pine Rovers").is_empty());

        let empty = aggregate(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.player_count(), 0);
    }
}
