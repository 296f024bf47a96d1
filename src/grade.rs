// src/grade.rs

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)$").expect("trailing digit regex should compile"));

/// Numeric competitive rank of a team, taken from the trailing digit run of its
/// name. Lower numbers are higher ranked; a name without trailing digits is grade 0.
///
/// Only ASCII digits count. A run too long for `u32` saturates to `u32::MAX`,
/// the lowest possible rank.
pub fn extract_grade(team: &str) -> u32 {
    let Some(m) = TRAILING_DIGITS.captures(team.trim()).and_then(|c| c.get(1)) else {
        return 0;
    };
    m.as_str().parse::<u32>().unwrap_or(u32::MAX)
}
