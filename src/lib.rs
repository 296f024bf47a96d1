// src/lib.rs
//! Player eligibility from a club's season export of rounds played per player and team.
//!
//! Raw text goes through [`process::parse_table`] into normalized rows, is folded
//! by [`aggregate::aggregate`] into a [`ParsedData`] snapshot, and is queried with
//! [`eligibility::evaluate`].

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod eligibility;
pub mod grade;
pub mod logging;
pub mod process;
pub mod store;

pub use aggregate::{aggregate, ParsedData, PlayerAtClub, TeamGrade};
pub use eligibility::{
    classify_bias, evaluate, evaluate_with, sort_players, Bias, EligibilityRules, EligiblePlayer,
    RuleSelection, SortKey,
};
pub use grade::extract_grade;
pub use process::{parse_table, ColumnWindow, ParseError, ParseReport};

/// Parse and aggregate in one go.
pub fn ingest(raw: &str, window: &ColumnWindow) -> Result<(ParsedData, ParseReport), ParseError> {
    let table = parse_table(raw, window)?;
    Ok((aggregate(&table.rows), table.report))
}

#[cfg(test)]
pub(crate) mod test_support {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    pub fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,grade_eligibility=debug")),
            )
            .with_test_writer()
            .finish();
        // already set by an earlier test
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
