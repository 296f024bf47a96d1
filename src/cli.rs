// src/cli.rs
//! Command-line surface over the stored dataset. `main` only parses arguments
//! and sets up logging; everything else happens in [`run`].

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{collections::BTreeMap, fs, io::Write, path::PathBuf, sync::Arc};
use tracing::info;

use crate::config::Config;
use crate::eligibility::{classify_bias, evaluate_with, sort_players, RuleSelection, SortKey};
use crate::store::{DatasetStore, FsBlobStore, Snapshot};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Which players at a club may play in a given team"
)]
pub struct Args {
    /// YAML config file; defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse an export and, if it is valid, make it the stored dataset.
    Upload { file: PathBuf },
    /// List clubs in the stored dataset.
    Clubs,
    /// List a club's teams, highest ranked first.
    Teams { club: String },
    /// List players eligible for a team.
    Check {
        #[arg(long)]
        club: String,
        #[arg(long)]
        team: String,
        #[arg(long, default_value = "both")]
        rules: RuleSelection,
        #[arg(long, default_value = "surname")]
        sort: SortKey,
        #[arg(long)]
        json: bool,
    },
    /// Show rows that were dropped from the stored dataset, and why.
    Report,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckRow<'a> {
    surname: &'a str,
    name: &'a str,
    total_club_matches: u32,
    bias: &'static str,
    matches_by_team: &'a BTreeMap<String, u32>,
}

/// Execute one command, writing user-facing output to `out`.
pub fn run(args: Args, out: &mut dyn Write) -> Result<()> {
    let cfg = Config::load(args.config.as_deref())?;
    let store = DatasetStore::new(FsBlobStore::new(&cfg.store.path), cfg.column_window()?);

    match args.command {
        Command::Upload { file } => {
            let raw = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let snap = store
                .upload(&raw)
                .with_context(|| format!("uploading {}", file.display()))?;
            info!(path = %cfg.store.path.display(), "stored");
            writeln!(
                out,
                "Loaded: {} clubs, {} players. Upload a new file to replace.",
                snap.data.clubs().len(),
                snap.data.player_count()
            )?;
            write_report(out, &snap)?;
        }
        Command::Clubs => {
            for club in load(&store)?.data.clubs() {
                writeln!(out, "{}", club)?;
            }
        }
        Command::Teams { club } => {
            let snap = load(&store)?;
            let teams = snap.data.teams_for(&club);
            if teams.is_empty() {
                bail!("no teams for club `{}`", club);
            }
            for t in teams {
                writeln!(out, "{:>3}  {}", t.grade, t.team)?;
            }
        }
        Command::Check {
            club,
            team,
            rules,
            sort,
            json,
        } => {
            let snap = load(&store)?;
            let mut eligible = evaluate_with(&cfg.rules, &snap.data, &club, &team, rules);
            sort_players(&mut eligible, sort, &team);

            let rows: Vec<CheckRow<'_>> = eligible
                .iter()
                .map(|p| CheckRow {
                    surname: &p.surname,
                    name: &p.name,
                    total_club_matches: p.total_club_matches,
                    bias: classify_bias(p, &team).as_str(),
                    matches_by_team: &p.matches_by_team,
                })
                .collect();

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
            } else if rows.is_empty() {
                writeln!(
                    out,
                    "No eligible players for {} (min {} games at or below, under {:.0}% in higher teams).",
                    team,
                    cfg.rules.min_matches,
                    cfg.rules.max_higher_share * 100.0
                )?;
            } else {
                writeln!(out, "Eligible players for {} ({}):", team, rules)?;
                for r in &rows {
                    writeln!(
                        out,
                        "{:<30} {:>4} games  {:<6}  {}",
                        format!("{}, {}", r.surname, r.name),
                        r.total_club_matches,
                        r.bias,
                        team_breakdown(r.matches_by_team)
                    )?;
                }
            }
        }
        Command::Report => {
            let snap = load(&store)?;
            write_report(out, &snap)?;
        }
    }
    Ok(())
}

fn load(store: &DatasetStore<FsBlobStore>) -> Result<Arc<Snapshot>> {
    match store.reload()? {
        Some(snap) => Ok(snap),
        None => bail!("no stored dataset; run `upload <file>` first"),
    }
}

fn team_breakdown(matches: &BTreeMap<String, u32>) -> String {
    matches
        .iter()
        .map(|(t, n)| format!("{} {}", t, n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_report(out: &mut dyn Write, snap: &Snapshot) -> Result<()> {
    let r = &snap.report;
    writeln!(
        out,
        "{} records: {} accepted ({} from competition columns, {} from totals), {} rejected",
        r.records,
        r.accepted,
        r.from_competitions,
        r.from_total,
        r.rejected_total()
    )?;
    for (reason, n) in &r.rejected {
        writeln!(out, "  {:<16} {}", reason, n)?;
    }
    for s in &r.samples {
        writeln!(out, "  record {:>5}: {}", s.record, s.reason)?;
    }
    Ok(())
}
