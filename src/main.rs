// src/main.rs

use anyhow::Result;
use clap::Parser;
use grade_eligibility::{
    cli::{self, Args},
    logging,
};

fn main() -> Result<()> {
    logging::init("info");
    let args = Args::parse();
    cli::run(args, &mut std::io::stdout().lock())
}
