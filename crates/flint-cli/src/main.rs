//! Flint CLI
//!
//! Reads a DIMACS CNF formula from standard input and prints exactly one
//! verdict line: `SATISFIABLE` or `UNSATISFIABLE`. With `-v`, search
//! events (propagations, decisions, conflicts, backjumps, reductions,
//! restarts) are traced to standard output as they happen.
//!
//! Exit code is 0 for either verdict; nonzero only for ill-formed input.

use anyhow::{Context, Result};
use clap::Parser;
use flint_sat::{parse_dimacs, SolveResult};
use std::io::Read;
use tracing::Level;

#[derive(Parser)]
#[command(name = "flint")]
#[command(about = "CDCL SAT solver for DIMACS CNF formulas")]
#[command(version)]
struct Cli {
    /// Trace propagations, decisions, conflicts and restarts
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read standard input")?;
    let formula = parse_dimacs(&input).context("failed to parse DIMACS input")?;

    let mut solver = formula.into_solver();
    match solver.solve() {
        SolveResult::Sat(_) => println!("SATISFIABLE"),
        SolveResult::Unsat => println!("UNSATISFIABLE"),
    }
    Ok(())
}
