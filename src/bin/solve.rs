//! Command-line solve trigger: runs the full pipeline once and prints the
//! outcome. Exits non-zero on failure so it can sit in a cron job.

use anyhow::Result;
use clap::Parser;
use itertools::Itertools;

use timetabler::api::SolverConfigPatch;
use timetabler::assemble;
use timetabler::solve::run_solve;

#[derive(Parser)]
#[command(about = "Run one timetable solve and persist the resulting schedule")]
struct Args {
    /// Term to schedule, e.g. 2025-T1.
    #[arg(long, default_value = assemble::DEFAULT_TERM)]
    term: String,

    /// Maximum periods of one subject per group per day.
    #[arg(long)]
    subject_per_day_limit: Option<i64>,

    /// Solver time budget in seconds (inside the solver, not the HTTP timeout).
    #[arg(long)]
    time_limit: Option<u64>,

    /// Random seed forwarded to the solver.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let patch = SolverConfigPatch {
        subject_per_day_limit: args.subject_per_day_limit,
        solver_time_limit_sec: args.time_limit,
        random_seed: args.seed,
        ..Default::default()
    };

    let outcome = tokio::runtime::Runtime::new()?.block_on(run_solve(&args.term, &patch))?;

    println!(
        "Schedule #{} created for {}: {} lessons",
        outcome.schedule_id, args.term, outcome.lesson_count
    );
    if let Some(score) = outcome.objective_score {
        println!("Objective score: {}", score);
    }
    if !outcome.notes.is_empty() {
        println!("Solver notes: {}", outcome.notes.iter().join("; "));
    }
    Ok(())
}
