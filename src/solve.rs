//! # The Solve Pipeline
//!
//! One solve request runs three sequential, non-overlapping phases:
//!
//! 1. **Read**: bulk-load the relational projections for the term.
//! 2. **Solve**: one bounded HTTP call to the external solver.
//! 3. **Write**: validate the result and persist it in one transaction.
//!
//! No transaction is held across the solver call, and concurrent solves for
//! the same term are not coordinated: two of them simply produce two
//! independent schedules.

use anyhow::Result;

use crate::api::{self, SolverConfigPatch};
use crate::assemble;
use crate::persist::{self, SolveOutcome};
use crate::store::{self, Snapshot};

/// Runs a complete solve for `term` and returns the persisted outcome.
///
/// Failures surface with their underlying message intact: transport errors
/// and storage errors verbatim, and a result without lessons as a
/// [`persist::SolveError`] the caller can tell apart.
pub async fn run_solve(term: &str, patch: &SolverConfigPatch) -> Result<SolveOutcome> {
    // Phase 1: relational reads.
    let snapshot = Snapshot::load(term)?;
    log::info!(
        "solve[{}]: loaded {} teachers, {} subjects, {} rooms, {} groups, {} assignments, {} timeslots, {} parallel edges",
        term,
        snapshot.teachers.len(),
        snapshot.subjects.len(),
        snapshot.rooms.len(),
        snapshot.groups.len(),
        snapshot.assignments.len(),
        snapshot.timeslots.len(),
        snapshot.parallel_edges.len(),
    );

    let input = assemble::build_input(term, &snapshot, patch);

    // Phase 2: one bounded call to the external solver.
    let result = api::solve(&input).await?;

    // Phase 3: validate, reconcile and persist atomically.
    let lessons = persist::lessons_of(&result)?;
    let notes = persist::notes_of(&result);
    let objective_score = persist::objective_score_of(&result);
    let index = store::assignment_index(&snapshot.assignments, term);

    let outcome = persist::persist_schedule(term, &lessons, &index, notes, objective_score)?;
    log::info!(
        "solve[{}]: schedule #{} persisted with {} lessons (objective: {:?})",
        term,
        outcome.schedule_id,
        outcome.lesson_count,
        outcome.objective_score,
    );
    Ok(outcome)
}
