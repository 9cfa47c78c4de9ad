//! # Solver Input Assembly
//!
//! Joins the relational projections for one term into a single
//! self-contained [`SolveInput`] document: teachers with their decoded
//! unavailability, groups with their parallel partners, assignments scoped
//! to the term, timeslots in canonical order, and the merged solver
//! configuration.
//!
//! Assembly never fails. Missing optional fields become explicit absence on
//! the wire, and malformed stored data has already been degraded by the
//! availability parser.

use crate::api::{
    AssignmentIn, GroupIn, RoomIn, SolveInput, SolverConfig, SolverConfigPatch, SubjectIn,
    TeacherIn, TimeslotIn,
};
use crate::availability;
use crate::parallels;
use crate::store::{self, Snapshot};

/// Placeholder term used when the trigger carries none.
pub const DEFAULT_TERM: &str = "2025-T1";

/// Deployment-level override for the default solver time limit.
const TIME_LIMIT_ENV: &str = "SOLVER_TIME_LIMIT_SEC";

fn default_time_limit_sec() -> u64 {
    std::env::var(TIME_LIMIT_ENV)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(15)
}

/// Merges caller-supplied overrides over the hard-coded defaults,
/// field-by-field on presence. `Some(false)` overrides a `true` default;
/// only `None` means "unset".
pub fn merge_config(patch: &SolverConfigPatch) -> SolverConfig {
    SolverConfig {
        subject_per_day_limit: patch.subject_per_day_limit.unwrap_or(1),
        avoid_first_period: patch.avoid_first_period.unwrap_or(true),
        avoid_last_period: patch.avoid_last_period.unwrap_or(true),
        avoid_indices: patch.avoid_indices.clone().unwrap_or_default(),
        solver_time_limit_sec: patch
            .solver_time_limit_sec
            .unwrap_or_else(default_time_limit_sec),
        random_seed: patch.random_seed,
        parallel_policy: patch
            .parallel_policy
            .clone()
            .unwrap_or_else(|| "BLOCK".to_string()),
    }
}

/// Builds the solver input document for `term` from a loaded snapshot.
///
/// - Timeslots cover all terms and are emitted in weekday-sequence order,
///   days uppercased.
/// - Assignments are kept when their term matches the request or is NULL
///   (global assignments apply to every term).
/// - Room categories pass through unchanged; no eligibility filtering here.
pub fn build_input(term: &str, snapshot: &Snapshot, patch: &SolverConfigPatch) -> SolveInput {
    let adjacency = parallels::adjacency(snapshot.parallel_edges.iter().copied());

    let mut timeslots = snapshot.timeslots.clone();
    store::sort_timeslots(&mut timeslots);

    SolveInput {
        term: term.to_string(),
        timeslots: timeslots
            .iter()
            .map(|t| TimeslotIn {
                id: t.id,
                day: t.day.to_uppercase(),
                index: t.index,
            })
            .collect(),
        rooms: snapshot
            .rooms
            .iter()
            .map(|r| RoomIn {
                id: r.id,
                name: r.name.clone(),
                capacity: r.capacity,
                room_type: r.room_type.clone(),
            })
            .collect(),
        teachers: snapshot
            .teachers
            .iter()
            .map(|t| TeacherIn {
                id: t.id,
                name: t.name.clone(),
                max_hours_per_week: t.max_hours_per_week,
                unavailable: availability::parse_unavailability(t.unavailable.as_deref()),
            })
            .collect(),
        subjects: snapshot
            .subjects
            .iter()
            .map(|s| SubjectIn {
                id: s.id,
                code: s.code.clone(),
                name: s.name.clone(),
                requires_room_type: s.requires_room_type.clone(),
            })
            .collect(),
        groups: snapshot
            .groups
            .iter()
            .map(|g| GroupIn {
                id: g.id,
                name: g.name.clone(),
                size: g.size,
                parallel_with_ids: parallels::partners(&adjacency, g.id),
            })
            .collect(),
        assignments: snapshot
            .assignments
            .iter()
            .filter(|a| match a.term.as_deref() {
                None => true,
                Some(t) => t == term,
            })
            .map(|a| AssignmentIn {
                id: a.id,
                subject_id: a.subject_id,
                teacher_id: a.teacher_id,
                group_id: a.group_id,
                required_periods: a.required_periods,
            })
            .collect(),
        config: merge_config(patch),
    }
}
