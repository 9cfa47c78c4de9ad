//! # Result Reconciliation and Persistence
//!
//! Validates a solver result document, matches its lesson placements back
//! onto known teaching assignments, and writes one schedule with all of its
//! lessons in a single transaction.
//!
//! The solver echoes plain identifiers, not provenance, so the originating
//! assignment of each lesson is resolved through the composite-key index
//! built from the same relational projection that produced the solver input
//! (`store::assignment_index`). A lookup miss is a legitimate "unknown
//! provenance" outcome, persisted as a NULL assignment reference.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use crate::api::LessonOut;
use crate::store::{AssignmentId, AssignmentKey, ScheduleId};

#[cfg(feature = "mysql")]
use mysql::params;
#[cfg(feature = "mysql")]
use mysql::prelude::*;

#[cfg(feature = "mysql")]
use crate::sql;

/// A solve attempt that ended without a persistable result. Distinguished
/// from transport and storage failures so the caller can report it as a
/// rejection (with the solver's own notes) rather than a server error.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("solver returned no lessons")]
    NoLessons { notes: Vec<String> },
}

/// What a successful solve reports back to the trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub schedule_id: ScheduleId,
    pub lesson_count: i64,
    pub objective_score: Option<i64>,
    pub notes: Vec<String>,
}

/// Free-text notes from a result document. Absent or non-list notes decode
/// to empty; non-string entries are dropped.
pub fn notes_of(result: &Value) -> Vec<String> {
    match result.get("notes") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// The solver's objective score, when it reports one. Lower is better;
/// absence means the solver reports no such score.
pub fn objective_score_of(result: &Value) -> Option<i64> {
    result.get("objectiveScore").and_then(Value::as_i64)
}

/// Extracts the lesson placements from a result document.
///
/// An absent, non-list or empty `lessons` field rejects the whole result
/// with [`SolveError::NoLessons`], carrying the solver's notes for
/// diagnostics; no storage records are created for a rejected result. A
/// non-empty list whose elements do not decode is a plain failure.
pub fn lessons_of(result: &Value) -> Result<Vec<LessonOut>> {
    match result.get("lessons") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|v| serde_json::from_value::<LessonOut>(v.clone()))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to decode lesson placements from solver result"),
        _ => Err(SolveError::NoLessons {
            notes: notes_of(result),
        }
        .into()),
    }
}

/// Resolves the originating assignment for one output lesson.
///
/// The key is computed with the *request* term, matching how the index was
/// registered, so global assignments resolve for any concrete term. `None`
/// means the solver placed a lesson the caller could not pre-enumerate.
pub fn resolve_assignment(
    index: &HashMap<AssignmentKey, AssignmentId>,
    term: &str,
    lesson: &LessonOut,
) -> Option<AssignmentId> {
    index
        .get(&(
            lesson.subject_id,
            lesson.teacher_id,
            lesson.group_id,
            term.to_string(),
        ))
        .copied()
}

/// Persists a validated result as a new schedule within one transaction.
///
/// Creates the schedule row, batch-inserts every lesson with its resolved
/// assignment reference, and counts what landed. Lesson rows colliding on
/// the exact-duplicate natural key are skipped silently, so replaying the
/// same result document against an existing schedule cannot duplicate
/// lessons. Any other failure rolls the entire transaction back; readers
/// never observe a partially-populated schedule.
#[cfg(feature = "mysql")]
pub fn persist_schedule(
    term: &str,
    lessons: &[LessonOut],
    index: &HashMap<AssignmentKey, AssignmentId>,
    notes: Vec<String>,
    objective_score: Option<i64>,
) -> Result<SolveOutcome> {
    let notes_json = serde_json::to_string(&notes).context("Failed to encode schedule notes")?;

    sql::transaction(|tx| {
        tx.exec_drop(
            "INSERT INTO schedules (schedule_term, schedule_notes) VALUES (:term, :notes)",
            params! { "term" => term, "notes" => &notes_json },
        )?;
        let schedule_id = tx
            .last_insert_id()
            .context("No insert id returned for schedule")? as ScheduleId;

        let rows: Vec<_> = lessons
            .iter()
            .map(|lesson| {
                let assignment_id = resolve_assignment(index, term, lesson);
                params! {
                    "schedule_id" => schedule_id,
                    "subject_id" => lesson.subject_id,
                    "teacher_id" => lesson.teacher_id,
                    "group_id" => lesson.group_id,
                    "room_id" => lesson.room_id,
                    "timeslot_id" => lesson.timeslot_id,
                    "assignment_id" => assignment_id,
                }
            })
            .collect();

        tx.exec_batch(
            r#"
            INSERT IGNORE INTO lessons
                (schedule_id, subject_id, teacher_id, group_id, room_id, timeslot_id, assignment_id)
            VALUES
                (:schedule_id, :subject_id, :teacher_id, :group_id, :room_id, :timeslot_id, :assignment_id)
            "#,
            rows,
        )?;

        let lesson_count: i64 = tx
            .exec_first(
                "SELECT COUNT(*) FROM lessons WHERE schedule_id = :schedule_id",
                params! { "schedule_id" => schedule_id },
            )?
            .unwrap_or(0);

        Ok(SolveOutcome {
            schedule_id,
            lesson_count,
            objective_score,
            notes,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::assignment_index;
    use crate::store::AssignmentRow;
    use serde_json::json;

    #[cfg(feature = "mysql")]
    use mysql::params;

    fn no_lessons_notes(err: &anyhow::Error) -> Option<&[String]> {
        match err.downcast_ref::<SolveError>() {
            Some(SolveError::NoLessons { notes }) => Some(notes),
            None => None,
        }
    }

    #[test]
    fn empty_lesson_list_is_rejected_with_notes() {
        let result = json!({ "lessons": [], "notes": ["No feasible solution"] });
        let err = lessons_of(&result).unwrap_err();
        assert_eq!(
            no_lessons_notes(&err),
            Some(&["No feasible solution".to_string()][..])
        );
    }

    #[test]
    fn absent_or_non_list_lessons_are_rejected() {
        for result in [json!({}), json!({ "lessons": "oops" }), json!({ "lessons": 3 })] {
            let err = lessons_of(&result).unwrap_err();
            assert!(no_lessons_notes(&err).is_some(), "not rejected: {}", result);
        }
    }

    #[test]
    fn well_formed_lessons_decode() {
        let result = json!({
            "lessons": [
                { "subjectId": 1, "teacherId": 2, "groupId": 3, "roomId": 4, "timeslotId": 5 }
            ],
            "objectiveScore": 12,
            "notes": ["classes=1"]
        });
        let lessons = lessons_of(&result).unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].timeslot_id, 5);
        assert_eq!(objective_score_of(&result), Some(12));
        assert_eq!(notes_of(&result), vec!["classes=1".to_string()]);
    }

    #[test]
    fn undecodable_lesson_elements_are_a_plain_failure_not_a_rejection() {
        let result = json!({ "lessons": [{ "subjectId": "one" }] });
        let err = lessons_of(&result).unwrap_err();
        assert!(no_lessons_notes(&err).is_none());
    }

    #[test]
    fn notes_tolerate_missing_and_mixed_shapes() {
        assert!(notes_of(&json!({})).is_empty());
        assert!(notes_of(&json!({ "notes": "plain" })).is_empty());
        assert_eq!(
            notes_of(&json!({ "notes": ["a", 1, null, "b"] })),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn missing_objective_score_reads_as_none() {
        assert_eq!(objective_score_of(&json!({})), None);
        assert_eq!(objective_score_of(&json!({ "objectiveScore": null })), None);
    }

    #[test]
    fn lessons_resolve_against_the_request_term_key() {
        let assignments = vec![AssignmentRow {
            id: 70,
            subject_id: 1,
            teacher_id: 2,
            group_id: 3,
            term: None, // global assignment
            required_periods: 3,
        }];
        let index = assignment_index(&assignments, "2025-T1");
        let lesson = LessonOut {
            subject_id: 1,
            teacher_id: 2,
            group_id: 3,
            room_id: 4,
            timeslot_id: 5,
        };
        assert_eq!(resolve_assignment(&index, "2025-T1", &lesson), Some(70));

        let stranger = LessonOut {
            subject_id: 9,
            ..lesson.clone()
        };
        assert_eq!(resolve_assignment(&index, "2025-T1", &stranger), None);
    }

    #[cfg(feature = "mysql")]
    #[test]
    #[ignore]
    fn duplicate_lesson_rows_are_skipped_not_duplicated() -> Result<()> {
        // Mirrors the lessons table's natural key on a scratch table, then
        // replays the same batch: the second run must not add rows.
        crate::sql::exec(
            r#"
            CREATE TABLE IF NOT EXISTS tmp_lessons_idem (
                lesson_id INT AUTO_INCREMENT PRIMARY KEY,
                schedule_id BIGINT NOT NULL,
                subject_id BIGINT NOT NULL,
                timeslot_id BIGINT NOT NULL,
                UNIQUE KEY uniq_tmp_lesson (schedule_id, subject_id, timeslot_id)
            )
            "#,
            (),
        )?;
        crate::sql::exec("DELETE FROM tmp_lessons_idem", ())?;

        let batch = || {
            vec![
                params! { "schedule_id" => 1, "subject_id" => 10, "timeslot_id" => 100 },
                params! { "schedule_id" => 1, "subject_id" => 10, "timeslot_id" => 101 },
                // exact duplicate inside the batch
                params! { "schedule_id" => 1, "subject_id" => 10, "timeslot_id" => 101 },
            ]
        };
        let stmt = r#"
            INSERT IGNORE INTO tmp_lessons_idem (schedule_id, subject_id, timeslot_id)
            VALUES (:schedule_id, :subject_id, :timeslot_id)
        "#;

        crate::sql::exec_batch(stmt, batch())?;
        let first: Option<i64> = crate::sql::cell("SELECT COUNT(*) FROM tmp_lessons_idem", ())?;
        assert_eq!(first, Some(2));

        // Replaying the identical document is idempotent.
        crate::sql::exec_batch(stmt, batch())?;
        let second: Option<i64> = crate::sql::cell("SELECT COUNT(*) FROM tmp_lessons_idem", ())?;
        assert_eq!(second, Some(2));

        crate::sql::exec("DROP TABLE tmp_lessons_idem", ())?;
        Ok(())
    }
}
