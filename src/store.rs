//! # Relational Projections
//!
//! Row types for the scheduling entities, bulk loads scoped the way the
//! solve pipeline consumes them, and the assignment-key index used to
//! reconcile solver output back onto known teaching assignments.
//!
//! All identifiers are store-assigned and opaque. Loads are plain bulk
//! `SELECT`s; the pipeline issues them up front and never holds a
//! transaction across the solver call.

use std::collections::HashMap;

#[cfg(feature = "mysql")]
use anyhow::Result;
#[cfg(feature = "mysql")]
use mysql::params;

#[cfg(feature = "mysql")]
use crate::sql;

pub type TeacherId = i64;
pub type SubjectId = i64;
pub type RoomId = i64;
pub type GroupId = i64;
pub type TimeslotId = i64;
pub type AssignmentId = i64;
pub type ScheduleId = i64;

/// A teacher as stored: unavailability stays raw here and is decoded by
/// `availability::parse_unavailability` at assembly time.
#[derive(Debug, Clone)]
pub struct TeacherRow {
    pub id: TeacherId,
    pub name: String,
    pub dept: String,
    pub max_hours_per_week: Option<i64>,
    pub unavailable: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubjectRow {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    pub periods_per_week: i64,
    pub requires_room_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RoomRow {
    pub id: RoomId,
    pub name: String,
    pub capacity: i64,
    pub room_type: String,
}

#[derive(Debug, Clone)]
pub struct GroupRow {
    pub id: GroupId,
    pub name: String,
    pub dept: String,
    pub level: i64,
    pub size: i64,
}

/// The authoritative unit of work to schedule: one subject taught by one
/// teacher to one group. `term` is `None` for global assignments that apply
/// to every term.
#[derive(Debug, Clone)]
pub struct AssignmentRow {
    pub id: AssignmentId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub group_id: GroupId,
    pub term: Option<String>,
    pub required_periods: i64,
}

#[derive(Debug, Clone)]
pub struct TimeslotRow {
    pub id: TimeslotId,
    pub day: String,
    pub index: i64,
    pub start_time: String,
    pub end_time: String,
}

/// Fixed weekday sequence used for timeslot ordering. Days the store invents
/// beyond these sort after all known ones, stably.
const WEEKDAYS: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Rank of a day within the fixed weekday sequence, case-insensitive.
pub fn day_rank(day: &str) -> usize {
    WEEKDAYS
        .iter()
        .position(|d| d.eq_ignore_ascii_case(day))
        .unwrap_or(WEEKDAYS.len())
}

/// Orders timeslots by the fixed weekday sequence, then by index within the
/// day. The sort is stable, so unknown days keep their stored order.
pub fn sort_timeslots(slots: &mut [TimeslotRow]) {
    slots.sort_by(|a, b| {
        day_rank(&a.day)
            .cmp(&day_rank(&b.day))
            .then(a.index.cmp(&b.index))
    });
}

/// Composite key a solver-output lesson is matched under:
/// (subject, teacher, group, term).
pub type AssignmentKey = (SubjectId, TeacherId, GroupId, String);

/// Builds the lookup from assignment key to assignment id for one request.
///
/// Every loaded assignment, including global ones whose stored term is
/// NULL, is registered under the *request* term, because that is the term
/// the reconciler computes lesson keys with. Registering global rows under
/// an empty term instead would make them unmatchable. When a concrete-term
/// row and a global row share (subject, teacher, group), the concrete row
/// wins.
pub fn assignment_index(
    assignments: &[AssignmentRow],
    term: &str,
) -> HashMap<AssignmentKey, AssignmentId> {
    let mut index: HashMap<AssignmentKey, AssignmentId> = HashMap::new();
    for a in assignments {
        let key = (a.subject_id, a.teacher_id, a.group_id, term.to_string());
        let concrete = a.term.as_deref() == Some(term);
        match index.entry(key) {
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(a.id);
            }
            std::collections::hash_map::Entry::Occupied(mut e) => {
                if concrete {
                    e.insert(a.id);
                }
            }
        }
    }
    index
}

#[cfg(feature = "mysql")]
pub fn load_teachers() -> Result<Vec<TeacherRow>> {
    let rows = sql::select(
        r#"
        SELECT teacher_id, teacher_name, teacher_dept, teacher_max_hours, teacher_unavailable
        FROM teachers
        "#,
        (),
    )?;
    rows.iter()
        .map(|r| {
            Ok(TeacherRow {
                id: r.get("teacher_id")?,
                name: r.get("teacher_name")?,
                dept: r.get("teacher_dept")?,
                max_hours_per_week: r.get_option("teacher_max_hours")?,
                unavailable: r.get_option("teacher_unavailable")?,
            })
        })
        .collect()
}

#[cfg(feature = "mysql")]
pub fn load_subjects() -> Result<Vec<SubjectRow>> {
    let rows = sql::select(
        r#"
        SELECT subject_id, subject_code, subject_name, subject_periods_per_week, subject_room_type
        FROM subjects
        "#,
        (),
    )?;
    rows.iter()
        .map(|r| {
            Ok(SubjectRow {
                id: r.get("subject_id")?,
                code: r.get("subject_code")?,
                name: r.get("subject_name")?,
                periods_per_week: r.get("subject_periods_per_week")?,
                requires_room_type: r.get_option("subject_room_type")?,
            })
        })
        .collect()
}

#[cfg(feature = "mysql")]
pub fn load_rooms() -> Result<Vec<RoomRow>> {
    let rows = sql::select(
        "SELECT room_id, room_name, room_capacity, room_type FROM rooms",
        (),
    )?;
    rows.iter()
        .map(|r| {
            Ok(RoomRow {
                id: r.get("room_id")?,
                name: r.get("room_name")?,
                capacity: r.get("room_capacity")?,
                room_type: r.get("room_type")?,
            })
        })
        .collect()
}

#[cfg(feature = "mysql")]
pub fn load_groups() -> Result<Vec<GroupRow>> {
    let rows = sql::select(
        "SELECT group_id, group_name, group_dept, group_level, group_size FROM student_groups",
        (),
    )?;
    rows.iter()
        .map(|r| {
            Ok(GroupRow {
                id: r.get("group_id")?,
                name: r.get("group_name")?,
                dept: r.get("group_dept")?,
                level: r.get("group_level")?,
                size: r.get("group_size")?,
            })
        })
        .collect()
}

/// Assignments for the requested term plus global (NULL-term) ones.
#[cfg(feature = "mysql")]
pub fn load_assignments(term: &str) -> Result<Vec<AssignmentRow>> {
    let rows = sql::select(
        r#"
        SELECT assignment_id, subject_id, teacher_id, group_id, assignment_term,
               assignment_required_periods
        FROM teaching_assignments
        WHERE assignment_term = :term OR assignment_term IS NULL
        "#,
        params! { "term" => term },
    )?;
    rows.iter()
        .map(|r| {
            Ok(AssignmentRow {
                id: r.get("assignment_id")?,
                subject_id: r.get("subject_id")?,
                teacher_id: r.get("teacher_id")?,
                group_id: r.get("group_id")?,
                term: r.get_option("assignment_term")?,
                required_periods: r.get("assignment_required_periods")?,
            })
        })
        .collect()
}

/// All timeslots, ordered by the fixed weekday sequence then index.
/// Timeslots are not term-scoped.
#[cfg(feature = "mysql")]
pub fn load_timeslots() -> Result<Vec<TimeslotRow>> {
    let rows = sql::select(
        r#"
        SELECT timeslot_id, timeslot_day, timeslot_index, timeslot_start, timeslot_end
        FROM timeslots
        "#,
        (),
    )?;
    let mut slots = rows
        .iter()
        .map(|r| {
            Ok(TimeslotRow {
                id: r.get("timeslot_id")?,
                day: r.get("timeslot_day")?,
                index: r.get("timeslot_index")?,
                start_time: r.get("timeslot_start")?,
                end_time: r.get("timeslot_end")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    sort_timeslots(&mut slots);
    Ok(slots)
}

/// Everything the pipeline reads for one solve request. Loaded up front in
/// one read phase; the assembler and the reconciler both work from this
/// same projection, so the input document and the assignment-key index can
/// never disagree about which assignments exist.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub teachers: Vec<TeacherRow>,
    pub subjects: Vec<SubjectRow>,
    pub rooms: Vec<RoomRow>,
    pub groups: Vec<GroupRow>,
    pub assignments: Vec<AssignmentRow>,
    pub timeslots: Vec<TimeslotRow>,
    pub parallel_edges: Vec<(GroupId, GroupId)>,
}

#[cfg(feature = "mysql")]
impl Snapshot {
    /// Bulk-loads all projections for the requested term. The queries are
    /// independent; they run back-to-back on pooled connections and no
    /// transaction spans them.
    pub fn load(term: &str) -> Result<Snapshot> {
        Ok(Snapshot {
            teachers: load_teachers()?,
            subjects: load_subjects()?,
            rooms: load_rooms()?,
            groups: load_groups()?,
            assignments: load_assignments(term)?,
            timeslots: load_timeslots()?,
            parallel_edges: load_parallel_edges(term)?,
        })
    }
}

/// Directed parallel-edge rows for one term, ready for
/// `parallels::adjacency`.
#[cfg(feature = "mysql")]
pub fn load_parallel_edges(term: &str) -> Result<Vec<(GroupId, GroupId)>> {
    let rows = sql::select(
        r#"
        SELECT group_a_id, group_b_id
        FROM group_parallels
        WHERE group_parallel_term = :term
        "#,
        params! { "term" => term },
    )?;
    rows.iter()
        .map(|r| Ok((r.get("group_a_id")?, r.get("group_b_id")?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: TimeslotId, day: &str, index: i64) -> TimeslotRow {
        TimeslotRow {
            id,
            day: day.to_string(),
            index,
            start_time: "08:00".to_string(),
            end_time: "08:50".to_string(),
        }
    }

    fn assignment(
        id: AssignmentId,
        subject: SubjectId,
        teacher: TeacherId,
        group: GroupId,
        term: Option<&str>,
    ) -> AssignmentRow {
        AssignmentRow {
            id,
            subject_id: subject,
            teacher_id: teacher,
            group_id: group,
            term: term.map(str::to_string),
            required_periods: 3,
        }
    }

    #[test]
    fn timeslots_order_by_weekday_sequence_then_index() {
        // Alphabetical order would put FRI first; the weekday sequence must win.
        let mut slots = vec![
            slot(1, "FRI", 1),
            slot(2, "MON", 2),
            slot(3, "MON", 1),
            slot(4, "WED", 1),
        ];
        sort_timeslots(&mut slots);
        let ids: Vec<TimeslotId> = slots.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn unknown_days_sort_after_known_ones() {
        let mut slots = vec![slot(1, "XDAY", 1), slot(2, "SUN", 9)];
        sort_timeslots(&mut slots);
        let ids: Vec<TimeslotId> = slots.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn index_registers_global_assignments_under_the_request_term() {
        let rows = vec![assignment(10, 1, 2, 3, None)];
        let index = assignment_index(&rows, "2025-T1");
        assert_eq!(index.get(&(1, 2, 3, "2025-T1".to_string())), Some(&10));
        // Nothing is registered under the stored NULL term.
        assert_eq!(index.get(&(1, 2, 3, String::new())), None);
    }

    #[test]
    fn concrete_term_assignment_wins_over_global() {
        let rows = vec![
            assignment(10, 1, 2, 3, Some("2025-T1")),
            assignment(11, 1, 2, 3, None),
        ];
        let index = assignment_index(&rows, "2025-T1");
        assert_eq!(index.get(&(1, 2, 3, "2025-T1".to_string())), Some(&10));

        // Same outcome regardless of row order.
        let rows = vec![
            assignment(11, 1, 2, 3, None),
            assignment(10, 1, 2, 3, Some("2025-T1")),
        ];
        let index = assignment_index(&rows, "2025-T1");
        assert_eq!(index.get(&(1, 2, 3, "2025-T1".to_string())), Some(&10));
    }

    #[test]
    fn unknown_key_is_a_miss() {
        let rows = vec![assignment(10, 1, 2, 3, Some("2025-T1"))];
        let index = assignment_index(&rows, "2025-T1");
        assert_eq!(index.get(&(9, 9, 9, "2025-T1".to_string())), None);
    }
}
