//! # Solver Service Client
//!
//! Wire contract for the external timetable solver and the single gateway
//! call that submits an assembled input document to it.
//!
//! The gateway does exactly one request/response exchange: no retries, no
//! streaming, no reinterpretation of the result. A non-success status or a
//! transport failure surfaces verbatim to the caller; the response body of
//! a successful call is returned as raw JSON and validated downstream by
//! the reconciler.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::availability::Unavailability;
use crate::store::{AssignmentId, GroupId, RoomId, SubjectId, TeacherId, TimeslotId};

/// Default endpoint of the solver service.
#[cfg(feature = "reqwest")]
const SOLVER_API_URL: &str = "http://localhost:8000/solve";

/// Default gateway timeout in milliseconds. Deliberately larger than the
/// default in-document solver time limit (15 s), so a solver that uses its
/// whole budget still gets its answer delivered.
#[cfg(feature = "reqwest")]
const SOLVER_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeslotIn {
    pub id: TimeslotId,
    pub day: String,
    pub index: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomIn {
    pub id: RoomId,
    pub name: String,
    pub capacity: i64,
    pub room_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherIn {
    pub id: TeacherId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hours_per_week: Option<i64>,
    pub unavailable: Vec<Unavailability>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectIn {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    /// Required room category, passed through unchanged; the solver filters
    /// eligible rooms, this layer never does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_room_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupIn {
    pub id: GroupId,
    pub name: String,
    pub size: i64,
    pub parallel_with_ids: Vec<GroupId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentIn {
    pub id: AssignmentId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub group_id: GroupId,
    pub required_periods: i64,
}

/// Fully-merged solver configuration as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    pub subject_per_day_limit: i64,
    pub avoid_first_period: bool,
    pub avoid_last_period: bool,
    pub avoid_indices: Vec<i64>,
    pub solver_time_limit_sec: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    pub parallel_policy: String,
}

/// Caller-supplied configuration overrides. Every field is optional; a field
/// overrides its default only when present, so an explicit `false` is
/// honored rather than treated as unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfigPatch {
    pub subject_per_day_limit: Option<i64>,
    pub avoid_first_period: Option<bool>,
    pub avoid_last_period: Option<bool>,
    pub avoid_indices: Option<Vec<i64>>,
    pub solver_time_limit_sec: Option<u64>,
    pub random_seed: Option<u64>,
    pub parallel_policy: Option<String>,
}

/// The complete, self-contained solver input document. The gateway needs no
/// further lookups to interpret it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveInput {
    pub term: String,
    pub timeslots: Vec<TimeslotIn>,
    pub rooms: Vec<RoomIn>,
    pub teachers: Vec<TeacherIn>,
    pub subjects: Vec<SubjectIn>,
    pub groups: Vec<GroupIn>,
    pub assignments: Vec<AssignmentIn>,
    pub config: SolverConfig,
}

/// One placed occurrence as reported by the solver. The solver names plain
/// identifiers; provenance (the originating assignment) is resolved by the
/// reconciler, never trusted from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOut {
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub group_id: GroupId,
    pub room_id: RoomId,
    pub timeslot_id: TimeslotId,
}

/// Resolves the solver endpoint, `SOLVER_API_URL` env first.
#[cfg(feature = "reqwest")]
fn endpoint() -> String {
    std::env::var("SOLVER_API_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| SOLVER_API_URL.to_string())
}

/// Resolves the gateway timeout, `SOLVER_TIMEOUT_MS` env first. This bounds
/// the whole network call and is independent of the solver's own
/// `solverTimeLimitSec` carried inside the input document.
#[cfg(feature = "reqwest")]
fn request_timeout() -> std::time::Duration {
    let ms = std::env::var("SOLVER_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(SOLVER_TIMEOUT_MS);
    std::time::Duration::from_millis(ms)
}

/// POST the input document to the solver and return its result document as
/// received. One attempt; a timeout, transport failure or non-success
/// status is an error carrying the solver's status and body.
#[cfg(feature = "reqwest")]
pub async fn solve(input: &SolveInput) -> Result<serde_json::Value> {
    let client = &*crate::client::CLIENT;
    let url = endpoint();

    let res = client
        .post(&url)
        .json(input)
        .timeout(request_timeout())
        .send()
        .await
        .with_context(|| format!("Failed to POST solve request to {}", url))?;

    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("solver returned {}: {}", status, body);
    }

    res.json().await.context("Failed to parse solver response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_document_uses_the_wire_field_names() {
        let input = SolveInput {
            term: "2025-T1".to_string(),
            timeslots: vec![TimeslotIn {
                id: 1,
                day: "MON".to_string(),
                index: 1,
            }],
            rooms: vec![RoomIn {
                id: 2,
                name: "Lab-A".to_string(),
                capacity: 30,
                room_type: "LAB".to_string(),
            }],
            teachers: vec![TeacherIn {
                id: 3,
                name: "Alice".to_string(),
                max_hours_per_week: None,
                unavailable: vec![],
            }],
            subjects: vec![SubjectIn {
                id: 4,
                code: "CS102".to_string(),
                name: "Intro Programming".to_string(),
                requires_room_type: Some("LAB".to_string()),
            }],
            groups: vec![GroupIn {
                id: 5,
                name: "CPE1".to_string(),
                size: 35,
                parallel_with_ids: vec![6],
            }],
            assignments: vec![AssignmentIn {
                id: 7,
                subject_id: 4,
                teacher_id: 3,
                group_id: 5,
                required_periods: 3,
            }],
            config: SolverConfig {
                subject_per_day_limit: 1,
                avoid_first_period: true,
                avoid_last_period: true,
                avoid_indices: vec![],
                solver_time_limit_sec: 15,
                random_seed: None,
                parallel_policy: "BLOCK".to_string(),
            },
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["term"], "2025-T1");
        assert_eq!(json["subjects"][0]["requiresRoomType"], "LAB");
        assert_eq!(json["rooms"][0]["roomType"], "LAB");
        assert_eq!(json["groups"][0]["parallelWithIds"][0], 6);
        assert_eq!(json["assignments"][0]["requiredPeriods"], 3);
        assert_eq!(json["config"]["subjectPerDayLimit"], 1);
        assert_eq!(json["config"]["parallelPolicy"], "BLOCK");
        // Absent optionals are omitted, not serialized as null.
        assert!(json["teachers"][0].get("maxHoursPerWeek").is_none());
        assert!(json["config"].get("randomSeed").is_none());
    }

    #[test]
    fn lesson_out_decodes_from_solver_json() {
        let lesson: LessonOut = serde_json::from_value(serde_json::json!({
            "subjectId": 4, "teacherId": 3, "groupId": 5, "roomId": 2, "timeslotId": 1
        }))
        .unwrap();
        assert_eq!(
            lesson,
            LessonOut {
                subject_id: 4,
                teacher_id: 3,
                group_id: 5,
                room_id: 2,
                timeslot_id: 1
            }
        );
    }
}
