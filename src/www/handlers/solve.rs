//! # Solve Trigger Handler
//!
//! `POST /api/solve` runs the whole pipeline for one term: relational
//! reads, the external solver call, and the transactional write. The
//! response is a single user-visible outcome (success with counts, or
//! failure with one message) with no lesson-level partial reporting.

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;

use crate::api::SolverConfigPatch;
use crate::assemble;
use crate::persist::SolveError;
use crate::solve::run_solve;

/// The inbound trigger: an optional term and optional partial solver
/// configuration.
#[derive(Debug, Default, Deserialize)]
pub struct SolveRequest {
    pub term: Option<String>,
    pub config: Option<SolverConfigPatch>,
}

/// Handles `POST /api/solve`.
///
/// The body is parsed leniently: an empty or malformed body degrades to the
/// default term with default configuration instead of failing the request.
pub async fn post(body: web::Bytes) -> impl Responder {
    let request: SolveRequest = serde_json::from_slice(&body).unwrap_or_default();
    let term = request
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(assemble::DEFAULT_TERM)
        .to_string();
    let patch = request.config.unwrap_or_default();

    match run_solve(&term, &patch).await {
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "ok": true,
            "scheduleId": outcome.schedule_id,
            "count": outcome.lesson_count,
            "objectiveScore": outcome.objective_score,
            "notes": outcome.notes,
        })),
        Err(e) => match e.downcast_ref::<SolveError>() {
            // The solver answered but produced nothing persistable: a
            // rejected solve, reported with the solver's own notes.
            Some(SolveError::NoLessons { notes }) => {
                log::warn!("solve[{}]: rejected, solver returned no lessons", term);
                HttpResponse::BadRequest().json(json!({
                    "ok": false,
                    "error": "Solver returned no lessons - check constraints and input data",
                    "notes": notes,
                }))
            }
            // Transport, validation or storage failure: surfaced verbatim.
            None => {
                log::error!("solve[{}]: failed: {:#}", term, e);
                HttpResponse::InternalServerError().json(json!({
                    "ok": false,
                    "error": format!("{:#}", e),
                }))
            }
        },
    }
}
