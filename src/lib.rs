// # Timetabler: Lesson-Scheduling Solve Orchestration
//
// This crate turns relational scheduling data (teachers, subjects, rooms,
// groups, teaching assignments, time slots, parallel-group pairings) into a
// self-contained input document for an external timetable solver, submits it
// over HTTP, and persists the returned lesson placements as a new schedule.
//
// The crate is modular and uses feature flags (`reqwest`, `tokio`, `mysql`,
// `actix-web`) to enable the solver client, the database layer, and the web
// server independently.

/// Shared HTTP client. Enabled with the `reqwest` feature.
#[cfg(feature = "reqwest")]
pub mod client;

/// WWW server implementation. Enabled with the `actix-web`, `tokio`,
/// `reqwest` and `mysql` features.
#[cfg(all(
    feature = "actix-web",
    feature = "tokio",
    feature = "reqwest",
    feature = "mysql"
))]
pub mod www;

/// SQL database interaction utilities. Enabled with the `mysql` feature.
#[cfg(feature = "mysql")]
pub mod sql;

/// Defensive decoding of stored teacher-unavailability data.
pub mod availability;

/// Undirected parallel-group adjacency built from directed edge rows.
pub mod parallels;

/// Relational projections: row types, bulk loads and the assignment-key index.
pub mod store;

/// Client for the external timetable solver service.
/// Wire types are always available; the gateway call needs the `reqwest` feature.
pub mod api;

/// Assembly of the solver input document from loaded projections.
pub mod assemble;

/// Validation of solver results and atomic persistence of schedules.
pub mod persist;

/// The solve pipeline: relational reads, one solver call, one write transaction.
#[cfg(all(feature = "mysql", feature = "reqwest"))]
pub mod solve;
