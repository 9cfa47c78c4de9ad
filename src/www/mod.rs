//! # Web Server Implementation
//!
//! The timetabler web layer: a dashboard, read-only schedule pages, and the
//! `/api/solve` endpoint that triggers a solve run.
//!
//! ## Submodules
//! - `handlers`: request handlers for the individual routes.

/// Request handlers for the web server's routes.
pub mod handlers;
