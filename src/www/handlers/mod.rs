//! Route handlers: dashboard, schedule pages and the solve trigger.

pub mod schedule;
pub mod solve;
pub mod template;

use actix_web::Responder;
use anyhow::Result;
use chrono::NaiveDateTime;

use crate::sql;
use crate::www::handlers::template::escape_html;

/// GET /: the dashboard with entity counts and the latest schedules.
pub async fn index() -> impl Responder {
    template::to_response(render_dashboard().await)
}

async fn render_dashboard() -> Result<String> {
    let schedule_count: i64 = sql::cell("SELECT COUNT(*) FROM schedules", ())?.unwrap_or(0);
    let lesson_count: i64 = sql::cell("SELECT COUNT(*) FROM lessons", ())?.unwrap_or(0);
    let assignment_count: i64 =
        sql::cell("SELECT COUNT(*) FROM teaching_assignments", ())?.unwrap_or(0);

    let rows = sql::select(
        r#"
        SELECT s.schedule_id, s.schedule_term, s.schedule_created,
               COUNT(l.lesson_id) AS lesson_count
        FROM schedules s
        LEFT JOIN lessons l ON l.schedule_id = s.schedule_id
        GROUP BY s.schedule_id, s.schedule_term, s.schedule_created
        ORDER BY s.schedule_id DESC
        LIMIT 10
        "#,
        (),
    )?;

    let mut html = String::new();
    html.push_str("<h1>Timetabler</h1>\n");
    html.push_str(&format!(
        "<p>{} schedules, {} lessons, {} teaching assignments. \
         Trigger a solve with <code>POST /api/solve</code>.</p>\n",
        schedule_count, lesson_count, assignment_count
    ));

    html.push_str("<h2>Latest schedules</h2>\n");
    html.push_str("<table class=\"table\">\n");
    html.push_str("<tr><th>Schedule</th><th>Term</th><th>Lessons</th><th>Created</th></tr>\n");
    for r in &rows {
        let schedule_id: i64 = r.get("schedule_id")?;
        let term: String = r.get("schedule_term")?;
        let created: NaiveDateTime = r.get("schedule_created")?;
        let lessons: i64 = r.get("lesson_count")?;
        html.push_str(&format!(
            "<tr><td><a href=\"/schedule?schedule_id={}\">#{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            schedule_id,
            schedule_id,
            escape_html(&term),
            lessons,
            created.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    if rows.is_empty() {
        html.push_str("<tr><td colspan=\"4\">No schedules yet.</td></tr>\n");
    }
    html.push_str("</table>\n");
    Ok(html)
}
