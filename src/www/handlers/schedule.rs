//! Read-only schedule pages: the full list and one schedule's lessons.

use actix_web::{Responder, web};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use itertools::Itertools;
use mysql::params;

use crate::store::day_rank;
use crate::www::handlers::template::{self, escape_html};

/// GET /schedules lists every persisted solve attempt, newest first.
pub async fn index() -> impl Responder {
    template::to_response(render_schedules_page().await)
}

async fn render_schedules_page() -> Result<String> {
    let rows = crate::sql::select(
        r#"
        SELECT s.schedule_id, s.schedule_term, s.schedule_created,
               COUNT(l.lesson_id) AS lesson_count
        FROM schedules s
        LEFT JOIN lessons l ON l.schedule_id = s.schedule_id
        GROUP BY s.schedule_id, s.schedule_term, s.schedule_created
        ORDER BY s.schedule_id DESC
        "#,
        (),
    )?;

    let mut html = String::new();
    html.push_str("<h1>Schedules</h1>\n");
    html.push_str("<table class=\"table\">\n");
    html.push_str("<tr><th>Schedule</th><th>Term</th><th>Lessons</th><th>Created</th></tr>\n");
    for r in &rows {
        let schedule_id: i64 = r.get("schedule_id")?;
        let term: String = r.get("schedule_term")?;
        let created: NaiveDateTime = r.get("schedule_created")?;
        let lesson_count: i64 = r.get("lesson_count")?;
        html.push_str(&format!(
            "<tr><td><a href=\"/schedule?schedule_id={}\">#{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            schedule_id,
            schedule_id,
            escape_html(&term),
            lesson_count,
            created.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    html.push_str("</table>\n");
    Ok(html)
}

#[derive(serde::Deserialize)]
pub struct ScheduleQuery {
    pub schedule_id: i64,
}

/// GET /schedule?schedule_id=N shows one schedule with its lessons.
pub async fn show(query: web::Query<ScheduleQuery>) -> impl Responder {
    template::to_response(render_schedule_page(query.schedule_id).await)
}

struct LessonRow {
    group_name: String,
    day: String,
    index: i64,
    start_time: String,
    end_time: String,
    subject_code: String,
    subject_name: String,
    teacher_name: String,
    room_name: String,
    assignment_id: Option<i64>,
}

async fn render_schedule_page(schedule_id: i64) -> Result<String> {
    let header = crate::sql::row(
        "SELECT schedule_term, schedule_notes, schedule_created FROM schedules WHERE schedule_id = :schedule_id",
        params! { "schedule_id" => schedule_id },
    )?
    .context("schedule not found")?;
    let term: String = header.get("schedule_term")?;
    let notes_raw: Option<String> = header.get_option("schedule_notes")?;
    let created: NaiveDateTime = header.get("schedule_created")?;

    // Notes are stored as a JSON array string; fall back to the raw text
    // for rows written by older tooling.
    let notes: Vec<String> = notes_raw
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| notes_raw.clone().into_iter().collect());

    let rows = crate::sql::select(
        r#"
        SELECT g.group_name, t.timeslot_day, t.timeslot_index, t.timeslot_start, t.timeslot_end,
               sub.subject_code, sub.subject_name, te.teacher_name, r.room_name, l.assignment_id
        FROM lessons l
        JOIN student_groups g ON g.group_id = l.group_id
        JOIN timeslots t ON t.timeslot_id = l.timeslot_id
        JOIN subjects sub ON sub.subject_id = l.subject_id
        JOIN teachers te ON te.teacher_id = l.teacher_id
        JOIN rooms r ON r.room_id = l.room_id
        WHERE l.schedule_id = :schedule_id
        "#,
        params! { "schedule_id" => schedule_id },
    )?;

    let mut lessons: Vec<LessonRow> = rows
        .iter()
        .map(|r| {
            Ok(LessonRow {
                group_name: r.get("group_name")?,
                day: r.get("timeslot_day")?,
                index: r.get("timeslot_index")?,
                start_time: r.get("timeslot_start")?,
                end_time: r.get("timeslot_end")?,
                subject_code: r.get("subject_code")?,
                subject_name: r.get("subject_name")?,
                teacher_name: r.get("teacher_name")?,
                room_name: r.get("room_name")?,
                assignment_id: r.get_option("assignment_id")?,
            })
        })
        .collect::<Result<_>>()?;
    lessons.sort_by(|a, b| {
        (a.group_name.as_str(), day_rank(&a.day), a.index)
            .cmp(&(b.group_name.as_str(), day_rank(&b.day), b.index))
    });

    let mut html = String::new();
    html.push_str(&format!(
        "<h1>Schedule #{}</h1>\n<p>Term {}, created {}, {} lessons</p>\n",
        schedule_id,
        escape_html(&term),
        created.format("%Y-%m-%d %H:%M:%S"),
        lessons.len(),
    ));
    if !notes.is_empty() {
        html.push_str(&format!(
            "<p>Solver notes: {}</p>\n",
            escape_html(&notes.iter().join("; "))
        ));
    }

    html.push_str("<table class=\"table\">\n");
    html.push_str(
        "<tr><th>Group</th><th>Day</th><th>Period</th><th>Time</th><th>Subject</th><th>Teacher</th><th>Room</th><th>Assignment</th></tr>\n",
    );
    for l in &lessons {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}&ndash;{}</td><td>{} {}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&l.group_name),
            escape_html(&l.day),
            l.index,
            escape_html(&l.start_time),
            escape_html(&l.end_time),
            escape_html(&l.subject_code),
            escape_html(&l.subject_name),
            escape_html(&l.teacher_name),
            escape_html(&l.room_name),
            l.assignment_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    html.push_str("</table>\n");
    Ok(html)
}
