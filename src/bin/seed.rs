//! Seeds the database with a small, self-consistent data set: a working
//! week of timeslots, two teachers, two subjects, three rooms, two parallel
//! groups and their teaching assignments. Every write is an upsert, so the
//! seeder can be re-run safely.

use anyhow::{Context, Result};
use mysql::params;

use timetabler::assemble::DEFAULT_TERM;
use timetabler::sql;

const DAYS: [&str; 5] = ["MON", "TUE", "WED", "THU", "FRI"];

const TIMES: [(&str, &str); 6] = [
    ("08:00", "08:50"),
    ("09:00", "09:50"),
    ("10:00", "10:50"),
    ("11:00", "11:50"),
    ("13:00", "13:50"),
    ("14:00", "14:50"),
];

fn upsert_teacher(
    name: &str,
    dept: &str,
    max_hours: Option<i64>,
    unavailable: Option<&str>,
) -> Result<i64> {
    sql::exec(
        r#"
        INSERT INTO teachers (teacher_name, teacher_dept, teacher_max_hours, teacher_unavailable)
        VALUES (:name, :dept, :max_hours, :unavailable)
        ON DUPLICATE KEY UPDATE teacher_id = teacher_id
        "#,
        params! { "name" => name, "dept" => dept, "max_hours" => max_hours, "unavailable" => unavailable },
    )?;
    sql::cell(
        "SELECT teacher_id FROM teachers WHERE teacher_name = :name",
        params! { "name" => name },
    )?
    .with_context(|| format!("teacher {} not found after upsert", name))
}

fn upsert_subject(code: &str, name: &str, periods: i64, room_type: Option<&str>) -> Result<i64> {
    sql::exec(
        r#"
        INSERT INTO subjects (subject_code, subject_name, subject_periods_per_week, subject_room_type)
        VALUES (:code, :name, :periods, :room_type)
        ON DUPLICATE KEY UPDATE subject_id = subject_id
        "#,
        params! { "code" => code, "name" => name, "periods" => periods, "room_type" => room_type },
    )?;
    sql::cell(
        "SELECT subject_id FROM subjects WHERE subject_code = :code",
        params! { "code" => code },
    )?
    .with_context(|| format!("subject {} not found after upsert", code))
}

fn upsert_room(name: &str, capacity: i64, room_type: &str) -> Result<()> {
    sql::exec(
        r#"
        INSERT INTO rooms (room_name, room_capacity, room_type)
        VALUES (:name, :capacity, :room_type)
        ON DUPLICATE KEY UPDATE room_id = room_id
        "#,
        params! { "name" => name, "capacity" => capacity, "room_type" => room_type },
    )?;
    Ok(())
}

fn upsert_group(name: &str, dept: &str, level: i64, size: i64) -> Result<i64> {
    sql::exec(
        r#"
        INSERT INTO student_groups (group_name, group_dept, group_level, group_size)
        VALUES (:name, :dept, :level, :size)
        ON DUPLICATE KEY UPDATE group_id = group_id
        "#,
        params! { "name" => name, "dept" => dept, "level" => level, "size" => size },
    )?;
    sql::cell(
        "SELECT group_id FROM student_groups WHERE group_name = :name",
        params! { "name" => name },
    )?
    .with_context(|| format!("group {} not found after upsert", name))
}

fn upsert_assignment(subject_id: i64, teacher_id: i64, group_id: i64, periods: i64) -> Result<()> {
    // Seeded assignments are global (NULL term): they apply to every term.
    sql::exec(
        r#"
        INSERT INTO teaching_assignments
            (subject_id, teacher_id, group_id, assignment_term, assignment_required_periods)
        VALUES (:subject_id, :teacher_id, :group_id, NULL, :periods)
        ON DUPLICATE KEY UPDATE assignment_id = assignment_id
        "#,
        params! {
            "subject_id" => subject_id,
            "teacher_id" => teacher_id,
            "group_id" => group_id,
            "periods" => periods,
        },
    )?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let timeslots = DAYS.iter().copied().flat_map(|day| {
        TIMES
            .iter()
            .enumerate()
            .map(move |(i, &(start, end))| (day, i as i64 + 1, start, end))
    });
    sql::exec_batch(
        r#"
        INSERT INTO timeslots (timeslot_day, timeslot_index, timeslot_start, timeslot_end)
        VALUES (:day, :index, :start, :end)
        ON DUPLICATE KEY UPDATE timeslot_id = timeslot_id
        "#,
        timeslots.map(|(day, index, start, end)| {
            params! { "day" => day, "index" => index, "start" => start, "end" => end }
        }),
    )?;

    let alice = upsert_teacher(
        "Alice",
        "Math",
        Some(10),
        Some(r#"[{"day":"MON","slotIndexes":[1]}]"#),
    )?;
    let bob = upsert_teacher("Bob", "CS", Some(12), None)?;

    let math = upsert_subject("MATH101", "Calculus I", 3, Some("LECTURE"))?;
    let prog = upsert_subject("CS102", "Intro Programming", 3, Some("LAB"))?;

    upsert_room("R-101", 40, "LECTURE")?;
    upsert_room("Lab-A", 30, "LAB")?;
    upsert_room("R-102", 50, "LECTURE")?;

    let cpe1 = upsert_group("CPE1", "CPE", 1, 35)?;
    let cpe2 = upsert_group("CPE2", "CPE", 1, 32)?;

    upsert_assignment(math, alice, cpe1, 3)?;
    upsert_assignment(prog, bob, cpe1, 3)?;
    upsert_assignment(prog, bob, cpe2, 3)?;

    // CPE1 and CPE2 must never share a time slot in the default term.
    sql::exec(
        r#"
        INSERT INTO group_parallels (group_parallel_term, group_a_id, group_b_id)
        SELECT :term, :a, :b FROM DUAL
        WHERE NOT EXISTS (
            SELECT 1 FROM group_parallels
            WHERE group_parallel_term = :term AND group_a_id = :a AND group_b_id = :b
        )
        "#,
        params! { "term" => DEFAULT_TERM, "a" => cpe1, "b" => cpe2 },
    )?;

    println!("Seed complete.");
    Ok(())
}
