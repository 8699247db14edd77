use chrono::NaiveDate;
use sqlx::PgExecutor;
use tracing::debug;
use uuid::Uuid;

use studiosync_core::conflict::ResourceKind;
use studiosync_core::models::lesson::{Lesson, LessonFilter};

use super::lane_column;
use crate::models::DbLesson;

const LESSON_COLUMNS: &str = "id, teacher_id, student_id, room_id, schedule_id, instrument, date, \
    start_time, end_time, duration, status, cancellation_reason, cancelled_by_id, \
    teacher_check_in, teacher_check_out, student_check_in, student_check_out, \
    created_at, updated_at";

pub async fn get_lesson<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<DbLesson>> {
    sqlx::query_as::<_, DbLesson>(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Reads the lesson and holds a row lock on it until the transaction ends.
pub async fn lock_lesson<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<DbLesson>> {
    sqlx::query_as::<_, DbLesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn active_lessons_on<'e, E: PgExecutor<'e>>(
    executor: E,
    kind: ResourceKind,
    resource_id: Uuid,
    date: NaiveDate,
) -> sqlx::Result<Vec<DbLesson>> {
    debug!(%kind, %resource_id, %date, "loading lane");
    sqlx::query_as::<_, DbLesson>(&format!(
        r#"
        SELECT {LESSON_COLUMNS}
        FROM lessons
        WHERE {column} = $1 AND date = $2 AND status <> 'cancelled'
        ORDER BY start_time
        "#,
        column = lane_column(kind),
    ))
    .bind(resource_id)
    .bind(date)
    .fetch_all(executor)
    .await
}

pub async fn lesson_exists<'e, E: PgExecutor<'e>>(
    executor: E,
    schedule_id: Uuid,
    teacher_id: Uuid,
    student_id: Uuid,
    room_id: Uuid,
    date: NaiveDate,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM lessons
            WHERE date = $5
              AND (schedule_id = $1
                   OR (teacher_id = $2 AND student_id = $3 AND room_id = $4))
        )
        "#,
    )
    .bind(schedule_id)
    .bind(teacher_id)
    .bind(student_id)
    .bind(room_id)
    .bind(date)
    .fetch_one(executor)
    .await
}

pub async fn find_lessons<'e, E: PgExecutor<'e>>(
    executor: E,
    filter: &LessonFilter,
) -> sqlx::Result<Vec<DbLesson>> {
    sqlx::query_as::<_, DbLesson>(&format!(
        r#"
        SELECT {LESSON_COLUMNS}
        FROM lessons
        WHERE ($1::uuid IS NULL OR teacher_id = $1)
          AND ($2::uuid IS NULL OR student_id = $2)
          AND ($3::uuid IS NULL OR room_id = $3)
          AND date BETWEEN $4 AND $5
          AND ($6::text IS NULL OR status = $6)
        ORDER BY date, start_time
        "#
    ))
    .bind(filter.teacher_id)
    .bind(filter.student_id)
    .bind(filter.room_id)
    .bind(filter.from)
    .bind(filter.until)
    .bind(filter.status.map(|s| s.as_str()))
    .fetch_all(executor)
    .await
}

pub async fn completed_lesson_count<'e, E: PgExecutor<'e>>(
    executor: E,
    teacher_id: Uuid,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM lessons WHERE teacher_id = $1 AND status = 'completed'",
    )
    .bind(teacher_id)
    .fetch_one(executor)
    .await
}

pub async fn insert_lesson<'e, E: PgExecutor<'e>>(executor: E, lesson: &Lesson) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO lessons (
            id, teacher_id, student_id, room_id, schedule_id, instrument, date,
            start_time, end_time, duration, status, cancellation_reason, cancelled_by_id,
            teacher_check_in, teacher_check_out, student_check_in, student_check_out,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        "#,
    )
    .bind(lesson.id)
    .bind(lesson.teacher_id)
    .bind(lesson.student_id)
    .bind(lesson.room_id)
    .bind(lesson.schedule_id)
    .bind(&lesson.instrument)
    .bind(lesson.date)
    .bind(lesson.start_time.to_naive_time())
    .bind(lesson.end_time.to_naive_time())
    .bind(lesson.duration)
    .bind(lesson.status.as_str())
    .bind(&lesson.cancellation_reason)
    .bind(lesson.cancelled_by_id)
    .bind(lesson.teacher_check_in)
    .bind(lesson.teacher_check_out)
    .bind(lesson.student_check_in)
    .bind(lesson.student_check_out)
    .bind(lesson.created_at)
    .bind(lesson.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update_lesson<'e, E: PgExecutor<'e>>(executor: E, lesson: &Lesson) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE lessons
        SET teacher_id = $2, student_id = $3, room_id = $4, instrument = $5, date = $6,
            start_time = $7, end_time = $8, duration = $9, status = $10,
            cancellation_reason = $11, cancelled_by_id = $12,
            teacher_check_in = $13, teacher_check_out = $14,
            student_check_in = $15, student_check_out = $16,
            updated_at = $17
        WHERE id = $1
        "#,
    )
    .bind(lesson.id)
    .bind(lesson.teacher_id)
    .bind(lesson.student_id)
    .bind(lesson.room_id)
    .bind(&lesson.instrument)
    .bind(lesson.date)
    .bind(lesson.start_time.to_naive_time())
    .bind(lesson.end_time.to_naive_time())
    .bind(lesson.duration)
    .bind(lesson.status.as_str())
    .bind(&lesson.cancellation_reason)
    .bind(lesson.cancelled_by_id)
    .bind(lesson.teacher_check_in)
    .bind(lesson.teacher_check_out)
    .bind(lesson.student_check_in)
    .bind(lesson.student_check_out)
    .bind(lesson.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Compare-and-swap on the lesson's teacher. Returns whether a row changed.
pub async fn reassign_teacher<'e, E: PgExecutor<'e>>(
    executor: E,
    lesson_id: Uuid,
    expected_teacher: Uuid,
    new_teacher: Uuid,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE lessons
        SET teacher_id = $3, updated_at = NOW()
        WHERE id = $1 AND teacher_id = $2 AND status = 'scheduled'
        "#,
    )
    .bind(lesson_id)
    .bind(expected_teacher)
    .bind(new_teacher)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}
