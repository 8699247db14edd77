use sqlx::PgExecutor;
use uuid::Uuid;

use studiosync_core::models::substitute::SubstituteRequest;

use crate::models::DbSubstituteRequest;

const REQUEST_COLUMNS: &str = "id, absence_id, lesson_id, original_teacher_id, \
    substitute_teacher_id, student_id, room_id, instrument, lesson_date, start_time, end_time, \
    status, broadcast_group_id, approved_by_id, approved_at, notes, created_at, updated_at";

pub async fn get_substitute_request<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> sqlx::Result<Option<DbSubstituteRequest>> {
    sqlx::query_as::<_, DbSubstituteRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM substitute_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn requests_for_lesson<'e, E: PgExecutor<'e>>(
    executor: E,
    lesson_id: Uuid,
) -> sqlx::Result<Vec<DbSubstituteRequest>> {
    sqlx::query_as::<_, DbSubstituteRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM substitute_requests WHERE lesson_id = $1 ORDER BY created_at"
    ))
    .bind(lesson_id)
    .fetch_all(executor)
    .await
}

pub async fn requests_for_absence<'e, E: PgExecutor<'e>>(
    executor: E,
    absence_id: Uuid,
) -> sqlx::Result<Vec<DbSubstituteRequest>> {
    sqlx::query_as::<_, DbSubstituteRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM substitute_requests WHERE absence_id = $1 ORDER BY created_at"
    ))
    .bind(absence_id)
    .fetch_all(executor)
    .await
}

pub async fn insert_substitute_request<'e, E: PgExecutor<'e>>(
    executor: E,
    request: &SubstituteRequest,
) -> sqlx::Result<()> {
    sqlx::query(&format!(
        r#"
        INSERT INTO substitute_requests ({REQUEST_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        "#
    ))
    .bind(request.id)
    .bind(request.absence_id)
    .bind(request.lesson_id)
    .bind(request.original_teacher_id)
    .bind(request.substitute_teacher_id)
    .bind(request.student_id)
    .bind(request.room_id)
    .bind(&request.instrument)
    .bind(request.lesson_date)
    .bind(request.start_time.to_naive_time())
    .bind(request.end_time.to_naive_time())
    .bind(request.status.as_str())
    .bind(request.broadcast_group_id)
    .bind(request.approved_by_id)
    .bind(request.approved_at)
    .bind(&request.notes)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Only the mutable parts of a request are written back.
pub async fn update_substitute_request<'e, E: PgExecutor<'e>>(
    executor: E,
    request: &SubstituteRequest,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE substitute_requests
        SET status = $2, approved_by_id = $3, approved_at = $4, notes = $5, updated_at = $6
        WHERE id = $1
        "#,
    )
    .bind(request.id)
    .bind(request.status.as_str())
    .bind(request.approved_by_id)
    .bind(request.approved_at)
    .bind(&request.notes)
    .bind(request.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}
