use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

use studiosync_core::models::absence::TeacherAbsence;

use crate::models::DbTeacherAbsence;

pub async fn get_absence<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> sqlx::Result<Option<DbTeacherAbsence>> {
    sqlx::query_as::<_, DbTeacherAbsence>(
        r#"
        SELECT id, teacher_id, start_date, end_date, reason, status, reported_by_id, created_at
        FROM teacher_absences
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Absences of the teacher that include `date` and were not withdrawn.
pub async fn absences_covering<'e, E: PgExecutor<'e>>(
    executor: E,
    teacher_id: Uuid,
    date: NaiveDate,
) -> sqlx::Result<Vec<DbTeacherAbsence>> {
    sqlx::query_as::<_, DbTeacherAbsence>(
        r#"
        SELECT id, teacher_id, start_date, end_date, reason, status, reported_by_id, created_at
        FROM teacher_absences
        WHERE teacher_id = $1 AND start_date <= $2 AND end_date >= $2 AND status <> 'cancelled'
        ORDER BY start_date
        "#,
    )
    .bind(teacher_id)
    .bind(date)
    .fetch_all(executor)
    .await
}

pub async fn insert_absence<'e, E: PgExecutor<'e>>(
    executor: E,
    absence: &TeacherAbsence,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO teacher_absences (
            id, teacher_id, start_date, end_date, reason, status, reported_by_id, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(absence.id)
    .bind(absence.teacher_id)
    .bind(absence.start_date)
    .bind(absence.end_date)
    .bind(&absence.reason)
    .bind(absence.status.as_str())
    .bind(absence.reported_by_id)
    .bind(absence.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update_absence<'e, E: PgExecutor<'e>>(
    executor: E,
    absence: &TeacherAbsence,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE teacher_absences
        SET start_date = $2, end_date = $3, reason = $4, status = $5
        WHERE id = $1
        "#,
    )
    .bind(absence.id)
    .bind(absence.start_date)
    .bind(absence.end_date)
    .bind(&absence.reason)
    .bind(absence.status.as_str())
    .execute(executor)
    .await?;
    Ok(())
}
