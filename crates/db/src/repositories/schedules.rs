use sqlx::PgExecutor;
use uuid::Uuid;

use studiosync_core::conflict::ResourceKind;
use studiosync_core::models::schedule::RecurringSchedule;

use super::lane_column;
use crate::models::DbRecurringSchedule;

const SCHEDULE_COLUMNS: &str = "id, teacher_id, student_id, room_id, instrument, day_of_week, \
    start_time, end_time, duration, effective_from, effective_until, is_active, created_at";

pub async fn get_schedule<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> sqlx::Result<Option<DbRecurringSchedule>> {
    sqlx::query_as::<_, DbRecurringSchedule>(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM recurring_schedules WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn active_schedules_on<'e, E: PgExecutor<'e>>(
    executor: E,
    kind: ResourceKind,
    resource_id: Uuid,
    day_of_week: i16,
) -> sqlx::Result<Vec<DbRecurringSchedule>> {
    sqlx::query_as::<_, DbRecurringSchedule>(&format!(
        r#"
        SELECT {SCHEDULE_COLUMNS}
        FROM recurring_schedules
        WHERE {column} = $1 AND day_of_week = $2 AND is_active
        ORDER BY start_time
        "#,
        column = lane_column(kind),
    ))
    .bind(resource_id)
    .bind(day_of_week)
    .fetch_all(executor)
    .await
}

pub async fn insert_schedule<'e, E: PgExecutor<'e>>(
    executor: E,
    schedule: &RecurringSchedule,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recurring_schedules (
            id, teacher_id, student_id, room_id, instrument, day_of_week,
            start_time, end_time, duration, effective_from, effective_until, is_active, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(schedule.id)
    .bind(schedule.teacher_id)
    .bind(schedule.student_id)
    .bind(schedule.room_id)
    .bind(&schedule.instrument)
    .bind(schedule.day_of_week)
    .bind(schedule.start_time.to_naive_time())
    .bind(schedule.end_time.to_naive_time())
    .bind(schedule.duration)
    .bind(schedule.effective_from)
    .bind(schedule.effective_until)
    .bind(schedule.is_active)
    .bind(schedule.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update_schedule<'e, E: PgExecutor<'e>>(
    executor: E,
    schedule: &RecurringSchedule,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE recurring_schedules
        SET teacher_id = $2, student_id = $3, room_id = $4, instrument = $5, day_of_week = $6,
            start_time = $7, end_time = $8, duration = $9,
            effective_from = $10, effective_until = $11, is_active = $12
        WHERE id = $1
        "#,
    )
    .bind(schedule.id)
    .bind(schedule.teacher_id)
    .bind(schedule.student_id)
    .bind(schedule.room_id)
    .bind(&schedule.instrument)
    .bind(schedule.day_of_week)
    .bind(schedule.start_time.to_naive_time())
    .bind(schedule.end_time.to_naive_time())
    .bind(schedule.duration)
    .bind(schedule.effective_from)
    .bind(schedule.effective_until)
    .bind(schedule.is_active)
    .execute(executor)
    .await?;
    Ok(())
}
