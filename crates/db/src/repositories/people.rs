use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{DbRoom, DbStudentProfile, DbTeacherProfile};

pub async fn get_room<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<DbRoom>> {
    sqlx::query_as::<_, DbRoom>("SELECT id, name, is_active FROM rooms WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create_room<'e, E: PgExecutor<'e>>(executor: E, name: &str) -> sqlx::Result<DbRoom> {
    sqlx::query_as::<_, DbRoom>(
        r#"
        INSERT INTO rooms (id, name, is_active)
        VALUES ($1, $2, TRUE)
        RETURNING id, name, is_active
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(executor)
    .await
}

pub async fn get_teacher<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> sqlx::Result<Option<DbTeacherProfile>> {
    sqlx::query_as::<_, DbTeacherProfile>(
        r#"
        SELECT id, user_id, display_name, instruments, is_active
        FROM teacher_profiles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_teacher<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    display_name: &str,
    instruments: &[String],
) -> sqlx::Result<DbTeacherProfile> {
    sqlx::query_as::<_, DbTeacherProfile>(
        r#"
        INSERT INTO teacher_profiles (id, user_id, display_name, instruments, is_active)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING id, user_id, display_name, instruments, is_active
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(display_name)
    .bind(instruments)
    .fetch_one(executor)
    .await
}

/// Active teachers listing `instrument`, ordered by name.
pub async fn teachers_for_instrument<'e, E: PgExecutor<'e>>(
    executor: E,
    instrument: &str,
) -> sqlx::Result<Vec<DbTeacherProfile>> {
    sqlx::query_as::<_, DbTeacherProfile>(
        r#"
        SELECT id, user_id, display_name, instruments, is_active
        FROM teacher_profiles
        WHERE is_active AND $1 = ANY(instruments)
        ORDER BY display_name
        "#,
    )
    .bind(instrument)
    .fetch_all(executor)
    .await
}

pub async fn get_student<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> sqlx::Result<Option<DbStudentProfile>> {
    sqlx::query_as::<_, DbStudentProfile>(
        "SELECT id, user_id, display_name, instruments FROM student_profiles WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_student<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    display_name: &str,
    instruments: &[String],
) -> sqlx::Result<DbStudentProfile> {
    sqlx::query_as::<_, DbStudentProfile>(
        r#"
        INSERT INTO student_profiles (id, user_id, display_name, instruments)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, display_name, instruments
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(display_name)
    .bind(instruments)
    .fetch_one(executor)
    .await
}
