use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL UNIQUE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teacher_profiles (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL UNIQUE,
            display_name VARCHAR(255) NOT NULL,
            instruments TEXT[] NOT NULL DEFAULT '{}',
            is_active BOOLEAN NOT NULL DEFAULT TRUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS student_profiles (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL UNIQUE,
            display_name VARCHAR(255) NOT NULL,
            instruments TEXT[] NOT NULL DEFAULT '{}'
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lessons (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            teacher_id UUID NOT NULL REFERENCES teacher_profiles(id),
            student_id UUID NOT NULL REFERENCES student_profiles(id),
            room_id UUID NOT NULL REFERENCES rooms(id),
            schedule_id UUID NULL,
            instrument VARCHAR(100) NOT NULL,
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            duration INTEGER NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'scheduled',
            cancellation_reason TEXT NULL,
            cancelled_by_id UUID NULL,
            teacher_check_in TIMESTAMP WITH TIME ZONE NULL,
            teacher_check_out TIMESTAMP WITH TIME ZONE NULL,
            student_check_in TIMESTAMP WITH TIME ZONE NULL,
            student_check_out TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_lesson_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recurring_schedules (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            teacher_id UUID NOT NULL REFERENCES teacher_profiles(id),
            student_id UUID NOT NULL REFERENCES student_profiles(id),
            room_id UUID NOT NULL REFERENCES rooms(id),
            instrument VARCHAR(100) NOT NULL,
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            duration INTEGER NOT NULL,
            effective_from DATE NOT NULL,
            effective_until DATE NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_schedule_range CHECK (end_time > start_time),
            CONSTRAINT valid_day_of_week CHECK (day_of_week BETWEEN 0 AND 6)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teacher_absences (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            teacher_id UUID NOT NULL REFERENCES teacher_profiles(id),
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            reason TEXT NOT NULL DEFAULT '',
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            reported_by_id UUID NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_absence_range CHECK (end_date >= start_date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS substitute_requests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            absence_id UUID NOT NULL REFERENCES teacher_absences(id),
            lesson_id UUID NOT NULL REFERENCES lessons(id),
            original_teacher_id UUID NOT NULL REFERENCES teacher_profiles(id),
            substitute_teacher_id UUID NOT NULL REFERENCES teacher_profiles(id),
            student_id UUID NOT NULL REFERENCES student_profiles(id),
            room_id UUID NOT NULL REFERENCES rooms(id),
            instrument VARCHAR(100) NOT NULL,
            lesson_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            broadcast_group_id UUID NULL,
            approved_by_id UUID NULL,
            approved_at TIMESTAMP WITH TIME ZONE NULL,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL,
            kind VARCHAR(40) NOT NULL,
            title VARCHAR(255) NOT NULL,
            message TEXT NOT NULL,
            link TEXT NULL,
            is_read BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Several statements in one string need the simple query protocol.
    // The partial unique index allows at most one covering request per lesson.
    pool.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_lessons_room_date ON lessons(room_id, date);
        CREATE INDEX IF NOT EXISTS idx_lessons_teacher_date ON lessons(teacher_id, date);
        CREATE INDEX IF NOT EXISTS idx_lessons_student_date ON lessons(student_id, date);
        CREATE INDEX IF NOT EXISTS idx_lessons_schedule_date ON lessons(schedule_id, date);
        CREATE INDEX IF NOT EXISTS idx_schedules_teacher_day ON recurring_schedules(teacher_id, day_of_week);
        CREATE INDEX IF NOT EXISTS idx_schedules_room_day ON recurring_schedules(room_id, day_of_week);
        CREATE INDEX IF NOT EXISTS idx_schedules_student_day ON recurring_schedules(student_id, day_of_week);
        CREATE INDEX IF NOT EXISTS idx_absences_teacher ON teacher_absences(teacher_id, start_date, end_date);
        CREATE INDEX IF NOT EXISTS idx_substitute_requests_lesson ON substitute_requests(lesson_id);
        CREATE INDEX IF NOT EXISTS idx_substitute_requests_absence ON substitute_requests(absence_id);
        CREATE INDEX IF NOT EXISTS idx_substitute_requests_group ON substitute_requests(broadcast_group_id, lesson_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_substitute_requests_one_cover
            ON substitute_requests(lesson_id) WHERE status IN ('approved', 'completed');
        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
