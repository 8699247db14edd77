use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use studiosync_core::models::absence::TeacherAbsence;
use studiosync_core::models::lesson::Lesson;
use studiosync_core::models::people::{Room, StudentProfile, TeacherProfile};
use studiosync_core::models::schedule::RecurringSchedule;
use studiosync_core::models::substitute::SubstituteRequest;
use studiosync_core::notify::Notification;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRoom {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTeacherProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub instruments: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStudentProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbLesson {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub instrument: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration: i32,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub cancelled_by_id: Option<Uuid>,
    pub teacher_check_in: Option<DateTime<Utc>>,
    pub teacher_check_out: Option<DateTime<Utc>>,
    pub student_check_in: Option<DateTime<Utc>>,
    pub student_check_out: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRecurringSchedule {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub instrument: String,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration: i32,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTeacherAbsence {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: String,
    pub reported_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSubstituteRequest {
    pub id: Uuid,
    pub absence_id: Uuid,
    pub lesson_id: Uuid,
    pub original_teacher_id: Uuid,
    pub substitute_teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub instrument: String,
    pub lesson_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub broadcast_group_id: Option<Uuid>,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbRoom> for Room {
    fn from(row: DbRoom) -> Self {
        Room {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
        }
    }
}

impl From<DbTeacherProfile> for TeacherProfile {
    fn from(row: DbTeacherProfile) -> Self {
        TeacherProfile {
            id: row.id,
            user_id: row.user_id,
            display_name: row.display_name,
            instruments: row.instruments,
            is_active: row.is_active,
        }
    }
}

impl From<DbStudentProfile> for StudentProfile {
    fn from(row: DbStudentProfile) -> Self {
        StudentProfile {
            id: row.id,
            user_id: row.user_id,
            display_name: row.display_name,
            instruments: row.instruments,
        }
    }
}

impl TryFrom<DbLesson> for Lesson {
    type Error = eyre::Report;

    fn try_from(row: DbLesson) -> eyre::Result<Self> {
        Ok(Lesson {
            id: row.id,
            teacher_id: row.teacher_id,
            student_id: row.student_id,
            room_id: row.room_id,
            schedule_id: row.schedule_id,
            instrument: row.instrument,
            date: row.date,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
            duration: row.duration,
            status: row.status.parse()?,
            cancellation_reason: row.cancellation_reason,
            cancelled_by_id: row.cancelled_by_id,
            teacher_check_in: row.teacher_check_in,
            teacher_check_out: row.teacher_check_out,
            student_check_in: row.student_check_in,
            student_check_out: row.student_check_out,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<DbRecurringSchedule> for RecurringSchedule {
    fn from(row: DbRecurringSchedule) -> Self {
        RecurringSchedule {
            id: row.id,
            teacher_id: row.teacher_id,
            student_id: row.student_id,
            room_id: row.room_id,
            instrument: row.instrument,
            day_of_week: row.day_of_week,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
            duration: row.duration,
            effective_from: row.effective_from,
            effective_until: row.effective_until,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<DbTeacherAbsence> for TeacherAbsence {
    type Error = eyre::Report;

    fn try_from(row: DbTeacherAbsence) -> eyre::Result<Self> {
        Ok(TeacherAbsence {
            id: row.id,
            teacher_id: row.teacher_id,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status: row.status.parse()?,
            reported_by_id: row.reported_by_id,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbSubstituteRequest> for SubstituteRequest {
    type Error = eyre::Report;

    fn try_from(row: DbSubstituteRequest) -> eyre::Result<Self> {
        Ok(SubstituteRequest {
            id: row.id,
            absence_id: row.absence_id,
            lesson_id: row.lesson_id,
            original_teacher_id: row.original_teacher_id,
            substitute_teacher_id: row.substitute_teacher_id,
            student_id: row.student_id,
            room_id: row.room_id,
            instrument: row.instrument,
            lesson_date: row.lesson_date,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
            status: row.status.parse()?,
            broadcast_group_id: row.broadcast_group_id,
            approved_by_id: row.approved_by_id,
            approved_at: row.approved_at,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DbNotification> for Notification {
    type Error = eyre::Report;

    fn try_from(row: DbNotification) -> eyre::Result<Self> {
        Ok(Notification {
            user_id: row.user_id,
            kind: row.kind.parse()?,
            title: row.title,
            message: row.message,
            link: row.link,
        })
    }
}

/// Converts every row, failing on the first one that does not parse.
pub fn convert_all<R, T>(rows: Vec<R>) -> eyre::Result<Vec<T>>
where
    T: TryFrom<R, Error = eyre::Report>,
{
    rows.into_iter().map(T::try_from).collect()
}
