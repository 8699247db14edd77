use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum;
use crate::conflict::ResourceKind;
use crate::time::{TimeOfDay, TimeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

text_enum!(LessonStatus {
    Scheduled => "scheduled",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
});

/// A single dated booking of one teacher, one student and one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    /// Recurring schedule the lesson was materialized from.
    #[serde(default)]
    pub schedule_id: Option<Uuid>,
    pub instrument: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub duration: i32,
    pub status: LessonStatus,
    pub cancellation_reason: Option<String>,
    pub cancelled_by_id: Option<Uuid>,
    pub teacher_check_in: Option<DateTime<Utc>>,
    pub teacher_check_out: Option<DateTime<Utc>>,
    pub student_check_in: Option<DateTime<Utc>>,
    pub student_check_out: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Cancelled lessons no longer hold their room, teacher or student.
    pub fn occupies_slot(&self) -> bool {
        self.status != LessonStatus::Cancelled
    }

    pub fn resource_id(&self, kind: ResourceKind) -> Uuid {
        match kind {
            ResourceKind::Room => self.room_id,
            ResourceKind::Teacher => self.teacher_id,
            ResourceKind::Student => self.student_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLesson {
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub instrument: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// Minutes; derived from the time range when omitted.
    #[serde(default)]
    pub duration: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonUpdate {
    pub teacher_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub instrument: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub duration: Option<i32>,
    pub status: Option<LessonStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelLessonRequest {
    pub reason: Option<String>,
}

/// Selects lessons by any combination of lanes over an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonFilter {
    pub teacher_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub status: Option<LessonStatus>,
}

impl LessonFilter {
    pub fn matches(&self, lesson: &Lesson) -> bool {
        self.teacher_id.is_none_or(|id| id == lesson.teacher_id)
            && self.student_id.is_none_or(|id| id == lesson.student_id)
            && self.room_id.is_none_or(|id| id == lesson.room_id)
            && lesson.date >= self.from
            && lesson.date <= self.until
            && self.status.is_none_or(|status| status == lesson.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCancelRequest {
    pub teacher_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictQuery {
    pub kind: ResourceKind,
    pub resource_id: Uuid,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub exclude_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictQueryResponse {
    pub conflict: bool,
    pub conflicting_lesson_id: Option<Uuid>,
}
