use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum;
use crate::time::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstituteStatus {
    Pending,
    AwaitingApproval,
    Approved,
    Declined,
    Cancelled,
    Completed,
}

text_enum!(SubstituteStatus {
    Pending => "pending",
    AwaitingApproval => "awaiting_approval",
    Approved => "approved",
    Declined => "declined",
    Cancelled => "cancelled",
    Completed => "completed",
});

impl SubstituteStatus {
    /// Still waiting on the addressed teacher.
    pub fn is_open(self) -> bool {
        matches!(self, SubstituteStatus::Pending | SubstituteStatus::AwaitingApproval)
    }

    /// The request put its substitute on the lesson.
    pub fn is_covering(self) -> bool {
        matches!(self, SubstituteStatus::Approved | SubstituteStatus::Completed)
    }
}

/// An offer to one candidate teacher to take over one lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstituteRequest {
    pub id: Uuid,
    pub absence_id: Uuid,
    pub lesson_id: Uuid,
    pub original_teacher_id: Uuid,
    pub substitute_teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub instrument: String,
    pub lesson_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub status: SubstituteStatus,
    pub broadcast_group_id: Option<Uuid>,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubstituteRequest {
    /// Another request for the same lesson, whatever batch or group it came from.
    pub fn competes_with(&self, other: &SubstituteRequest) -> bool {
        self.id != other.id && self.lesson_id == other.lesson_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageMode {
    /// Exactly one candidate per lesson.
    Single,
    /// Several candidates per lesson, first approval wins.
    Broadcast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonOffer {
    pub lesson_id: Uuid,
    pub teacher_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubstituteRequests {
    pub mode: CoverageMode,
    pub offers: Vec<LessonOffer>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondAction {
    Approve,
    Decline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondRequest {
    pub action: RespondAction,
    pub notes: Option<String>,
}
