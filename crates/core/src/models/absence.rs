use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lesson::Lesson;
use super::substitute::SubstituteRequest;
use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Pending,
    CoverageNeeded,
    PartiallyCovered,
    FullyCovered,
    Cancelled,
}

text_enum!(AbsenceStatus {
    Pending => "pending",
    CoverageNeeded => "coverage_needed",
    PartiallyCovered => "partially_covered",
    FullyCovered => "fully_covered",
    Cancelled => "cancelled",
});

/// A reported unavailability window, `start_date..=end_date`.
///
/// Only `Pending` and `Cancelled` are ever stored; the coverage states are
/// derived from substitute requests when the absence is read back through
/// [`crate::coverage::absence_overview`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAbsence {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: AbsenceStatus,
    pub reported_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TeacherAbsence {
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAbsenceRequest {
    pub teacher_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAbsenceResponse {
    pub absence: TeacherAbsence,
    pub affected_lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceOverview {
    pub absence: TeacherAbsence,
    /// Derived from the requests below, never read from storage.
    pub status: AbsenceStatus,
    pub lessons_total: usize,
    pub lessons_covered: usize,
    pub requests: Vec<SubstituteRequest>,
}
