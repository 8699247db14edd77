use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lesson::Lesson;
use crate::conflict::ResourceKind;
use crate::time::{TimeOfDay, TimeRange};

/// Weekly lesson pattern. `day_of_week` counts from Sunday = 0 to Saturday = 6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub instrument: String,
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub duration: i32,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl RecurringSchedule {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn resource_id(&self, kind: ResourceKind) -> Uuid {
        match kind {
            ResourceKind::Room => self.room_id,
            ResourceKind::Teacher => self.teacher_id,
            ResourceKind::Student => self.student_id,
        }
    }

    /// Whether the pattern produces a lesson on `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        day_of_week(date) == self.day_of_week
            && date >= self.effective_from
            && self.effective_until.is_none_or(|until| date <= until)
    }
}

pub fn day_of_week(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchedule {
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub room_id: Uuid,
    pub instrument: String,
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub duration: Option<i32>,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub teacher_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub instrument: Option<String>,
    pub day_of_week: Option<i16>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub duration: Option<i32>,
    pub effective_from: Option<NaiveDate>,
    /// `Some(None)` clears the end date and makes the schedule open-ended.
    #[serde(default, with = "double_option")]
    pub effective_until: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

mod double_option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<NaiveDate>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        Option::<NaiveDate>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateLessonsRequest {
    pub from: NaiveDate,
    pub until: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub created: Vec<Lesson>,
    pub skipped: Vec<SkippedDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleResponse {
    pub schedule: RecurringSchedule,
    pub generation: GenerationReport,
}
