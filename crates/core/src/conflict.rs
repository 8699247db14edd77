//! Interval conflict detection.
//!
//! Lessons and recurring schedules share one rule: within a lane (a room, a
//! teacher or a student) no two live bookings may overlap. Lessons are
//! compared per calendar date against non-cancelled lessons, schedules per
//! weekday against active schedules. All checks run on the caller's
//! transaction so they see the same snapshot the subsequent write commits to.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{Conflict, StudioError, StudioResult};
use crate::models::lesson::Lesson;
use crate::models::schedule::RecurringSchedule;
use crate::store::{Store, StoreTx};
use crate::time::TimeRange;

/// The three lanes a booking occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Room,
    Teacher,
    Student,
}

impl ResourceKind {
    /// Check order; the first lane that conflicts is the one reported.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Room,
        ResourceKind::Teacher,
        ResourceKind::Student,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Room => "Room",
            ResourceKind::Teacher => "Teacher",
            ResourceKind::Student => "Student",
        })
    }
}

/// First non-cancelled lesson of `resource_id` on `date` overlapping `range`,
/// ignoring `exclude_id`.
pub async fn find_conflict<T: StoreTx>(
    tx: &mut T,
    kind: ResourceKind,
    resource_id: Uuid,
    date: NaiveDate,
    range: &TimeRange,
    exclude_id: Option<Uuid>,
) -> eyre::Result<Option<Lesson>> {
    let existing = tx.active_lessons_on(kind, resource_id, date).await?;
    debug!(%kind, %resource_id, %date, %range, candidates = existing.len(), "checking lesson lane");
    Ok(existing
        .into_iter()
        .filter(|lesson| Some(lesson.id) != exclude_id && lesson.occupies_slot())
        .find(|lesson| lesson.range().overlaps(range)))
}

pub async fn has_conflict<T: StoreTx>(
    tx: &mut T,
    kind: ResourceKind,
    resource_id: Uuid,
    date: NaiveDate,
    range: &TimeRange,
    exclude_id: Option<Uuid>,
) -> eyre::Result<bool> {
    Ok(find_conflict(tx, kind, resource_id, date, range, exclude_id)
        .await?
        .is_some())
}

/// Standalone read-only query, opening its own transaction.
pub async fn conflicting_lesson<S: Store>(
    store: &S,
    kind: ResourceKind,
    resource_id: Uuid,
    date: NaiveDate,
    range: &TimeRange,
    exclude_id: Option<Uuid>,
) -> StudioResult<Option<Lesson>> {
    let mut tx = store.begin().await?;
    let found = find_conflict(&mut tx, kind, resource_id, date, range, exclude_id).await?;
    Ok(found)
}

/// Refuses `lesson` if it overlaps anything in any of its lanes.
pub async fn check_lesson_lanes<T: StoreTx>(
    tx: &mut T,
    lesson: &Lesson,
    exclude_id: Option<Uuid>,
) -> StudioResult<()> {
    for kind in ResourceKind::ALL {
        check_lane(tx, kind, lesson.resource_id(kind), lesson.date, &lesson.range(), exclude_id)
            .await?;
    }
    Ok(())
}

/// Refuses a booking of one resource if it overlaps an existing lesson.
pub async fn check_lane<T: StoreTx>(
    tx: &mut T,
    kind: ResourceKind,
    resource_id: Uuid,
    date: NaiveDate,
    range: &TimeRange,
    exclude_id: Option<Uuid>,
) -> StudioResult<()> {
    match find_conflict(tx, kind, resource_id, date, range, exclude_id).await? {
        None => Ok(()),
        Some(existing) => {
            let (resource_name, with_name) = describe(tx, kind, resource_id, &existing).await?;
            Err(StudioError::Conflict(Conflict::DoubleBooked {
                lane: kind,
                resource_id,
                resource_name,
                with_name,
                existing_id: existing.id,
                start: existing.start_time,
                end: existing.end_time,
            }))
        }
    }
}

/// First active schedule of `resource_id` on `day_of_week` overlapping `range`.
pub async fn find_schedule_conflict<T: StoreTx>(
    tx: &mut T,
    kind: ResourceKind,
    resource_id: Uuid,
    day_of_week: i16,
    range: &TimeRange,
    exclude_id: Option<Uuid>,
) -> eyre::Result<Option<RecurringSchedule>> {
    let existing = tx.active_schedules_on(kind, resource_id, day_of_week).await?;
    Ok(existing
        .into_iter()
        .filter(|schedule| Some(schedule.id) != exclude_id && schedule.is_active)
        .find(|schedule| schedule.range().overlaps(range)))
}

pub async fn check_schedule_lanes<T: StoreTx>(
    tx: &mut T,
    schedule: &RecurringSchedule,
    exclude_id: Option<Uuid>,
) -> StudioResult<()> {
    for kind in ResourceKind::ALL {
        let resource_id = schedule.resource_id(kind);
        let found = find_schedule_conflict(
            tx,
            kind,
            resource_id,
            schedule.day_of_week,
            &schedule.range(),
            exclude_id,
        )
        .await?;
        if let Some(existing) = found {
            let (resource_name, with_name) = describe_parties(
                tx,
                kind,
                resource_id,
                existing.teacher_id,
                existing.student_id,
            )
            .await?;
            return Err(StudioError::Conflict(Conflict::ScheduleOverlap {
                lane: kind,
                resource_id,
                resource_name,
                with_name,
                existing_id: existing.id,
                start: existing.start_time,
                end: existing.end_time,
            }));
        }
    }
    Ok(())
}

async fn describe<T: StoreTx>(
    tx: &mut T,
    kind: ResourceKind,
    resource_id: Uuid,
    existing: &Lesson,
) -> eyre::Result<(String, String)> {
    describe_parties(tx, kind, resource_id, existing.teacher_id, existing.student_id).await
}

/// Name of the contested resource and of the party already holding it: the
/// other booking's student for room and teacher lanes, its teacher for the
/// student lane.
async fn describe_parties<T: StoreTx>(
    tx: &mut T,
    kind: ResourceKind,
    resource_id: Uuid,
    holder_teacher: Uuid,
    holder_student: Uuid,
) -> eyre::Result<(String, String)> {
    let resource_name = match kind {
        ResourceKind::Room => tx.get_room(resource_id).await?.map(|r| r.name),
        ResourceKind::Teacher => tx.get_teacher(resource_id).await?.map(|t| t.display_name),
        ResourceKind::Student => tx.get_student(resource_id).await?.map(|s| s.display_name),
    };
    let with_name = match kind {
        ResourceKind::Room | ResourceKind::Teacher => {
            tx.get_student(holder_student).await?.map(|s| s.display_name)
        }
        ResourceKind::Student => tx.get_teacher(holder_teacher).await?.map(|t| t.display_name),
    };
    Ok((
        resource_name.unwrap_or_else(|| resource_id.to_string()),
        with_name.unwrap_or_else(|| "another booking".to_string()),
    ))
}
