//! Single-lesson booking, editing and cancellation.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::conflict::check_lesson_lanes;
use crate::errors::{StudioError, StudioResult};
use crate::models::lesson::{
    BulkCancelRequest, Lesson, LessonFilter, LessonStatus, LessonUpdate, NewLesson,
};
use crate::models::people::Actor;
use crate::models::substitute::SubstituteStatus;
use crate::store::{Store, StoreTx};
use crate::time::TimeRange;

/// Books a lesson after checking the room, teacher and student lanes.
///
/// The lane checks and the insert run in one transaction, so two requests for
/// the same slot cannot both succeed.
pub async fn book_lesson<S: Store>(
    store: &S,
    actor: &Actor,
    new: NewLesson,
) -> StudioResult<Lesson> {
    actor.require_admin()?;
    let mut tx = store.begin().await?;
    let lesson = book_in_tx(&mut tx, new, None).await?;
    tx.commit().await?;
    info!(
        lesson_id = %lesson.id,
        date = %lesson.date,
        range = %lesson.range(),
        "lesson booked"
    );
    Ok(lesson)
}

/// Validates and inserts a lesson on an open transaction.
pub(crate) async fn book_in_tx<T: StoreTx>(
    tx: &mut T,
    new: NewLesson,
    schedule_id: Option<Uuid>,
) -> StudioResult<Lesson> {
    let range = TimeRange::new(new.start_time, new.end_time)?;
    let duration = resolve_duration(&range, new.duration)?;
    let instrument = required_instrument(&new.instrument)?;
    ensure_parties(tx, new.room_id, new.teacher_id, new.student_id).await?;

    let now = Utc::now();
    let lesson = Lesson {
        id: Uuid::new_v4(),
        teacher_id: new.teacher_id,
        student_id: new.student_id,
        room_id: new.room_id,
        schedule_id,
        instrument,
        date: new.date,
        start_time: range.start,
        end_time: range.end,
        duration,
        status: LessonStatus::Scheduled,
        cancellation_reason: None,
        cancelled_by_id: None,
        teacher_check_in: None,
        teacher_check_out: None,
        student_check_in: None,
        student_check_out: None,
        created_at: now,
        updated_at: now,
    };

    check_lesson_lanes(tx, &lesson, None).await?;
    tx.insert_lesson(&lesson).await?;
    Ok(lesson)
}

pub async fn get_lesson<S: Store>(store: &S, id: Uuid) -> StudioResult<Lesson> {
    let mut tx = store.begin().await?;
    let lesson = tx
        .get_lesson(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Lesson", id))?;
    Ok(lesson)
}

/// Applies `update` and re-runs the lane checks against every other lesson.
///
/// Completing a lesson also completes the substitute request that covered it.
pub async fn update_lesson<S: Store>(
    store: &S,
    actor: &Actor,
    id: Uuid,
    update: LessonUpdate,
) -> StudioResult<Lesson> {
    actor.require_admin()?;
    let mut tx = store.begin().await?;
    let current = tx
        .lock_lesson(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Lesson", id))?;

    let mut lesson = current.clone();
    if let Some(teacher_id) = update.teacher_id {
        lesson.teacher_id = teacher_id;
    }
    if let Some(student_id) = update.student_id {
        lesson.student_id = student_id;
    }
    if let Some(room_id) = update.room_id {
        lesson.room_id = room_id;
    }
    if let Some(instrument) = &update.instrument {
        lesson.instrument = required_instrument(instrument)?;
    }
    if let Some(date) = update.date {
        lesson.date = date;
    }
    let range = TimeRange::new(
        update.start_time.unwrap_or(current.start_time),
        update.end_time.unwrap_or(current.end_time),
    )?;
    lesson.start_time = range.start;
    lesson.end_time = range.end;
    lesson.duration = match update.duration {
        Some(minutes) => resolve_duration(&range, Some(minutes))?,
        None if range != current.range() => range.duration_minutes(),
        None => current.duration,
    };
    if let Some(status) = update.status {
        lesson.status = status;
        if status == LessonStatus::Cancelled && current.status != LessonStatus::Cancelled {
            lesson.cancelled_by_id = Some(actor.user_id);
        } else if status != LessonStatus::Cancelled {
            lesson.cancellation_reason = None;
            lesson.cancelled_by_id = None;
        }
    }

    if lesson.room_id != current.room_id
        || lesson.teacher_id != current.teacher_id
        || lesson.student_id != current.student_id
    {
        ensure_parties(&mut tx, lesson.room_id, lesson.teacher_id, lesson.student_id).await?;
    }
    if lesson.occupies_slot() {
        check_lesson_lanes(&mut tx, &lesson, Some(lesson.id)).await?;
    }

    lesson.updated_at = Utc::now();
    tx.update_lesson(&lesson).await?;

    if lesson.status == LessonStatus::Completed && current.status != LessonStatus::Completed {
        for mut request in tx.requests_for_lesson(lesson.id).await? {
            if request.status == SubstituteStatus::Approved {
                request.status = SubstituteStatus::Completed;
                request.updated_at = lesson.updated_at;
                tx.update_substitute_request(&request).await?;
            }
        }
    }
    if lesson.status == LessonStatus::Cancelled && current.status != LessonStatus::Cancelled {
        withdraw_open_requests(&mut tx, lesson.id, CANCELLED_NOTE).await?;
    } else if lesson.teacher_id != current.teacher_id
        || lesson.date != current.date
        || lesson.range() != current.range()
    {
        withdraw_open_requests(&mut tx, lesson.id, MOVED_NOTE).await?;
    }

    tx.commit().await?;
    info!(lesson_id = %lesson.id, status = %lesson.status, "lesson updated");
    Ok(lesson)
}

/// Soft-cancels a lesson; the row stays for history.
pub async fn cancel_lesson<S: Store>(
    store: &S,
    actor: &Actor,
    id: Uuid,
    reason: Option<String>,
) -> StudioResult<Lesson> {
    actor.require_admin()?;
    let mut tx = store.begin().await?;
    let mut lesson = tx
        .lock_lesson(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Lesson", id))?;
    if lesson.status == LessonStatus::Cancelled {
        return Err(StudioError::Validation(format!(
            "lesson {id} is already cancelled"
        )));
    }
    mark_cancelled(&mut lesson, actor, reason);
    tx.update_lesson(&lesson).await?;
    withdraw_open_requests(&mut tx, lesson.id, CANCELLED_NOTE).await?;
    tx.commit().await?;
    info!(lesson_id = %lesson.id, "lesson cancelled");
    Ok(lesson)
}

/// Administrative cancellation of every scheduled lesson matching the filter.
pub async fn bulk_cancel<S: Store>(
    store: &S,
    actor: &Actor,
    request: BulkCancelRequest,
) -> StudioResult<Vec<Lesson>> {
    actor.require_admin()?;
    if request.teacher_id.is_none() && request.student_id.is_none() && request.room_id.is_none() {
        return Err(StudioError::Validation(
            "bulk cancellation needs a teacher, student or room".to_string(),
        ));
    }
    if request.from > request.until {
        return Err(StudioError::Validation(
            "'from' must not be after 'until'".to_string(),
        ));
    }

    let filter = LessonFilter {
        teacher_id: request.teacher_id,
        student_id: request.student_id,
        room_id: request.room_id,
        from: request.from,
        until: request.until,
        status: Some(LessonStatus::Scheduled),
    };

    let mut tx = store.begin().await?;
    let mut cancelled = tx.find_lessons(&filter).await?;
    for lesson in &mut cancelled {
        mark_cancelled(lesson, actor, request.reason.clone());
        tx.update_lesson(lesson).await?;
        withdraw_open_requests(&mut tx, lesson.id, CANCELLED_NOTE).await?;
    }
    tx.commit().await?;
    info!(count = cancelled.len(), "lessons cancelled in bulk");
    Ok(cancelled)
}

fn mark_cancelled(lesson: &mut Lesson, actor: &Actor, reason: Option<String>) {
    lesson.status = LessonStatus::Cancelled;
    lesson.cancellation_reason = reason;
    lesson.cancelled_by_id = Some(actor.user_id);
    lesson.updated_at = Utc::now();
}

const CANCELLED_NOTE: &str = "The lesson was cancelled";
const MOVED_NOTE: &str = "The lesson was moved or reassigned";

/// Open requests describe the slot and teacher they were sent for; once either
/// changes they can no longer be answered.
async fn withdraw_open_requests<T: StoreTx>(
    tx: &mut T,
    lesson_id: Uuid,
    note: &str,
) -> StudioResult<()> {
    for mut request in tx.requests_for_lesson(lesson_id).await? {
        if request.status.is_open() {
            request.status = SubstituteStatus::Cancelled;
            request.notes = Some(note.to_string());
            request.updated_at = Utc::now();
            tx.update_substitute_request(&request).await?;
        }
    }
    Ok(())
}

pub(crate) fn resolve_duration(range: &TimeRange, requested: Option<i32>) -> StudioResult<i32> {
    let minutes = range.duration_minutes();
    match requested {
        Some(requested) if requested != minutes => Err(StudioError::Validation(format!(
            "duration of {requested} minutes does not match {range} ({minutes} minutes)"
        ))),
        _ => Ok(minutes),
    }
}

pub(crate) fn required_instrument(instrument: &str) -> StudioResult<String> {
    let trimmed = instrument.trim();
    if trimmed.is_empty() {
        return Err(StudioError::Validation("instrument is required".to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) async fn ensure_parties<T: StoreTx>(
    tx: &mut T,
    room_id: Uuid,
    teacher_id: Uuid,
    student_id: Uuid,
) -> StudioResult<()> {
    let room = tx
        .get_room(room_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Room", room_id))?;
    if !room.is_active {
        return Err(StudioError::Validation(format!(
            "room '{}' is not active",
            room.name
        )));
    }
    tx.get_teacher(teacher_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Teacher", teacher_id))?;
    tx.get_student(student_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Student", student_id))?;
    Ok(())
}
