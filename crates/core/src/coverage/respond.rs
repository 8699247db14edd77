use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conflict::{ResourceKind, check_lane};
use crate::errors::{Conflict, StudioError, StudioResult};
use crate::models::lesson::LessonStatus;
use crate::models::people::Actor;
use crate::models::substitute::{RespondAction, RespondRequest, SubstituteRequest, SubstituteStatus};
use crate::notify::{Notification, NotificationKind, NotificationSink, dispatch};
use crate::store::{Store, StoreTx};

const LOST_RACE_NOTE: &str = "Another teacher was approved first";
const APPROVE_ATTEMPTS: usize = 3;

/// Approves or declines a substitute request on behalf of its addressee.
///
/// Approval is decided inside one transaction that locks the lesson: the
/// request must still be open, no other request may already cover the lesson,
/// and the lesson's teacher is swapped only if it is still the original one.
/// Whoever commits second gets [`Conflict::AlreadyCovered`].
pub async fn respond<S: Store>(
    store: &S,
    sink: &dyn NotificationSink,
    actor: &Actor,
    request_id: Uuid,
    response: RespondRequest,
) -> StudioResult<SubstituteRequest> {
    match response.action {
        RespondAction::Decline => decline(store, sink, actor, request_id, response.notes).await,
        RespondAction::Approve => approve(store, sink, actor, request_id, response.notes).await,
    }
}

/// Re-runs an approval that lost a serialization race so the caller sees
/// the winner's outcome instead of a bare retry hint.
async fn approve<S: Store>(
    store: &S,
    sink: &dyn NotificationSink,
    actor: &Actor,
    request_id: Uuid,
    notes: Option<String>,
) -> StudioResult<SubstituteRequest> {
    let mut attempt = 1;
    loop {
        match approve_once(store, sink, actor, request_id, notes.clone()).await {
            Err(StudioError::Conflict(Conflict::ConcurrentModification))
                if attempt < APPROVE_ATTEMPTS =>
            {
                debug!(%request_id, attempt, "approval serialization failure, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

async fn decline<S: Store>(
    store: &S,
    sink: &dyn NotificationSink,
    actor: &Actor,
    request_id: Uuid,
    notes: Option<String>,
) -> StudioResult<SubstituteRequest> {
    let mut tx = store.begin().await?;
    let mut request = load_addressed(&mut tx, actor, request_id).await?;
    if !request.status.is_open() {
        return Err(closed_request_error(&mut tx, &request).await?);
    }

    request.status = SubstituteStatus::Declined;
    if notes.is_some() {
        request.notes = notes;
    }
    request.updated_at = Utc::now();
    tx.update_substitute_request(&request).await?;

    let reporter = tx.get_absence(request.absence_id).await?.map(|a| a.reported_by_id);
    let substitute = tx
        .get_teacher(request.substitute_teacher_id)
        .await?
        .map(|t| t.display_name)
        .unwrap_or_else(|| "The substitute".to_string());
    tx.commit().await?;
    info!(request_id = %request.id, "substitute request declined");

    if let Some(user_id) = reporter {
        dispatch(
            sink,
            vec![Notification {
                user_id,
                kind: NotificationKind::SubstituteDeclined,
                title: "Substitute request declined".to_string(),
                message: format!(
                    "{substitute} declined the lesson on {} at {}.",
                    request.lesson_date, request.start_time
                ),
                link: Some(format!("/absences/{}", request.absence_id)),
            }],
        )
        .await;
    }
    Ok(request)
}

async fn approve_once<S: Store>(
    store: &S,
    sink: &dyn NotificationSink,
    actor: &Actor,
    request_id: Uuid,
    notes: Option<String>,
) -> StudioResult<SubstituteRequest> {
    let mut tx = store.begin().await?;
    let mut request = load_addressed(&mut tx, actor, request_id).await?;
    let lesson = tx
        .lock_lesson(request.lesson_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Lesson", request.lesson_id))?;

    let all_for_lesson = tx.requests_for_lesson(lesson.id).await?;
    if all_for_lesson
        .iter()
        .any(|r| r.id != request.id && r.status.is_covering())
    {
        return Err(Conflict::AlreadyCovered {
            lesson_id: lesson.id,
        }
        .into());
    }
    if !request.status.is_open() {
        return Err(closed_request_error(&mut tx, &request).await?);
    }
    if lesson.status != LessonStatus::Scheduled {
        return Err(StudioError::Validation(format!(
            "lesson {} is {} and can no longer be covered",
            lesson.id, lesson.status
        )));
    }
    if lesson.teacher_id != request.original_teacher_id {
        return Err(Conflict::AlreadyCovered {
            lesson_id: lesson.id,
        }
        .into());
    }
    check_lane(
        &mut tx,
        ResourceKind::Teacher,
        request.substitute_teacher_id,
        lesson.date,
        &lesson.range(),
        Some(lesson.id),
    )
    .await?;

    let now = Utc::now();
    let mut cancelled = Vec::new();
    for mut sibling in all_for_lesson {
        if sibling.competes_with(&request) && sibling.status.is_open() {
            sibling.status = SubstituteStatus::Cancelled;
            sibling.notes = Some(LOST_RACE_NOTE.to_string());
            sibling.updated_at = now;
            tx.update_substitute_request(&sibling).await?;
            cancelled.push(sibling);
        }
    }

    request.status = SubstituteStatus::Approved;
    request.approved_by_id = Some(actor.user_id);
    request.approved_at = Some(now);
    if notes.is_some() {
        request.notes = notes;
    }
    request.updated_at = now;
    tx.update_substitute_request(&request).await?;

    let swapped = tx
        .reassign_teacher(lesson.id, request.original_teacher_id, request.substitute_teacher_id)
        .await?;
    if !swapped {
        warn!(lesson_id = %lesson.id, "lesson teacher changed underneath approval");
        return Err(Conflict::AlreadyCovered {
            lesson_id: lesson.id,
        }
        .into());
    }

    let notifications = approval_notifications(&mut tx, &request, &cancelled).await?;
    tx.commit().await?;
    info!(
        request_id = %request.id,
        lesson_id = %lesson.id,
        substitute_id = %request.substitute_teacher_id,
        cancelled_siblings = cancelled.len(),
        "substitute request approved"
    );

    dispatch(sink, notifications).await;
    Ok(request)
}

/// Loads a request and checks the actor may answer it: the addressed
/// teacher's own account, or an administrator.
async fn load_addressed<T: StoreTx>(
    tx: &mut T,
    actor: &Actor,
    request_id: Uuid,
) -> StudioResult<SubstituteRequest> {
    let request = tx
        .get_substitute_request(request_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Substitute request", request_id))?;
    if actor.is_admin() {
        return Ok(request);
    }
    let addressee = tx
        .get_teacher(request.substitute_teacher_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Teacher", request.substitute_teacher_id))?;
    if addressee.user_id != actor.user_id {
        return Err(StudioError::Forbidden(
            "this substitute request is addressed to another teacher".to_string(),
        ));
    }
    Ok(request)
}

/// Error for answering a request that already left the open states.
async fn closed_request_error<T: StoreTx>(
    tx: &mut T,
    request: &SubstituteRequest,
) -> StudioResult<StudioError> {
    let covered_elsewhere = tx
        .requests_for_lesson(request.lesson_id)
        .await?
        .iter()
        .any(|r| r.id != request.id && r.status.is_covering());
    if covered_elsewhere {
        return Ok(Conflict::AlreadyCovered {
            lesson_id: request.lesson_id,
        }
        .into());
    }
    Ok(StudioError::Validation(format!(
        "substitute request {} is already {}",
        request.id, request.status
    )))
}

async fn approval_notifications<T: StoreTx>(
    tx: &mut T,
    request: &SubstituteRequest,
    cancelled: &[SubstituteRequest],
) -> StudioResult<Vec<Notification>> {
    let when = format!("{} at {}", request.lesson_date, request.start_time);
    let substitute = tx.get_teacher(request.substitute_teacher_id).await?;
    let substitute_name = substitute
        .as_ref()
        .map(|t| t.display_name.clone())
        .unwrap_or_else(|| "a substitute".to_string());

    let mut notifications = Vec::new();
    for sibling in cancelled {
        if let Some(teacher) = tx.get_teacher(sibling.substitute_teacher_id).await? {
            notifications.push(Notification {
                user_id: teacher.user_id,
                kind: NotificationKind::SubstituteCancelled,
                title: "Lesson already covered".to_string(),
                message: format!("The lesson on {when} was taken by another teacher."),
                link: Some(format!("/substitute-requests/{}", sibling.id)),
            });
        }
    }
    if let Some(original) = tx.get_teacher(request.original_teacher_id).await? {
        notifications.push(Notification {
            user_id: original.user_id,
            kind: NotificationKind::CoverageConfirmed,
            title: "Coverage confirmed".to_string(),
            message: format!("{substitute_name} will teach your lesson on {when}."),
            link: Some(format!("/lessons/{}", request.lesson_id)),
        });
    }
    if let Some(student) = tx.get_student(request.student_id).await? {
        notifications.push(Notification {
            user_id: student.user_id,
            kind: NotificationKind::TeacherChanged,
            title: "Teacher changed".to_string(),
            message: format!("Your {} lesson on {when} will be taught by {substitute_name}.", request.instrument),
            link: Some(format!("/lessons/{}", request.lesson_id)),
        });
    }
    Ok(notifications)
}
