use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::conflict::{ResourceKind, check_lane};
use crate::errors::{StudioError, StudioResult};
use crate::models::absence::AbsenceStatus;
use crate::models::lesson::LessonStatus;
use crate::models::people::Actor;
use crate::models::substitute::{
    CoverageMode, CreateSubstituteRequests, SubstituteRequest, SubstituteStatus,
};
use crate::notify::{Notification, NotificationKind, NotificationSink, dispatch};
use crate::store::{Store, StoreTx};

/// Creates one request per (lesson, candidate) pair of the absence.
///
/// In broadcast mode all requests for the same lesson share a freshly minted
/// group id; different lessons never share a group. Every addressed teacher
/// receives one notification for the whole batch.
pub async fn create_substitute_requests<S: Store>(
    store: &S,
    sink: &dyn NotificationSink,
    actor: &Actor,
    absence_id: Uuid,
    batch: CreateSubstituteRequests,
) -> StudioResult<Vec<SubstituteRequest>> {
    actor.require_admin()?;
    if batch.offers.is_empty() {
        return Err(StudioError::Validation(
            "at least one lesson must be offered".to_string(),
        ));
    }

    let mut tx = store.begin().await?;
    let absence = tx
        .get_absence(absence_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Absence", absence_id))?;
    if absence.status == AbsenceStatus::Cancelled {
        return Err(StudioError::Validation(format!(
            "absence {absence_id} is cancelled"
        )));
    }

    let mut created = Vec::new();
    let mut offered: BTreeMap<Uuid, usize> = BTreeMap::new();
    let mut seen_lessons = HashSet::new();
    for offer in &batch.offers {
        if !seen_lessons.insert(offer.lesson_id) {
            return Err(StudioError::Validation(format!(
                "lesson {} is offered more than once",
                offer.lesson_id
            )));
        }
        let lesson = tx
            .get_lesson(offer.lesson_id)
            .await?
            .ok_or_else(|| StudioError::not_found("Lesson", offer.lesson_id))?;
        if lesson.teacher_id != absence.teacher_id
            || !absence.covers(lesson.date)
            || lesson.status != LessonStatus::Scheduled
        {
            return Err(StudioError::Validation(format!(
                "lesson {} is not affected by absence {absence_id}",
                lesson.id
            )));
        }

        match (batch.mode, offer.teacher_ids.len()) {
            (_, 0) => {
                return Err(StudioError::Validation(format!(
                    "no candidate given for lesson {}",
                    lesson.id
                )));
            }
            (CoverageMode::Single, n) if n > 1 => {
                return Err(StudioError::Validation(format!(
                    "single mode takes exactly one candidate, lesson {} has {n}",
                    lesson.id
                )));
            }
            _ => {}
        }
        let unique: HashSet<_> = offer.teacher_ids.iter().collect();
        if unique.len() != offer.teacher_ids.len() {
            return Err(StudioError::Validation(format!(
                "duplicate candidate for lesson {}",
                lesson.id
            )));
        }

        let existing = tx.requests_for_lesson(lesson.id).await?;
        let group_id = (batch.mode == CoverageMode::Broadcast).then(Uuid::new_v4);
        for &teacher_id in &offer.teacher_ids {
            let teacher = tx
                .get_teacher(teacher_id)
                .await?
                .ok_or_else(|| StudioError::not_found("Teacher", teacher_id))?;
            if teacher.id == lesson.teacher_id {
                return Err(StudioError::Validation(
                    "a teacher cannot substitute for their own lesson".to_string(),
                ));
            }
            if !teacher.is_active || !teacher.teaches(&lesson.instrument) {
                return Err(StudioError::Validation(format!(
                    "{} cannot take a {} lesson",
                    teacher.display_name, lesson.instrument
                )));
            }
            if existing
                .iter()
                .any(|r| r.substitute_teacher_id == teacher_id && r.status.is_open())
            {
                return Err(StudioError::Validation(format!(
                    "{} already has an open request for lesson {}",
                    teacher.display_name, lesson.id
                )));
            }
            check_lane(
                &mut tx,
                ResourceKind::Teacher,
                teacher_id,
                lesson.date,
                &lesson.range(),
                Some(lesson.id),
            )
            .await?;

            let now = Utc::now();
            let request = SubstituteRequest {
                id: Uuid::new_v4(),
                absence_id,
                lesson_id: lesson.id,
                original_teacher_id: lesson.teacher_id,
                substitute_teacher_id: teacher_id,
                student_id: lesson.student_id,
                room_id: lesson.room_id,
                instrument: lesson.instrument.clone(),
                lesson_date: lesson.date,
                start_time: lesson.start_time,
                end_time: lesson.end_time,
                status: SubstituteStatus::AwaitingApproval,
                broadcast_group_id: group_id,
                approved_by_id: None,
                approved_at: None,
                notes: batch.notes.clone(),
                created_at: now,
                updated_at: now,
            };
            tx.insert_substitute_request(&request).await?;
            *offered.entry(teacher.user_id).or_default() += 1;
            created.push(request);
        }
    }
    tx.commit().await?;

    info!(
        %absence_id,
        mode = ?batch.mode,
        requests = created.len(),
        "substitute requests created"
    );

    let notifications = offered
        .into_iter()
        .map(|(user_id, count)| Notification {
            user_id,
            kind: NotificationKind::SubstituteRequested,
            title: "Substitute request".to_string(),
            message: format!(
                "You have been asked to cover {count} lesson{}.",
                if count == 1 { "" } else { "s" }
            ),
            link: Some("/substitute-requests".to_string()),
        })
        .collect();
    dispatch(sink, notifications).await;

    Ok(created)
}
