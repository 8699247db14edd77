//! Teacher absence and substitute coverage.
//!
//! An absence taints the scheduled lessons of its teacher inside the date
//! range. Administrators offer those lessons to candidate teachers through
//! substitute requests, either one candidate per lesson or broadcast to
//! several; the first approval reassigns the lesson and cancels the rest.

mod candidates;
mod requests;
mod respond;

pub use candidates::{ByCompletedLessons, Candidate, CandidateRanking, find_candidates};
pub use requests::create_substitute_requests;
pub use respond::respond;

use std::collections::HashSet;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::{StudioError, StudioResult};
use crate::models::absence::{
    AbsenceOverview, AbsenceStatus, ReportAbsenceRequest, ReportAbsenceResponse, TeacherAbsence,
};
use crate::models::lesson::{Lesson, LessonFilter, LessonStatus};
use crate::models::people::Actor;
use crate::models::substitute::SubstituteStatus;
use crate::notify::{Notification, NotificationKind, NotificationSink, dispatch};
use crate::store::{Store, StoreTx};

/// Records an absence and returns the lessons it affects.
pub async fn report_absence<S: Store>(
    store: &S,
    actor: &Actor,
    request: ReportAbsenceRequest,
) -> StudioResult<ReportAbsenceResponse> {
    actor.require_admin()?;
    if request.start_date > request.end_date {
        return Err(StudioError::Validation(format!(
            "absence start {} is after its end {}",
            request.start_date, request.end_date
        )));
    }

    let mut tx = store.begin().await?;
    tx.get_teacher(request.teacher_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Teacher", request.teacher_id))?;

    let absence = TeacherAbsence {
        id: Uuid::new_v4(),
        teacher_id: request.teacher_id,
        start_date: request.start_date,
        end_date: request.end_date,
        reason: request.reason.trim().to_string(),
        status: AbsenceStatus::Pending,
        reported_by_id: actor.user_id,
        created_at: Utc::now(),
    };
    tx.insert_absence(&absence).await?;
    let affected_lessons = affected_lessons(&mut tx, &absence).await?;
    tx.commit().await?;

    info!(
        absence_id = %absence.id,
        teacher_id = %absence.teacher_id,
        affected = affected_lessons.len(),
        "absence reported"
    );
    Ok(ReportAbsenceResponse {
        absence,
        affected_lessons,
    })
}

/// Scheduled lessons still held by the absent teacher inside the range.
pub(crate) async fn affected_lessons<T: StoreTx>(
    tx: &mut T,
    absence: &TeacherAbsence,
) -> eyre::Result<Vec<Lesson>> {
    tx.find_lessons(&LessonFilter {
        teacher_id: Some(absence.teacher_id),
        student_id: None,
        room_id: None,
        from: absence.start_date,
        until: absence.end_date,
        status: Some(LessonStatus::Scheduled),
    })
    .await
}

/// The absence together with its coverage status, derived from the current
/// substitute requests on every read.
pub async fn absence_overview<S: Store>(store: &S, id: Uuid) -> StudioResult<AbsenceOverview> {
    let mut tx = store.begin().await?;
    let absence = tx
        .get_absence(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Absence", id))?;
    let requests = tx.requests_for_absence(id).await?;

    let covered: HashSet<Uuid> = requests
        .iter()
        .filter(|r| r.status.is_covering())
        .map(|r| r.lesson_id)
        .collect();
    let uncovered = affected_lessons(&mut tx, &absence)
        .await?
        .into_iter()
        .filter(|lesson| !covered.contains(&lesson.id))
        .count();

    let status = derive_status(absence.status, uncovered, covered.len(), requests.len());
    Ok(AbsenceOverview {
        absence,
        status,
        lessons_total: uncovered + covered.len(),
        lessons_covered: covered.len(),
        requests,
    })
}

/// Coverage state of an absence from its lesson and request counts.
pub fn derive_status(
    stored: AbsenceStatus,
    uncovered: usize,
    covered: usize,
    requests: usize,
) -> AbsenceStatus {
    if stored == AbsenceStatus::Cancelled {
        AbsenceStatus::Cancelled
    } else if covered == 0 && requests == 0 {
        AbsenceStatus::Pending
    } else if covered == 0 {
        AbsenceStatus::CoverageNeeded
    } else if uncovered > 0 {
        AbsenceStatus::PartiallyCovered
    } else {
        AbsenceStatus::FullyCovered
    }
}

/// Withdraws an absence and every request still waiting for an answer.
/// Lessons that were already reassigned keep their substitute.
pub async fn cancel_absence<S: Store>(
    store: &S,
    sink: &dyn NotificationSink,
    actor: &Actor,
    id: Uuid,
) -> StudioResult<TeacherAbsence> {
    actor.require_admin()?;
    let mut tx = store.begin().await?;
    let mut absence = tx
        .get_absence(id)
        .await?
        .ok_or_else(|| StudioError::not_found("Absence", id))?;
    if absence.status == AbsenceStatus::Cancelled {
        return Err(StudioError::Validation(format!(
            "absence {id} is already cancelled"
        )));
    }
    absence.status = AbsenceStatus::Cancelled;
    tx.update_absence(&absence).await?;

    let mut notifications = Vec::new();
    for mut request in tx.requests_for_absence(id).await? {
        if !request.status.is_open() {
            continue;
        }
        request.status = SubstituteStatus::Cancelled;
        request.notes = Some("The absence was withdrawn".to_string());
        request.updated_at = Utc::now();
        tx.update_substitute_request(&request).await?;
        if let Some(teacher) = tx.get_teacher(request.substitute_teacher_id).await? {
            notifications.push(Notification {
                user_id: teacher.user_id,
                kind: NotificationKind::SubstituteCancelled,
                title: "Substitute request withdrawn".to_string(),
                message: format!(
                    "The lesson on {} at {} no longer needs a substitute.",
                    request.lesson_date, request.start_time
                ),
                link: Some(format!("/substitute-requests/{}", request.id)),
            });
        }
    }
    tx.commit().await?;
    info!(absence_id = %absence.id, "absence cancelled");

    dispatch(sink, notifications).await;
    Ok(absence)
}
