use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::conflict::{ResourceKind, has_conflict};
use crate::errors::{StudioError, StudioResult};
use crate::models::people::TeacherProfile;
use crate::store::{Store, StoreTx};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub teacher: TeacherProfile,
    pub completed_lessons: i64,
}

/// Ordering policy for substitute candidates.
pub trait CandidateRanking: Send + Sync {
    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering;
}

/// Most completed lessons first, ties broken by name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByCompletedLessons;

impl CandidateRanking for ByCompletedLessons {
    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        b.completed_lessons
            .cmp(&a.completed_lessons)
            .then_with(|| a.teacher.display_name.cmp(&b.teacher.display_name))
    }
}

impl<F> CandidateRanking for F
where
    F: Fn(&Candidate, &Candidate) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        self(a, b)
    }
}

/// Teachers able to take over `lesson_id`: active, teaching its instrument,
/// not the lesson's own teacher, free at that time and not absent that day.
pub async fn find_candidates<S: Store>(
    store: &S,
    lesson_id: Uuid,
    ranking: &dyn CandidateRanking,
) -> StudioResult<Vec<Candidate>> {
    let mut tx = store.begin().await?;
    let lesson = tx
        .get_lesson(lesson_id)
        .await?
        .ok_or_else(|| StudioError::not_found("Lesson", lesson_id))?;

    let mut candidates = Vec::new();
    for teacher in tx.teachers_for_instrument(&lesson.instrument).await? {
        if teacher.id == lesson.teacher_id {
            continue;
        }
        if has_conflict(
            &mut tx,
            ResourceKind::Teacher,
            teacher.id,
            lesson.date,
            &lesson.range(),
            Some(lesson.id),
        )
        .await?
        {
            debug!(teacher_id = %teacher.id, "candidate busy");
            continue;
        }
        if !tx.absences_covering(teacher.id, lesson.date).await?.is_empty() {
            debug!(teacher_id = %teacher.id, "candidate absent");
            continue;
        }
        let completed_lessons = tx.completed_lesson_count(teacher.id).await?;
        candidates.push(Candidate {
            teacher,
            completed_lessons,
        });
    }

    candidates.sort_by(|a, b| ranking.compare(a, b));
    Ok(candidates)
}
