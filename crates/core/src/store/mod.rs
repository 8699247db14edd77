//! Persistence seam.
//!
//! Every service call opens exactly one transaction with [`Store::begin`],
//! performs its reads and conflict checks through the [`StoreTx`] handle and
//! then commits. Implementations must make a committed transaction appear to
//! have run alone: PostgreSQL through `SERIALIZABLE` isolation, the in-memory
//! store by holding its lock for the lifetime of the transaction. Dropping a
//! transaction without committing discards its writes.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use uuid::Uuid;

use crate::conflict::ResourceKind;
use crate::models::absence::TeacherAbsence;
use crate::models::lesson::{Lesson, LessonFilter};
use crate::models::people::{Room, StudentProfile, TeacherProfile};
use crate::models::schedule::RecurringSchedule;
use crate::models::substitute::SubstituteRequest;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Tx: StoreTx;

    async fn begin(&self) -> Result<Self::Tx>;
}

#[async_trait]
pub trait StoreTx: Send + Sized {
    async fn commit(self) -> Result<()>;

    // People and rooms

    async fn get_room(&mut self, id: Uuid) -> Result<Option<Room>>;
    async fn get_teacher(&mut self, id: Uuid) -> Result<Option<TeacherProfile>>;
    async fn get_student(&mut self, id: Uuid) -> Result<Option<StudentProfile>>;
    /// Active teachers whose instrument list contains `instrument`.
    async fn teachers_for_instrument(&mut self, instrument: &str) -> Result<Vec<TeacherProfile>>;
    async fn completed_lesson_count(&mut self, teacher_id: Uuid) -> Result<i64>;

    // Lessons

    async fn get_lesson(&mut self, id: Uuid) -> Result<Option<Lesson>>;
    /// Like [`StoreTx::get_lesson`] but keeps the row locked until commit.
    async fn lock_lesson(&mut self, id: Uuid) -> Result<Option<Lesson>>;
    /// Non-cancelled lessons of one resource on one date, ordered by start time.
    async fn active_lessons_on(
        &mut self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Lesson>>;
    /// Any lesson, in any status, on `date` that was materialized from
    /// `schedule_id` or books this exact teacher/student/room. Substitution
    /// changes the teacher, so the schedule link is what survives it.
    async fn lesson_exists(
        &mut self,
        schedule_id: Uuid,
        teacher_id: Uuid,
        student_id: Uuid,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool>;
    /// Matching lessons ordered by date then start time.
    async fn find_lessons(&mut self, filter: &LessonFilter) -> Result<Vec<Lesson>>;
    async fn insert_lesson(&mut self, lesson: &Lesson) -> Result<()>;
    async fn update_lesson(&mut self, lesson: &Lesson) -> Result<()>;
    /// Sets `teacher_id` to `new_teacher` only if it currently equals
    /// `expected_teacher`. Returns whether the swap happened.
    async fn reassign_teacher(
        &mut self,
        lesson_id: Uuid,
        expected_teacher: Uuid,
        new_teacher: Uuid,
    ) -> Result<bool>;

    // Recurring schedules

    async fn get_schedule(&mut self, id: Uuid) -> Result<Option<RecurringSchedule>>;
    /// Active schedules of one resource on one weekday.
    async fn active_schedules_on(
        &mut self,
        kind: ResourceKind,
        resource_id: Uuid,
        day_of_week: i16,
    ) -> Result<Vec<RecurringSchedule>>;
    async fn insert_schedule(&mut self, schedule: &RecurringSchedule) -> Result<()>;
    async fn update_schedule(&mut self, schedule: &RecurringSchedule) -> Result<()>;

    // Absences

    async fn get_absence(&mut self, id: Uuid) -> Result<Option<TeacherAbsence>>;
    /// Non-cancelled absences of `teacher_id` whose range contains `date`.
    async fn absences_covering(
        &mut self,
        teacher_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TeacherAbsence>>;
    async fn insert_absence(&mut self, absence: &TeacherAbsence) -> Result<()>;
    async fn update_absence(&mut self, absence: &TeacherAbsence) -> Result<()>;

    // Substitute requests

    async fn get_substitute_request(&mut self, id: Uuid) -> Result<Option<SubstituteRequest>>;
    async fn requests_for_lesson(&mut self, lesson_id: Uuid) -> Result<Vec<SubstituteRequest>>;
    async fn requests_for_absence(&mut self, absence_id: Uuid) -> Result<Vec<SubstituteRequest>>;
    async fn insert_substitute_request(&mut self, request: &SubstituteRequest) -> Result<()>;
    async fn update_substitute_request(&mut self, request: &SubstituteRequest) -> Result<()>;
}
