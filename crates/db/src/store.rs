//! PostgreSQL implementation of the core store traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use sqlx::{Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use studiosync_core::conflict::ResourceKind;
use studiosync_core::errors::SerializationFailure;
use studiosync_core::models::absence::TeacherAbsence;
use studiosync_core::models::lesson::{Lesson, LessonFilter};
use studiosync_core::models::people::{Room, StudentProfile, TeacherProfile};
use studiosync_core::models::schedule::RecurringSchedule;
use studiosync_core::models::substitute::SubstituteRequest;
use studiosync_core::store::{Store, StoreTx};

use crate::DbPool;
use crate::models::convert_all;
use crate::repositories::{absences, lessons, people, schedules, substitutes};

/// SQLSTATE codes after which the transaction lost a race and may be retried.
const RETRYABLE_CODES: [&str; 3] = [
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "23505", // unique_violation
];

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

/// Turns a database error into a report, tagging lost races with
/// [`SerializationFailure`] so they surface as a conflict.
pub fn classify(err: sqlx::Error) -> eyre::Report {
    if let sqlx::Error::Database(db) = &err {
        if let Some(code) = db.code() {
            if RETRYABLE_CODES.contains(&&*code) {
                warn!(%code, "transaction lost a concurrent race: {db}");
                return eyre::Report::new(SerializationFailure)
                    .wrap_err(format!("database refused the transaction ({code})"));
            }
        }
    }
    eyre::Report::new(err)
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx> {
        let mut tx = self.pool.begin().await.map_err(classify)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        Ok(PgTx { tx })
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(classify)
    }

    async fn get_room(&mut self, id: Uuid) -> Result<Option<Room>> {
        let row = people::get_room(&mut *self.tx, id).await.map_err(classify)?;
        Ok(row.map(Room::from))
    }

    async fn get_teacher(&mut self, id: Uuid) -> Result<Option<TeacherProfile>> {
        let row = people::get_teacher(&mut *self.tx, id).await.map_err(classify)?;
        Ok(row.map(TeacherProfile::from))
    }

    async fn get_student(&mut self, id: Uuid) -> Result<Option<StudentProfile>> {
        let row = people::get_student(&mut *self.tx, id).await.map_err(classify)?;
        Ok(row.map(StudentProfile::from))
    }

    async fn teachers_for_instrument(&mut self, instrument: &str) -> Result<Vec<TeacherProfile>> {
        let rows = people::teachers_for_instrument(&mut *self.tx, instrument)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(TeacherProfile::from).collect())
    }

    async fn completed_lesson_count(&mut self, teacher_id: Uuid) -> Result<i64> {
        lessons::completed_lesson_count(&mut *self.tx, teacher_id)
            .await
            .map_err(classify)
    }

    async fn get_lesson(&mut self, id: Uuid) -> Result<Option<Lesson>> {
        let row = lessons::get_lesson(&mut *self.tx, id).await.map_err(classify)?;
        row.map(Lesson::try_from).transpose()
    }

    async fn lock_lesson(&mut self, id: Uuid) -> Result<Option<Lesson>> {
        debug!(lesson_id = %id, "locking lesson row");
        let row = lessons::lock_lesson(&mut *self.tx, id).await.map_err(classify)?;
        row.map(Lesson::try_from).transpose()
    }

    async fn active_lessons_on(
        &mut self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Lesson>> {
        let rows = lessons::active_lessons_on(&mut *self.tx, kind, resource_id, date)
            .await
            .map_err(classify)?;
        convert_all(rows)
    }

    async fn lesson_exists(
        &mut self,
        schedule_id: Uuid,
        teacher_id: Uuid,
        student_id: Uuid,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool> {
        lessons::lesson_exists(&mut *self.tx, schedule_id, teacher_id, student_id, room_id, date)
            .await
            .map_err(classify)
    }

    async fn find_lessons(&mut self, filter: &LessonFilter) -> Result<Vec<Lesson>> {
        let rows = lessons::find_lessons(&mut *self.tx, filter)
            .await
            .map_err(classify)?;
        convert_all(rows)
    }

    async fn insert_lesson(&mut self, lesson: &Lesson) -> Result<()> {
        lessons::insert_lesson(&mut *self.tx, lesson)
            .await
            .map_err(classify)
    }

    async fn update_lesson(&mut self, lesson: &Lesson) -> Result<()> {
        lessons::update_lesson(&mut *self.tx, lesson)
            .await
            .map_err(classify)
    }

    async fn reassign_teacher(
        &mut self,
        lesson_id: Uuid,
        expected_teacher: Uuid,
        new_teacher: Uuid,
    ) -> Result<bool> {
        lessons::reassign_teacher(&mut *self.tx, lesson_id, expected_teacher, new_teacher)
            .await
            .map_err(classify)
    }

    async fn get_schedule(&mut self, id: Uuid) -> Result<Option<RecurringSchedule>> {
        let row = schedules::get_schedule(&mut *self.tx, id)
            .await
            .map_err(classify)?;
        Ok(row.map(RecurringSchedule::from))
    }

    async fn active_schedules_on(
        &mut self,
        kind: ResourceKind,
        resource_id: Uuid,
        day_of_week: i16,
    ) -> Result<Vec<RecurringSchedule>> {
        let rows = schedules::active_schedules_on(&mut *self.tx, kind, resource_id, day_of_week)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(RecurringSchedule::from).collect())
    }

    async fn insert_schedule(&mut self, schedule: &RecurringSchedule) -> Result<()> {
        schedules::insert_schedule(&mut *self.tx, schedule)
            .await
            .map_err(classify)
    }

    async fn update_schedule(&mut self, schedule: &RecurringSchedule) -> Result<()> {
        schedules::update_schedule(&mut *self.tx, schedule)
            .await
            .map_err(classify)
    }

    async fn get_absence(&mut self, id: Uuid) -> Result<Option<TeacherAbsence>> {
        let row = absences::get_absence(&mut *self.tx, id)
            .await
            .map_err(classify)?;
        row.map(TeacherAbsence::try_from).transpose()
    }

    async fn absences_covering(
        &mut self,
        teacher_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TeacherAbsence>> {
        let rows = absences::absences_covering(&mut *self.tx, teacher_id, date)
            .await
            .map_err(classify)?;
        convert_all(rows)
    }

    async fn insert_absence(&mut self, absence: &TeacherAbsence) -> Result<()> {
        absences::insert_absence(&mut *self.tx, absence)
            .await
            .map_err(classify)
    }

    async fn update_absence(&mut self, absence: &TeacherAbsence) -> Result<()> {
        absences::update_absence(&mut *self.tx, absence)
            .await
            .map_err(classify)
    }

    async fn get_substitute_request(&mut self, id: Uuid) -> Result<Option<SubstituteRequest>> {
        let row = substitutes::get_substitute_request(&mut *self.tx, id)
            .await
            .map_err(classify)?;
        row.map(SubstituteRequest::try_from).transpose()
    }

    async fn requests_for_lesson(&mut self, lesson_id: Uuid) -> Result<Vec<SubstituteRequest>> {
        let rows = substitutes::requests_for_lesson(&mut *self.tx, lesson_id)
            .await
            .map_err(classify)?;
        convert_all(rows)
    }

    async fn requests_for_absence(&mut self, absence_id: Uuid) -> Result<Vec<SubstituteRequest>> {
        let rows = substitutes::requests_for_absence(&mut *self.tx, absence_id)
            .await
            .map_err(classify)?;
        convert_all(rows)
    }

    async fn insert_substitute_request(&mut self, request: &SubstituteRequest) -> Result<()> {
        substitutes::insert_substitute_request(&mut *self.tx, request)
            .await
            .map_err(classify)
    }

    async fn update_substitute_request(&mut self, request: &SubstituteRequest) -> Result<()> {
        substitutes::update_substitute_request(&mut *self.tx, request)
            .await
            .map_err(classify)
    }
}
