//! In-process [`Store`] used by tests and local development.
//!
//! A transaction takes the store's async mutex for its whole lifetime and
//! works on a private copy of the state, so concurrent callers queue up
//! behind each other and a dropped transaction leaves nothing behind.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Store, StoreTx};
use crate::conflict::ResourceKind;
use crate::models::absence::{AbsenceStatus, TeacherAbsence};
use crate::models::lesson::{Lesson, LessonFilter, LessonStatus};
use crate::models::people::{Room, StudentProfile, TeacherProfile};
use crate::models::schedule::RecurringSchedule;
use crate::models::substitute::SubstituteRequest;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    rooms: HashMap<Uuid, Room>,
    teachers: HashMap<Uuid, TeacherProfile>,
    students: HashMap<Uuid, StudentProfile>,
    lessons: HashMap<Uuid, Lesson>,
    schedules: HashMap<Uuid, RecurringSchedule>,
    absences: HashMap<Uuid, TeacherAbsence>,
    requests: HashMap<Uuid, SubstituteRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_room(&self, room: Room) {
        self.state.lock().await.rooms.insert(room.id, room);
    }

    pub async fn add_teacher(&self, teacher: TeacherProfile) {
        self.state.lock().await.teachers.insert(teacher.id, teacher);
    }

    pub async fn add_student(&self, student: StudentProfile) {
        self.state.lock().await.students.insert(student.id, student);
    }

    /// All stored lessons ordered by date and start time.
    pub async fn lessons(&self) -> Vec<Lesson> {
        let state = self.state.lock().await;
        sorted_lessons(state.lessons.values().cloned().collect())
    }

    pub async fn lesson(&self, id: Uuid) -> Option<Lesson> {
        self.state.lock().await.lessons.get(&id).cloned()
    }

    pub async fn substitute_request(&self, id: Uuid) -> Option<SubstituteRequest> {
        self.state.lock().await.requests.get(&id).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

fn sorted_lessons(mut lessons: Vec<Lesson>) -> Vec<Lesson> {
    lessons.sort_by(|a, b| (a.date, a.start_time, a.id).cmp(&(b.date, b.start_time, b.id)));
    lessons
}

fn sorted_requests(mut requests: Vec<SubstituteRequest>) -> Vec<SubstituteRequest> {
    requests.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    requests
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(self) -> Result<()> {
        let MemoryTx { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn get_room(&mut self, id: Uuid) -> Result<Option<Room>> {
        Ok(self.staged.rooms.get(&id).cloned())
    }

    async fn get_teacher(&mut self, id: Uuid) -> Result<Option<TeacherProfile>> {
        Ok(self.staged.teachers.get(&id).cloned())
    }

    async fn get_student(&mut self, id: Uuid) -> Result<Option<StudentProfile>> {
        Ok(self.staged.students.get(&id).cloned())
    }

    async fn teachers_for_instrument(&mut self, instrument: &str) -> Result<Vec<TeacherProfile>> {
        let mut teachers: Vec<_> = self
            .staged
            .teachers
            .values()
            .filter(|t| t.is_active && t.teaches(instrument))
            .cloned()
            .collect();
        teachers.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(teachers)
    }

    async fn completed_lesson_count(&mut self, teacher_id: Uuid) -> Result<i64> {
        let count = self
            .staged
            .lessons
            .values()
            .filter(|l| l.teacher_id == teacher_id && l.status == LessonStatus::Completed)
            .count();
        Ok(count as i64)
    }

    async fn get_lesson(&mut self, id: Uuid) -> Result<Option<Lesson>> {
        Ok(self.staged.lessons.get(&id).cloned())
    }

    async fn lock_lesson(&mut self, id: Uuid) -> Result<Option<Lesson>> {
        // The whole store is already held by this transaction.
        self.get_lesson(id).await
    }

    async fn active_lessons_on(
        &mut self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Lesson>> {
        let lessons = self
            .staged
            .lessons
            .values()
            .filter(|l| l.date == date && l.occupies_slot() && l.resource_id(kind) == resource_id)
            .cloned()
            .collect();
        Ok(sorted_lessons(lessons))
    }

    async fn lesson_exists(
        &mut self,
        schedule_id: Uuid,
        teacher_id: Uuid,
        student_id: Uuid,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool> {
        Ok(self.staged.lessons.values().any(|l| {
            l.date == date
                && (l.schedule_id == Some(schedule_id)
                    || (l.teacher_id == teacher_id
                        && l.student_id == student_id
                        && l.room_id == room_id))
        }))
    }

    async fn find_lessons(&mut self, filter: &LessonFilter) -> Result<Vec<Lesson>> {
        let lessons = self
            .staged
            .lessons
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        Ok(sorted_lessons(lessons))
    }

    async fn insert_lesson(&mut self, lesson: &Lesson) -> Result<()> {
        if self.staged.lessons.contains_key(&lesson.id) {
            eyre::bail!("lesson {} already exists", lesson.id);
        }
        self.staged.lessons.insert(lesson.id, lesson.clone());
        Ok(())
    }

    async fn update_lesson(&mut self, lesson: &Lesson) -> Result<()> {
        match self.staged.lessons.get_mut(&lesson.id) {
            Some(slot) => {
                *slot = lesson.clone();
                Ok(())
            }
            None => eyre::bail!("lesson {} does not exist", lesson.id),
        }
    }

    async fn reassign_teacher(
        &mut self,
        lesson_id: Uuid,
        expected_teacher: Uuid,
        new_teacher: Uuid,
    ) -> Result<bool> {
        match self.staged.lessons.get_mut(&lesson_id) {
            Some(lesson) if lesson.teacher_id == expected_teacher => {
                lesson.teacher_id = new_teacher;
                lesson.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_schedule(&mut self, id: Uuid) -> Result<Option<RecurringSchedule>> {
        Ok(self.staged.schedules.get(&id).cloned())
    }

    async fn active_schedules_on(
        &mut self,
        kind: ResourceKind,
        resource_id: Uuid,
        day_of_week: i16,
    ) -> Result<Vec<RecurringSchedule>> {
        let mut schedules: Vec<_> = self
            .staged
            .schedules
            .values()
            .filter(|s| {
                s.is_active && s.day_of_week == day_of_week && s.resource_id(kind) == resource_id
            })
            .cloned()
            .collect();
        schedules.sort_by_key(|s| (s.start_time, s.id));
        Ok(schedules)
    }

    async fn insert_schedule(&mut self, schedule: &RecurringSchedule) -> Result<()> {
        self.staged.schedules.insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn update_schedule(&mut self, schedule: &RecurringSchedule) -> Result<()> {
        match self.staged.schedules.get_mut(&schedule.id) {
            Some(slot) => {
                *slot = schedule.clone();
                Ok(())
            }
            None => eyre::bail!("schedule {} does not exist", schedule.id),
        }
    }

    async fn get_absence(&mut self, id: Uuid) -> Result<Option<TeacherAbsence>> {
        Ok(self.staged.absences.get(&id).cloned())
    }

    async fn absences_covering(
        &mut self,
        teacher_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TeacherAbsence>> {
        Ok(self
            .staged
            .absences
            .values()
            .filter(|a| {
                a.teacher_id == teacher_id && a.status != AbsenceStatus::Cancelled && a.covers(date)
            })
            .cloned()
            .collect())
    }

    async fn insert_absence(&mut self, absence: &TeacherAbsence) -> Result<()> {
        self.staged.absences.insert(absence.id, absence.clone());
        Ok(())
    }

    async fn update_absence(&mut self, absence: &TeacherAbsence) -> Result<()> {
        match self.staged.absences.get_mut(&absence.id) {
            Some(slot) => {
                *slot = absence.clone();
                Ok(())
            }
            None => eyre::bail!("absence {} does not exist", absence.id),
        }
    }

    async fn get_substitute_request(&mut self, id: Uuid) -> Result<Option<SubstituteRequest>> {
        Ok(self.staged.requests.get(&id).cloned())
    }

    async fn requests_for_lesson(&mut self, lesson_id: Uuid) -> Result<Vec<SubstituteRequest>> {
        let requests = self
            .staged
            .requests
            .values()
            .filter(|r| r.lesson_id == lesson_id)
            .cloned()
            .collect();
        Ok(sorted_requests(requests))
    }

    async fn requests_for_absence(&mut self, absence_id: Uuid) -> Result<Vec<SubstituteRequest>> {
        let requests = self
            .staged
            .requests
            .values()
            .filter(|r| r.absence_id == absence_id)
            .cloned()
            .collect();
        Ok(sorted_requests(requests))
    }

    async fn insert_substitute_request(&mut self, request: &SubstituteRequest) -> Result<()> {
        self.staged.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn update_substitute_request(&mut self, request: &SubstituteRequest) -> Result<()> {
        match self.staged.requests.get_mut(&request.id) {
            Some(slot) => {
                *slot = request.clone();
                Ok(())
            }
            None => eyre::bail!("substitute request {} does not exist", request.id),
        }
    }
}
