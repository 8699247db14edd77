#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use studiosync_core::models::lesson::NewLesson;
use studiosync_core::models::people::{Actor, Room, StudentProfile, TeacherProfile};
use studiosync_core::notify::{Notification, NotificationSink};
use studiosync_core::store::memory::MemoryStore;
use studiosync_core::time::TimeOfDay;
use uuid::Uuid;

pub fn date(raw: &str) -> NaiveDate {
    raw.parse().expect("valid date")
}

pub fn time(raw: &str) -> TimeOfDay {
    raw.parse().expect("valid time")
}

/// A small school: two rooms, four guitar teachers and two students.
pub struct Studio {
    pub store: MemoryStore,
    pub admin: Actor,
    pub room_r: Room,
    pub room_s: Room,
    pub teacher_t: TeacherProfile,
    pub teacher_u: TeacherProfile,
    pub teacher_v: TeacherProfile,
    pub teacher_w: TeacherProfile,
    pub student_s: StudentProfile,
    pub student_q: StudentProfile,
}

pub fn teacher(name: &str, instruments: &[&str]) -> TeacherProfile {
    TeacherProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        display_name: name.to_string(),
        instruments: instruments.iter().map(|i| i.to_string()).collect(),
        is_active: true,
    }
}

pub fn student(name: &str) -> StudentProfile {
    StudentProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        display_name: name.to_string(),
        instruments: vec!["guitar".to_string()],
    }
}

pub fn room(name: &str) -> Room {
    Room {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_active: true,
    }
}

impl Studio {
    pub async fn new() -> Self {
        let studio = Self {
            store: MemoryStore::new(),
            admin: Actor::admin(Uuid::new_v4()),
            room_r: room("Room R"),
            room_s: room("Room S"),
            teacher_t: teacher("Tara", &["guitar", "piano"]),
            teacher_u: teacher("Uma", &["guitar"]),
            teacher_v: teacher("Victor", &["guitar"]),
            teacher_w: teacher("Wen", &["guitar"]),
            student_s: student("Sam"),
            student_q: student("Quinn"),
        };
        for r in [&studio.room_r, &studio.room_s] {
            studio.store.add_room(r.clone()).await;
        }
        for t in [
            &studio.teacher_t,
            &studio.teacher_u,
            &studio.teacher_v,
            &studio.teacher_w,
        ] {
            studio.store.add_teacher(t.clone()).await;
        }
        for s in [&studio.student_s, &studio.student_q] {
            studio.store.add_student(s.clone()).await;
        }
        studio
    }

    /// Guitar lesson of Tara with Sam in Room R.
    pub fn lesson(&self, day: &str, start: &str, end: &str) -> NewLesson {
        NewLesson {
            teacher_id: self.teacher_t.id,
            student_id: self.student_s.id,
            room_id: self.room_r.id,
            instrument: "guitar".to_string(),
            date: date(day),
            start_time: time(start),
            end_time: time(end),
            duration: None,
        }
    }

    pub fn teacher_actor(&self, teacher: &TeacherProfile) -> Actor {
        Actor::teacher(teacher.user_id)
    }
}

/// Keeps every notification it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn sent_to(&self, user_id: Uuid) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: Notification) -> eyre::Result<()> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}
