#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use serde_json::{Value, json};
use studiosync_api::{
    ApiState, app,
    middleware::auth::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER},
};
use studiosync_core::{
    config::SchedulingConfig,
    models::people::{Actor, Room, StudentProfile, TeacherProfile},
    notify::{LogSink, NotificationSink},
    store::memory::MemoryStore,
};
use uuid::Uuid;

/// Router over a seeded in-memory store.
pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryStore,
    pub admin: Actor,
    pub room: Room,
    pub other_room: Room,
    pub teacher: TeacherProfile,
    pub substitutes: Vec<TeacherProfile>,
    pub student: StudentProfile,
    pub other_student: StudentProfile,
}

pub fn scheduling() -> SchedulingConfig {
    SchedulingConfig {
        initial_horizon_days: 14,
        max_range_days: 90,
    }
}

fn teacher(name: &str) -> TeacherProfile {
    TeacherProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        display_name: name.to_string(),
        instruments: vec!["piano".to_string()],
        is_active: true,
    }
}

fn student(name: &str) -> StudentProfile {
    StudentProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        display_name: name.to_string(),
        instruments: vec!["piano".to_string()],
    }
}

fn room(name: &str) -> Room {
    Room {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_active: true,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_sink(Arc::new(LogSink)).await
    }

    pub async fn with_sink(sink: Arc<dyn NotificationSink>) -> Self {
        let store = MemoryStore::new();
        let room_a = room("Studio A");
        let room_b = room("Studio B");
        let teacher_p = teacher("Priya");
        let substitutes = vec![teacher("Marco"), teacher("Lena")];
        let student_j = student("Jonah");
        let student_k = student("Kai");

        store.add_room(room_a.clone()).await;
        store.add_room(room_b.clone()).await;
        store.add_teacher(teacher_p.clone()).await;
        for t in &substitutes {
            store.add_teacher(t.clone()).await;
        }
        store.add_student(student_j.clone()).await;
        store.add_student(student_k.clone()).await;

        let state = Arc::new(ApiState::new(store.clone(), sink, scheduling()));
        let server = TestServer::new(app(state)).expect("test server");

        Self {
            server,
            store,
            admin: Actor::admin(Uuid::new_v4()),
            room: room_a,
            other_room: room_b,
            teacher: teacher_p,
            substitutes,
            student: student_j,
            other_student: student_k,
        }
    }

    /// Priya teaching Jonah in Studio A.
    pub fn lesson_body(&self, date: &str, start: &str, end: &str) -> Value {
        json!({
            "teacher_id": self.teacher.id,
            "student_id": self.student.id,
            "room_id": self.room.id,
            "instrument": "piano",
            "date": date,
            "start_time": start,
            "end_time": end,
        })
    }

    pub async fn book(&self, date: &str, start: &str, end: &str) -> Value {
        self.server
            .post("/api/lessons")
            .json(&self.lesson_body(date, start, end))
            .acting_as(&self.admin)
            .await
            .json()
    }
}

pub trait ActingAs {
    fn acting_as(self, actor: &Actor) -> Self;
}

impl ActingAs for TestRequest {
    fn acting_as(self, actor: &Actor) -> Self {
        let role = if actor.is_admin() { "admin" } else { "teacher" };
        self.add_header(
            HeaderName::from_static(ACTOR_ID_HEADER),
            HeaderValue::from_str(&actor.user_id.to_string()).expect("uuid header"),
        )
        .add_header(
            HeaderName::from_static(ACTOR_ROLE_HEADER),
            HeaderValue::from_static(role),
        )
    }
}
