use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StudioError, StudioResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub instruments: Vec<String>,
    pub is_active: bool,
}

impl TeacherProfile {
    pub fn teaches(&self, instrument: &str) -> bool {
        self.instruments
            .iter()
            .any(|taught| taught.eq_ignore_ascii_case(instrument))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Teacher,
}

/// The already-authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: ActorRole::Admin,
        }
    }

    pub fn teacher(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: ActorRole::Teacher,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    pub fn require_admin(&self) -> StudioResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(StudioError::Forbidden(
                "this action requires an administrator".to_string(),
            ))
        }
    }
}
