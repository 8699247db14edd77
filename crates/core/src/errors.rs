use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::conflict::ResourceKind;
use crate::time::TimeOfDay;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization error: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(Conflict),

    #[error("Database error: {0}")]
    Database(eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type StudioResult<T> = Result<T, StudioError>;

/// Why a write was refused because of what is already stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// A lesson would overlap another non-cancelled lesson in the same lane.
    DoubleBooked {
        lane: ResourceKind,
        resource_id: Uuid,
        resource_name: String,
        with_name: String,
        existing_id: Uuid,
        start: TimeOfDay,
        end: TimeOfDay,
    },
    /// A recurring schedule would overlap another active schedule on the same weekday.
    ScheduleOverlap {
        lane: ResourceKind,
        resource_id: Uuid,
        resource_name: String,
        with_name: String,
        existing_id: Uuid,
        start: TimeOfDay,
        end: TimeOfDay,
    },
    /// Another substitute already took this lesson.
    AlreadyCovered { lesson_id: Uuid },
    /// The store aborted the transaction because a concurrent one won.
    ConcurrentModification,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::DoubleBooked {
                lane,
                resource_name,
                with_name,
                start,
                end,
                ..
            } => write!(
                f,
                "{lane} '{resource_name}' is already booked with {with_name} from {start} to {end}"
            ),
            Conflict::ScheduleOverlap {
                lane,
                resource_name,
                with_name,
                start,
                end,
                ..
            } => write!(
                f,
                "{lane} '{resource_name}' already has a weekly schedule with {with_name} from {start} to {end}"
            ),
            Conflict::AlreadyCovered { lesson_id } => {
                write!(f, "lesson {lesson_id} is already covered by another teacher")
            }
            Conflict::ConcurrentModification => {
                write!(f, "the record was changed by a concurrent request, please retry")
            }
        }
    }
}

/// Marker a store attaches to an [`eyre::Report`] when the database refused to
/// serialize a transaction. It surfaces as [`Conflict::ConcurrentModification`].
#[derive(Error, Debug, Clone, Copy)]
#[error("transaction could not be serialized")]
pub struct SerializationFailure;

impl From<eyre::Report> for StudioError {
    fn from(report: eyre::Report) -> Self {
        if report.downcast_ref::<SerializationFailure>().is_some() {
            StudioError::Conflict(Conflict::ConcurrentModification)
        } else {
            StudioError::Database(report)
        }
    }
}

impl From<Conflict> for StudioError {
    fn from(conflict: Conflict) -> Self {
        StudioError::Conflict(conflict)
    }
}

impl StudioError {
    pub fn not_found(what: &str, id: Uuid) -> Self {
        StudioError::NotFound(format!("{what} with ID {id} not found"))
    }
}
