//! Query functions, one module per table family.
//!
//! Every function takes any PostgreSQL executor so the same query runs on a
//! pool or inside an open transaction, and returns raw `sqlx` results so the
//! caller decides how database errors are classified.

pub mod absences;
pub mod lessons;
pub mod notifications;
pub mod people;
pub mod schedules;
pub mod substitutes;

use studiosync_core::conflict::ResourceKind;

/// Column holding the id of `kind` in the lessons and schedules tables.
pub(crate) fn lane_column(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Room => "room_id",
        ResourceKind::Teacher => "teacher_id",
        ResourceKind::Student => "student_id",
    }
}
