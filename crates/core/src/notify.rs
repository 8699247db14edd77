//! Outbound notifications.
//!
//! The workflow hands finished events to a [`NotificationSink`] after its
//! transaction commits. Delivery failures are logged and otherwise ignored:
//! a lost notification never rolls back a committed state change.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SubstituteRequested,
    SubstituteDeclined,
    SubstituteCancelled,
    CoverageConfirmed,
    TeacherChanged,
}

text_enum!(NotificationKind {
    SubstituteRequested => "substitute_requested",
    SubstituteDeclined => "substitute_declined",
    SubstituteCancelled => "substitute_cancelled",
    CoverageConfirmed => "coverage_confirmed",
    TeacherChanged => "teacher_changed",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> eyre::Result<()>;
}

/// Sends every notification, logging the ones the sink rejects.
pub async fn dispatch(sink: &dyn NotificationSink, notifications: Vec<Notification>) {
    for notification in notifications {
        let user_id = notification.user_id;
        let kind = notification.kind;
        if let Err(err) = sink.notify(notification).await {
            warn!(%user_id, %kind, "notification delivery failed: {err:#}");
        }
    }
}

/// Sink that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, notification: Notification) -> eyre::Result<()> {
        tracing::info!(
            user_id = %notification.user_id,
            kind = %notification.kind,
            "{}: {}",
            notification.title,
            notification.message
        );
        Ok(())
    }
}
