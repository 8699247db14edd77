use async_trait::async_trait;
use tracing::debug;

use studiosync_core::notify::{Notification, NotificationSink};

use crate::DbPool;
use crate::repositories::notifications::insert_notification;

/// Stores notifications in the `notifications` table for the web client to poll.
#[derive(Debug, Clone)]
pub struct PgNotificationSink {
    pool: DbPool,
}

impl PgNotificationSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PgNotificationSink {
    async fn notify(&self, notification: Notification) -> eyre::Result<()> {
        let row = insert_notification(&self.pool, &notification).await?;
        debug!(notification_id = %row.id, user_id = %row.user_id, kind = %row.kind, "notification stored");
        Ok(())
    }
}
