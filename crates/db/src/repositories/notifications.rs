use sqlx::PgExecutor;
use uuid::Uuid;

use studiosync_core::notify::Notification;

use crate::models::DbNotification;

pub async fn insert_notification<'e, E: PgExecutor<'e>>(
    executor: E,
    notification: &Notification,
) -> sqlx::Result<DbNotification> {
    sqlx::query_as::<_, DbNotification>(
        r#"
        INSERT INTO notifications (id, user_id, kind, title, message, link)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, kind, title, message, link, is_read, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(notification.user_id)
    .bind(notification.kind.as_str())
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.link)
    .fetch_one(executor)
    .await
}

/// Most recent first.
pub async fn notifications_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> sqlx::Result<Vec<DbNotification>> {
    sqlx::query_as::<_, DbNotification>(
        r#"
        SELECT id, user_id, kind, title, message, link, is_read, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
