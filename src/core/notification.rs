//! Notification business logic - Creating and reading user notifications.

use crate::{
    entities::{Notification, notification, notification::NotificationCategory},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates an unread notification for a user.
///
/// Generic over the connection so order operations can notify inside their
/// own transaction.
pub async fn create_notification<C>(
    db: &C,
    user_id: i64,
    title: impl Into<String>,
    message: impl Into<String>,
    category: NotificationCategory,
    data: Option<Json>,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    notification::ActiveModel {
        user_id: Set(user_id),
        title: Set(title.into()),
        message: Set(message.into()),
        category: Set(category),
        is_read: Set(false),
        data: Set(data),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// All notifications of a user, newest first.
pub async fn get_notifications_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks a notification as read. Marking twice is harmless.
///
/// # Errors
/// Returns an error if the notification does not exist or the update fails.
pub async fn mark_as_read(
    db: &DatabaseConnection,
    notification_id: i64,
) -> Result<notification::Model> {
    let mut notification: notification::ActiveModel = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Notification", notification_id))?
        .into();

    notification.is_read = Set(true);
    notification.update(db).await.map_err(Into::into)
}
