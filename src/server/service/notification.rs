use sea_orm::DatabaseConnection;

use crate::server::{
    data::notification::NotificationRepository,
    error::AppError,
    model::{notification::Notification, order::Order},
};

pub struct NotificationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NotificationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: i32, unread_only: bool) -> Result<Vec<Notification>, AppError> {
        Ok(NotificationRepository::new(self.db)
            .list(user_id, unread_only)
            .await?)
    }

    pub async fn mark_read(&self, id: i32, user_id: i32) -> Result<(), AppError> {
        if !NotificationRepository::new(self.db)
            .mark_read(id, user_id)
            .await?
        {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }

    /// Marks every notification read, returning how many changed.
    pub async fn mark_all_read(&self, user_id: i32) -> Result<u64, AppError> {
        Ok(NotificationRepository::new(self.db)
            .mark_all_read(user_id)
            .await?)
    }

    /// Records an order event for one party of the order.
    ///
    /// Failures are logged and swallowed so a notification never rolls back the
    /// transition that triggered it.
    pub async fn order_event(&self, order: &Order, recipient_id: i32, message: &str) {
        let title = format!("Order {}", order.tracking_id);

        if let Err(e) = NotificationRepository::new(self.db)
            .create(recipient_id, &title, message)
            .await
        {
            tracing::error!(
                "Failed to notify user {} about order {}: {}",
                recipient_id,
                order.id,
                e
            );
        }
    }
}
