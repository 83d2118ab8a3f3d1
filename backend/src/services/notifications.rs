// Notification sink - write side of every user-facing notification

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use lexdesk_shared::Notification;

use crate::store::{LegalStore, NewNotification};

/// Destination for notifications raised as side effects.
///
/// Delivery failures never reach the caller: an implementation logs the
/// failure and returns `None`.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> Option<Notification>;
}

/// Persists notifications through the data store.
#[derive(Clone)]
pub struct StoreNotificationSink {
    store: Arc<dyn LegalStore>,
}

impl StoreNotificationSink {
    pub fn new(store: Arc<dyn LegalStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationSink for StoreNotificationSink {
    async fn notify(&self, notification: NewNotification) -> Option<Notification> {
        let user_id = notification.user_id;
        match self.store.create_notification(notification).await {
            Ok(created) => Some(created),
            Err(e) => {
                warn!("Failed to create notification for user {}: {}", user_id, e);
                None
            }
        }
    }
}
