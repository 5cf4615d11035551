// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fire-and-forget side effects.
//!
//! Failures here are logged and never undo the state change that
//! triggered them.

use crate::store::StoreError;
use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

/// Category shown in the user's notification list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// About an order.
    Order,
    /// About a payment.
    Payment,
}

impl NotificationKind {
    /// Returns the string representation used by the store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Payment => "payment",
        }
    }
}

/// A message for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Recipient.
    pub user_id: Uuid,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Category.
    pub kind: NotificationKind,
    /// The order or payment this is about.
    pub related_id: Option<Uuid>,
}

/// Receives user notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Records a notification.
    async fn notify(&self, notification: Notification) -> Result<(), StoreError>;
}

/// Maintains cleaner job counters.
#[async_trait]
pub trait CleanerStats: Send + Sync {
    /// Counts one more completed job for the cleaner.
    async fn record_completed_job(&self, cleaner_id: Uuid) -> Result<(), StoreError>;
}

/// Delivers a notification, logging instead of failing.
pub async fn send_quietly(sink: &dyn NotificationSink, notification: Notification) {
    let user_id = notification.user_id;
    let related_id = notification.related_id;
    if let Err(e) = sink.notify(notification).await {
        warn!(%user_id, ?related_id, error = %e, "Failed to record notification");
    }
}
