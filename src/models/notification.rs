use crate::utils::serde_helpers::record_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Comment,
    Like,
}

/// An event on a post, addressed to whoever owns that post. `user_id` is the
/// actor who triggered the event, never the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(with = "record_id")]
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub content: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub post_id: String,
    pub actor_id: String,
    pub notification_type: NotificationType,
    pub content: Option<String>,
}

/// Flat feed row: actor and post are projected inline so the client renders
/// it without further lookups.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    pub article_title: Option<String>,
    pub post_id: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}
