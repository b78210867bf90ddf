use crate::models::user::PublicProfile;
use crate::utils::serde_helpers::record_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A directed message between two users. Rows are never edited or deleted;
/// the only mutation is the `is_read` flip when the receiver fetches the
/// thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(with = "record_id")]
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A message as rendered in a thread, with the sender's profile joined in.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<PublicProfile>,
}

/// One row of the conversation list: the counterpart plus the most recent
/// message and how many of their messages the requester has not read yet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub user: PublicProfile,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "receiverId")]
    pub receiver_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypingRequest {
    #[serde(rename = "receiverId")]
    pub receiver_id: String,
}
