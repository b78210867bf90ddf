use crate::utils::serde_helpers::record_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostLike {
    #[serde(with = "record_id")]
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Result of toggling a like: the caller's new state plus the fresh total.
#[derive(Debug, Clone, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub like_count: i64,
}
