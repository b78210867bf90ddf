use crate::utils::serde_helpers::record_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(with = "record_id")]
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

/// A comment with its author's profile fields flattened next to it, the way
/// the post page renders them.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub name: Option<String>,
    pub username: Option<String>,
    pub profile_pic: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub comment: String,
}
