use crate::utils::serde_helpers::record_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(with = "record_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub image: String,
    pub category_id: String,
    pub description: String,
    pub content: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithCategory {
    #[serde(flatten)]
    pub post: Post,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(url)]
    pub image: String,

    #[validate(length(min = 1))]
    pub category_id: String,

    #[validate(length(max = 500))]
    pub description: String,

    #[validate(length(min = 1))]
    pub content: String,

    pub status: PostStatus,
}

/// The original API replaces the whole post on update, so this mirrors the
/// create payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(url)]
    pub image: String,

    #[validate(length(min = 1))]
    pub category_id: String,

    #[validate(length(max = 500))]
    pub description: String,

    #[validate(length(min = 1))]
    pub content: String,

    pub status: PostStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostQuery {
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub total_posts: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<i64>,
    pub posts: Vec<PostWithCategory>,
}
