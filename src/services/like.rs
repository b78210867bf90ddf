use crate::{
    error::{AppError, Result},
    models::like::*,
    models::notification::{CreateNotificationRequest, NotificationType},
    models::post::Post,
    services::{Database, NotificationService},
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct LikeService {
    db: Arc<Database>,
    notification_service: NotificationService,
}

impl LikeService {
    pub async fn new(db: Arc<Database>, notification_service: NotificationService) -> Result<Self> {
        Ok(Self {
            db,
            notification_service,
        })
    }

    pub async fn count_likes(&self, post_id: &str) -> Result<i64> {
        self.db
            .count(
                "SELECT count() FROM post_like WHERE post_id = $post_id GROUP ALL",
                json!({ "post_id": post_id }),
            )
            .await
    }

    /// Likes the post if the caller has not liked it yet, unlikes it
    /// otherwise. State is decided by an existence check, never inferred from
    /// an insert failure, and repeating the call simply flips back.
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<LikeStatus> {
        let post: Post = self
            .db
            .get_by_id("post", post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        let post_id = post.id.clone();

        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM post_like WHERE post_id = $post_id AND user_id = $user_id",
                json!({ "post_id": post_id, "user_id": user_id }),
            )
            .await?;
        let existing: Vec<PostLike> = response.take(0)?;

        let liked = if existing.is_empty() {
            let like = PostLike {
                id: Uuid::new_v4().to_string(),
                post_id: post_id.clone(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            };
            self.db.create("post_like", like).await?;
            debug!("User {} liked post {}", user_id, post_id);

            if post.user_id != user_id {
                let notification = CreateNotificationRequest {
                    post_id: post_id.clone(),
                    actor_id: user_id.to_string(),
                    notification_type: NotificationType::Like,
                    content: None,
                };

                if let Err(e) = self.notification_service.create_notification(notification).await {
                    warn!("Failed to send like notification: {}", e);
                }
            }
            true
        } else {
            self.db
                .query_with_params(
                    "DELETE post_like WHERE post_id = $post_id AND user_id = $user_id",
                    json!({ "post_id": post_id, "user_id": user_id }),
                )
                .await?;
            debug!("User {} unliked post {}", user_id, post_id);
            false
        };

        let like_count = self.count_likes(&post_id).await?;
        Ok(LikeStatus { liked, like_count })
    }
}
