use crate::{
    config::Config,
    error::{AppError, Result},
    models::comment::*,
    models::notification::{CreateNotificationRequest, NotificationType},
    models::post::Post,
    models::user::PublicProfile,
    services::{Database, NotificationService},
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    notification_service: NotificationService,
    max_comment_length: usize,
}

impl CommentService {
    pub async fn new(
        db: Arc<Database>,
        notification_service: NotificationService,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self {
            db,
            notification_service,
            max_comment_length: config.max_comment_length,
        })
    }

    pub async fn list_post_comments(&self, post_id: &str) -> Result<Vec<CommentWithAuthor>> {
        debug!("Getting comments for post: {}", post_id);

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT * FROM comment
                    WHERE post_id = $post_id
                    ORDER BY created_at DESC
                "#,
                json!({ "post_id": post_id }),
            )
            .await?;
        let comments: Vec<Comment> = response.take(0)?;

        let authors = self.fetch_authors(&comments).await?;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.user_id);
                CommentWithAuthor {
                    name: author.map(|a| a.name.clone()),
                    username: author.map(|a| a.username.clone()),
                    profile_pic: author.and_then(|a| a.profile_pic.clone()),
                    role: author.map(|a| a.role.clone()),
                    comment,
                }
            })
            .collect())
    }

    pub async fn create_comment(&self, post_id: &str, user_id: &str, body: &str) -> Result<Comment> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::Validation(
                "Comment content cannot be empty".to_string(),
            ));
        }
        if body.chars().count() > self.max_comment_length {
            return Err(AppError::Validation(format!(
                "Comment content exceeds the maximum length of {} characters",
                self.max_comment_length
            )));
        }

        let post: Post = self
            .db
            .get_by_id("post", post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            post_id: post.id.clone(),
            user_id: user_id.to_string(),
            comment_text: body.to_string(),
            created_at: Utc::now(),
        };

        let created: Comment = self.db.create("comment", comment).await?;

        // the post owner hears about everyone's comments but their own
        if post.user_id != user_id {
            let notification = CreateNotificationRequest {
                post_id: post.id,
                actor_id: user_id.to_string(),
                notification_type: NotificationType::Comment,
                content: Some(body.to_string()),
            };

            if let Err(e) = self.notification_service.create_notification(notification).await {
                warn!("Failed to send comment notification: {}", e);
            }
        }

        Ok(created)
    }

    async fn fetch_authors(&self, comments: &[Comment]) -> Result<HashMap<String, PublicProfile>> {
        let author_ids: Vec<&str> = comments.iter().map(|c| c.user_id.as_str()).collect();
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT meta::id(id) AS id, name, username, role, profile_pic, bio
                    FROM user WHERE meta::id(id) IN $user_ids
                "#,
                json!({ "user_ids": author_ids }),
            )
            .await?;
        let authors: Vec<PublicProfile> = response.take(0)?;
        Ok(authors.into_iter().map(|a| (a.id.clone(), a)).collect())
    }
}
