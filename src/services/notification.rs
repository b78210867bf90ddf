use crate::{
    error::Result,
    models::notification::*,
    models::user::PublicProfile,
    services::Database,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// The feed is capped; older events fall off the end.
const FEED_LIMIT: usize = 50;

#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
}

#[derive(Debug, Deserialize)]
struct PostTitle {
    id: String,
    title: String,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// Called by the comment/like write paths as a side effect of their own
    /// insert.
    pub async fn create_notification(&self, request: CreateNotificationRequest) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            post_id: request.post_id,
            user_id: request.actor_id,
            notification_type: request.notification_type,
            content: request.content,
            is_read: false,
            created_at: Utc::now(),
        };

        let created: Notification = self.db.create("notification", notification).await?;
        debug!("Created {:?} notification for post {}", created.notification_type, created.post_id);
        Ok(created)
    }

    /// Feed for an admin, scoped to events on their own posts. An admin with
    /// no posts gets an empty list without touching the notification table.
    pub async fn list_notifications(&self, admin_id: &str) -> Result<Vec<NotificationView>> {
        let post_ids = self.owned_post_ids(admin_id).await?;
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT * FROM notification
                    WHERE post_id IN $post_ids
                    ORDER BY created_at DESC
                    LIMIT $limit
                "#,
                json!({ "post_ids": post_ids, "limit": FEED_LIMIT }),
            )
            .await?;
        let notifications: Vec<Notification> = response.take(0)?;

        let actors = self.fetch_actors(&notifications).await?;
        let titles = self.fetch_post_titles(&notifications).await?;

        Ok(project_feed(notifications, &actors, &titles))
    }

    /// Unread badge count. Degrades to zero on any failure, including the
    /// ownership resolution step.
    pub async fn count_unread(&self, admin_id: &str) -> i64 {
        match self.count_unread_inner(admin_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count unread notifications for {}: {}", admin_id, e);
                0
            }
        }
    }

    async fn count_unread_inner(&self, admin_id: &str) -> Result<i64> {
        let post_ids = self.owned_post_ids(admin_id).await?;
        if post_ids.is_empty() {
            return Ok(0);
        }

        self.db
            .count(
                "SELECT count() FROM notification WHERE post_id IN $post_ids AND is_read = false GROUP ALL",
                json!({ "post_ids": post_ids }),
            )
            .await
    }

    /// `unread -> read` is the only transition; re-marking an already-read
    /// row (or a missing one) is a no-op, not an error.
    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        self.db
            .update_by_id_with_json::<serde_json::Value>(
                "notification",
                notification_id,
                json!({ "is_read": true }),
            )
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, admin_id: &str) -> Result<()> {
        let post_ids = self.owned_post_ids(admin_id).await?;
        if post_ids.is_empty() {
            return Ok(());
        }

        self.db
            .query_with_params(
                "UPDATE notification SET is_read = true WHERE post_id IN $post_ids AND is_read = false",
                json!({ "post_ids": post_ids }),
            )
            .await?;
        Ok(())
    }

    async fn owned_post_ids(&self, owner_id: &str) -> Result<Vec<String>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT VALUE meta::id(id) FROM post WHERE user_id = $user_id",
                json!({ "user_id": owner_id }),
            )
            .await?;
        let ids: Vec<String> = response.take(0)?;
        Ok(ids)
    }

    async fn fetch_actors(
        &self,
        notifications: &[Notification],
    ) -> Result<HashMap<String, PublicProfile>> {
        let actor_ids: Vec<&str> = notifications.iter().map(|n| n.user_id.as_str()).collect();
        if actor_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT meta::id(id) AS id, name, username, role, profile_pic, bio
                    FROM user WHERE meta::id(id) IN $user_ids
                "#,
                json!({ "user_ids": actor_ids }),
            )
            .await?;
        let actors: Vec<PublicProfile> = response.take(0)?;
        Ok(actors.into_iter().map(|a| (a.id.clone(), a)).collect())
    }

    async fn fetch_post_titles(
        &self,
        notifications: &[Notification],
    ) -> Result<HashMap<String, String>> {
        let post_ids: Vec<&str> = notifications.iter().map(|n| n.post_id.as_str()).collect();
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT meta::id(id) AS id, title FROM post WHERE meta::id(id) IN $post_ids",
                json!({ "post_ids": post_ids }),
            )
            .await?;
        let titles: Vec<PostTitle> = response.take(0)?;
        Ok(titles.into_iter().map(|t| (t.id, t.title)).collect())
    }
}

/// Flattens stored rows into feed rows. Actors or posts that no longer
/// resolve leave their fields empty rather than dropping the event.
fn project_feed(
    notifications: Vec<Notification>,
    actors: &HashMap<String, PublicProfile>,
    titles: &HashMap<String, String>,
) -> Vec<NotificationView> {
    notifications
        .into_iter()
        .map(|n| NotificationView {
            id: n.id,
            notification_type: n.notification_type,
            user_name: actors.get(&n.user_id).map(|a| a.name.clone()),
            user_avatar: actors.get(&n.user_id).and_then(|a| a.profile_pic.clone()),
            article_title: titles.get(&n.post_id).cloned(),
            post_id: n.post_id,
            content: n.content,
            created_at: n.created_at,
            is_read: n.is_read,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str, avatar: Option<&str>) -> PublicProfile {
        PublicProfile {
            id: id.to_string(),
            name: name.to_string(),
            username: name.to_lowercase(),
            role: "user".to_string(),
            profile_pic: avatar.map(String::from),
            bio: None,
        }
    }

    fn notification(id: &str, actor: &str, post: &str, kind: NotificationType) -> Notification {
        Notification {
            id: id.to_string(),
            post_id: post.to_string(),
            user_id: actor.to_string(),
            notification_type: kind,
            content: matches!(kind, NotificationType::Comment).then(|| "nice post".to_string()),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn feed_rows_carry_actor_and_post_projection() {
        let mut actors = HashMap::new();
        actors.insert("amy".to_string(), profile("amy", "Amy", Some("https://cdn/amy.png")));
        let mut titles = HashMap::new();
        titles.insert("p1".to_string(), "Hello world".to_string());

        let rows = project_feed(
            vec![notification("n1", "amy", "p1", NotificationType::Comment)],
            &actors,
            &titles,
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_name.as_deref(), Some("Amy"));
        assert_eq!(rows[0].user_avatar.as_deref(), Some("https://cdn/amy.png"));
        assert_eq!(rows[0].article_title.as_deref(), Some("Hello world"));
        assert_eq!(rows[0].content.as_deref(), Some("nice post"));
        assert!(!rows[0].is_read);
    }

    #[test]
    fn unresolved_actor_or_post_leaves_fields_empty() {
        let rows = project_feed(
            vec![notification("n1", "ghost", "gone", NotificationType::Like)],
            &HashMap::new(),
            &HashMap::new(),
        );

        assert_eq!(rows.len(), 1);
        assert!(rows[0].user_name.is_none());
        assert!(rows[0].user_avatar.is_none());
        assert!(rows[0].article_title.is_none());
        assert!(rows[0].content.is_none());
    }
}
