use crate::{
    error::{AppError, Result},
    models::user::*,
    services::Database,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// The site author: the earliest-registered admin. Drives the homepage
    /// byline.
    pub async fn get_author(&self) -> Result<PublicProfile> {
        let mut response = self
            .db
            .query(
                r#"
                    SELECT meta::id(id) AS id, name, username, role, profile_pic, bio
                    FROM user WHERE role = 'admin'
                    ORDER BY created_at ASC
                    LIMIT 1
                "#,
            )
            .await?;
        let authors: Vec<PublicProfile> = response.take(0)?;
        authors
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<PublicProfile> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT meta::id(id) AS id, name, username, role, profile_pic, bio
                    FROM user WHERE meta::id(id) = $user_id
                "#,
                json!({ "user_id": user_id }),
            )
            .await?;
        let profiles: Vec<PublicProfile> = response.take(0)?;
        profiles
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Partial update: only the provided fields change. `bio` may be an empty
    /// string to clear it; name and username may not.
    pub async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> Result<()> {
        request.validate().map_err(AppError::ValidatorError)?;

        if request.name.as_deref().map_or(false, |n| n.trim().is_empty()) {
            return Err(AppError::Validation(
                "Name cannot be empty or exceed 100 characters".to_string(),
            ));
        }
        if request
            .username
            .as_deref()
            .map_or(false, |u| u.trim().is_empty())
        {
            return Err(AppError::Validation(
                "Username cannot be empty or exceed 50 characters".to_string(),
            ));
        }

        let mut updates = serde_json::Map::new();
        if let Some(name) = request.name {
            updates.insert("name".to_string(), json!(name));
        }
        if let Some(username) = request.username {
            updates.insert("username".to_string(), json!(username));
        }
        if let Some(bio) = request.bio {
            updates.insert("bio".to_string(), json!(bio));
        }
        if let Some(profile_pic) = request.profile_pic {
            updates.insert("profile_pic".to_string(), json!(profile_pic));
        }

        if updates.is_empty() {
            return Err(AppError::BadRequest(
                "No fields to update provided".to_string(),
            ));
        }

        debug!("Updating profile for user {}", user_id);

        self.db
            .update_by_id_with_json::<serde_json::Value>(
                "user",
                user_id,
                serde_json::Value::Object(updates),
            )
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(())
    }
}
