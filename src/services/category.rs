use crate::{
    error::{AppError, Result},
    models::category::*,
    services::Database,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<Database>,
}

impl CategoryService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut response = self
            .db
            .query("SELECT * FROM category ORDER BY created_at ASC")
            .await?;
        let categories: Vec<Category> = response.take(0)?;
        Ok(categories)
    }

    pub async fn get_category(&self, category_id: &str) -> Result<Category> {
        self.db
            .get_by_id("category", category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> Result<Category> {
        request.validate().map_err(AppError::ValidatorError)?;

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            created_at: Utc::now(),
        };

        let created: Category = self.db.create("category", category).await?;
        debug!("Created category {}", created.name);
        Ok(created)
    }

    pub async fn update_category(
        &self,
        category_id: &str,
        request: UpdateCategoryRequest,
    ) -> Result<Category> {
        request.validate().map_err(AppError::ValidatorError)?;

        self.db
            .update_by_id_with_json("category", category_id, json!({ "name": request.name }))
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<()> {
        let deleted: Option<serde_json::Value> =
            self.db.delete_by_id("category", category_id).await?;
        if deleted.is_none() {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }
}
