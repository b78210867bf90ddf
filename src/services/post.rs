use crate::{
    error::{AppError, Result},
    models::post::*,
    services::Database,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct PostService {
    db: Arc<Database>,
}

#[derive(Debug, Deserialize)]
struct CategoryName {
    id: String,
    name: String,
}

impl PostService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn create_post(&self, owner_id: &str, request: CreatePostRequest) -> Result<Post> {
        request.validate().map_err(AppError::ValidatorError)?;

        let post = Post {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            title: request.title,
            image: request.image,
            category_id: request.category_id,
            description: request.description,
            content: request.content,
            status: request.status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let created: Post = self.db.create("post", post).await?;
        debug!("Created post {} for user {}", created.id, owner_id);
        Ok(created)
    }

    /// Public listing: published posts only, with optional category-name and
    /// keyword filters and page/limit windowing.
    pub async fn list_published(
        &self,
        category: Option<&str>,
        keyword: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<PostListResponse> {
        let (page, limit, start) = page_bounds(page, limit);

        let mut clauses = vec!["status = 'published'".to_string()];
        let mut params = json!({ "limit": limit, "start": start });

        if let Some(category) = category.filter(|c| !c.is_empty()) {
            let ids = self.category_ids_matching(category).await?;
            if ids.is_empty() {
                return Ok(build_page(0, page, limit, Vec::new()));
            }
            clauses.push("category_id IN $category_ids".to_string());
            params["category_ids"] = json!(ids);
        }

        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            clauses.push(
                "(string::contains(string::lowercase(title), $keyword) \
                 OR string::contains(string::lowercase(description), $keyword) \
                 OR string::contains(string::lowercase(content), $keyword))"
                    .to_string(),
            );
            params["keyword"] = json!(keyword.to_lowercase());
        }

        let where_clause = clauses.join(" AND ");

        let total = self
            .db
            .count(
                &format!("SELECT count() FROM post WHERE {} GROUP ALL", where_clause),
                params.clone(),
            )
            .await?;

        let sql = format!(
            "SELECT * FROM post WHERE {} ORDER BY created_at DESC LIMIT $limit START $start",
            where_clause
        );
        let mut response = self.db.query_with_params(&sql, params).await?;
        let posts: Vec<Post> = response.take(0)?;
        let posts = self.join_categories(posts).await?;

        Ok(build_page(total, page, limit, posts))
    }

    pub async fn get_published(&self, post_id: &str) -> Result<PostWithCategory> {
        let post: Post = self
            .db
            .get_by_id("post", post_id)
            .await?
            .filter(|p: &Post| p.status == PostStatus::Published)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        self.with_category(post).await
    }

    /// Admin view: every post, regardless of status.
    pub async fn admin_list(&self) -> Result<Vec<PostWithCategory>> {
        let mut response = self
            .db
            .query("SELECT * FROM post ORDER BY created_at DESC")
            .await?;
        let posts: Vec<Post> = response.take(0)?;
        self.join_categories(posts).await
    }

    pub async fn admin_get(&self, post_id: &str) -> Result<PostWithCategory> {
        let post: Post = self
            .db
            .get_by_id("post", post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        self.with_category(post).await
    }

    pub async fn update_post(&self, post_id: &str, request: UpdatePostRequest) -> Result<Post> {
        request.validate().map_err(AppError::ValidatorError)?;

        let updates = json!({
            "title": request.title,
            "image": request.image,
            "category_id": request.category_id,
            "description": request.description,
            "content": request.content,
            "status": request.status,
            "updated_at": Utc::now(),
        });

        self.db
            .update_by_id_with_json("post", post_id, updates)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        let deleted: Option<serde_json::Value> = self.db.delete_by_id("post", post_id).await?;
        if deleted.is_none() {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        Ok(())
    }

    async fn category_ids_matching(&self, name: &str) -> Result<Vec<String>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT VALUE meta::id(id) FROM category WHERE string::contains(string::lowercase(name), $name)",
                json!({ "name": name.to_lowercase() }),
            )
            .await?;
        let ids: Vec<String> = response.take(0)?;
        Ok(ids)
    }

    async fn with_category(&self, post: Post) -> Result<PostWithCategory> {
        let mut joined = self.join_categories(vec![post]).await?;
        joined
            .pop()
            .ok_or_else(|| AppError::Internal("Post vanished during category join".to_string()))
    }

    async fn join_categories(&self, posts: Vec<Post>) -> Result<Vec<PostWithCategory>> {
        let category_ids: Vec<&str> = posts.iter().map(|p| p.category_id.as_str()).collect();
        let names: HashMap<String, String> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            let mut response = self
                .db
                .query_with_params(
                    "SELECT meta::id(id) AS id, name FROM category WHERE meta::id(id) IN $category_ids",
                    json!({ "category_ids": category_ids }),
                )
                .await?;
            let categories: Vec<CategoryName> = response.take(0)?;
            categories.into_iter().map(|c| (c.id, c.name)).collect()
        };

        Ok(posts
            .into_iter()
            .map(|post| {
                let category = names.get(&post.category_id).cloned();
                PostWithCategory { post, category }
            })
            .collect())
    }
}

fn page_bounds(page: i64, limit: i64) -> (i64, i64, i64) {
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    (page, limit, (page - 1) * limit)
}

fn build_page(total: i64, page: i64, limit: i64, posts: Vec<PostWithCategory>) -> PostListResponse {
    let start = (page - 1) * limit;
    PostListResponse {
        total_posts: total,
        total_pages: (total + limit - 1) / limit,
        current_page: page,
        limit,
        next_page: (start + limit < total).then_some(page + 1),
        previous_page: (start > 0).then_some(page - 1),
        posts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_clamp_out_of_range_input() {
        assert_eq!(page_bounds(0, 6), (1, 6, 0));
        assert_eq!(page_bounds(-3, 0), (1, 1, 0));
        assert_eq!(page_bounds(3, 500), (3, 100, 200));
        assert_eq!(page_bounds(2, 6), (2, 6, 6));
    }

    #[test]
    fn pagination_links_only_exist_where_pages_do() {
        let first = build_page(13, 1, 6, Vec::new());
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.next_page, Some(2));
        assert_eq!(first.previous_page, None);

        let middle = build_page(13, 2, 6, Vec::new());
        assert_eq!(middle.next_page, Some(3));
        assert_eq!(middle.previous_page, Some(1));

        let last = build_page(13, 3, 6, Vec::new());
        assert_eq!(last.next_page, None);
        assert_eq!(last.previous_page, Some(2));
    }

    #[test]
    fn empty_result_set_has_no_pages() {
        let page = build_page(0, 1, 6, Vec::new());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.next_page, None);
        assert_eq!(page.previous_page, None);
    }
}
