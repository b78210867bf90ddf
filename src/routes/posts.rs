use crate::{
    error::Result,
    models::comment::{CommentWithAuthor, CreateCommentRequest},
    models::like::LikeStatus,
    models::post::*,
    services::auth::{AdminUser, AuthUser},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/admin", get(admin_list_posts))
        .route("/admin/:post_id", get(admin_get_post))
        .route("/:post_id", get(get_post).put(update_post).delete(delete_post))
        .route("/:post_id/comments", get(list_comments).post(create_comment))
        .route("/:post_id/likes", get(like_count).post(toggle_like))
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostQuery>,
) -> Result<Json<PostListResponse>> {
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.config.default_posts_per_page as i64);

    let posts = state
        .post_service
        .list_published(query.category.as_deref(), query.keyword.as_deref(), page, limit)
        .await?;
    Ok(Json(posts))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    state.post_service.create_post(&admin.id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Created post successfully" })),
    ))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<PostWithCategory>> {
    let post = state.post_service.get_published(&post_id).await?;
    Ok(Json(post))
}

async fn admin_list_posts(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Value>> {
    let posts = state.post_service.admin_list().await?;
    Ok(Json(json!({ "posts": posts })))
}

async fn admin_get_post(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(post_id): Path<String>,
) -> Result<Json<PostWithCategory>> {
    let post = state.post_service.admin_get(&post_id).await?;
    Ok(Json(post))
}

async fn update_post(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(post_id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<Value>> {
    state.post_service.update_post(&post_id, request).await?;
    Ok(Json(json!({ "message": "Updated post successfully" })))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    state.post_service.delete_post(&post_id).await?;
    Ok(Json(json!({ "message": "Deleted post successfully" })))
}

async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<CommentWithAuthor>>> {
    let comments = state.comment_service.list_post_comments(&post_id).await?;
    Ok(Json(comments))
}

async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(post_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    state
        .comment_service
        .create_comment(&post_id, &user.id, &request.comment)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Created comment successfully" })),
    ))
}

async fn like_count(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let count = state.like_service.count_likes(&post_id).await?;
    Ok(Json(json!({ "like_count": count })))
}

async fn toggle_like(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<LikeStatus>> {
    let status = state.like_service.toggle_like(&post_id, &user.id).await?;
    Ok(Json(status))
}
