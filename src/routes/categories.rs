use crate::{
    error::Result,
    models::category::*,
    services::auth::AdminUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:category_id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Category>>> {
    let categories = state.category_service.list_categories().await?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<Json<Category>> {
    let category = state.category_service.get_category(&category_id).await?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    state.category_service.create_category(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Created category successfully" })),
    ))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(category_id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Value>> {
    state
        .category_service
        .update_category(&category_id, request)
        .await?;
    Ok(Json(json!({ "message": "Updated category successfully" })))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(category_id): Path<String>,
) -> Result<Json<Value>> {
    state.category_service.delete_category(&category_id).await?;
    Ok(Json(json!({ "message": "Deleted category successfully" })))
}
