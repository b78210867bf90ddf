use crate::{
    error::Result,
    models::user::{PublicProfile, UpdateProfileRequest},
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/author", get(get_author))
        .route("/:user_id", get(get_profile))
        .route("/", put(update_profile))
}

/// The site author (earliest admin), for the homepage byline.
async fn get_author(State(state): State<Arc<AppState>>) -> Result<Json<PublicProfile>> {
    let author = state.user_service.get_author().await?;
    Ok(Json(author))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicProfile>> {
    let profile = state.user_service.get_profile(&user_id).await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    state.user_service.update_profile(&user.id, request).await?;
    Ok(Json(json!({ "message": "Profile updated successfully" })))
}
