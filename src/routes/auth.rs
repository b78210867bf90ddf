use crate::{
    error::Result,
    models::user::{LoginRequest, RegisterRequest},
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/get-user", get(get_user))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let user = state.auth_service.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let access_token = state.auth_service.login(request).await?;
    Ok(Json(json!({
        "message": "Signed in successfully",
        "access_token": access_token
    })))
}

async fn get_user(user: AuthUser) -> Result<Json<AuthUser>> {
    Ok(Json(user))
}
