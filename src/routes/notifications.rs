use crate::{
    error::Result,
    models::notification::NotificationView,
    services::auth::AdminUser,
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
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/:id/read", put(mark_read))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<NotificationView>>> {
    let notifications = state
        .notification_service
        .list_notifications(&admin.id)
        .await?;
    Ok(Json(notifications))
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> Json<Value> {
    let count = state.notification_service.count_unread(&admin.id).await;
    Json(json!({ "count": count }))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>> {
    state.notification_service.mark_read(&notification_id).await?;
    Ok(Json(json!({ "message": "Notification marked as read" })))
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Value>> {
    state.notification_service.mark_all_read(&admin.id).await?;
    Ok(Json(json!({ "message": "All notifications marked as read" })))
}
