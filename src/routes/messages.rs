use crate::{
    error::Result,
    models::message::*,
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/conversations", get(list_conversations))
        .route("/unread/count", get(unread_count))
        .route("/typing", post(set_typing))
        .route("/typing/:user_id", get(typing_status))
        .route("/", post(send_message))
        .route("/:user_id", get(list_messages))
}

async fn list_conversations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<ConversationSummary>>> {
    let conversations = state.message_service.list_conversations(&user.id).await?;
    Ok(Json(conversations))
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(other_user_id): Path<String>,
) -> Result<Json<Vec<MessageView>>> {
    let messages = state
        .message_service
        .list_messages(&user.id, &other_user_id)
        .await?;
    Ok(Json(messages))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let message = state
        .message_service
        .send_message(&user.id, &request.receiver_id, &request.message)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn unread_count(State(state): State<Arc<AppState>>, user: AuthUser) -> Json<Value> {
    let count = state.message_service.count_unread(&user.id).await;
    Json(json!({ "count": count }))
}

async fn set_typing(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<TypingRequest>,
) -> Json<Value> {
    state.message_service.set_typing(&user.id, &request.receiver_id);
    Json(json!({ "success": true }))
}

/// Whether the counterpart is currently typing at the caller.
async fn typing_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(other_user_id): Path<String>,
) -> Json<Value> {
    let is_typing = state.message_service.is_typing(&other_user_id, &user.id);
    Json(json!({ "isTyping": is_typing }))
}
