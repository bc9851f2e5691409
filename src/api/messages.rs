use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::authorization::{mark_message_read, view_message};
use crate::services::message::create_message;
use crate::utils::error::AppResult;
use crate::utils::helpers::require_username;

#[derive(Deserialize)]
struct SendMessageRequest {
    to_username: String,
    body: String,
}

async fn get_message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let acting = require_username(&headers)?;
    let message = view_message(&state.db, &id, &acting).await?;
    Ok(Json(serde_json::json!({ "message": message })))
}

async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let acting = require_username(&headers)?;
    let message = create_message(&state.db, acting, req.to_username, req.body).await?;

    tracing::debug!(
        "Message {} sent from {} to {}",
        message.id,
        message.from_username,
        message.to_username
    );

    Ok(Json(serde_json::json!({
        "message": {
            "id": message.id,
            "from_username": message.from_username,
            "to_username": message.to_username,
            "body": message.body,
            "sent_at": message.sent_at,
        }
    })))
}

async fn mark_read_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let acting = require_username(&headers)?;
    let message = mark_message_read(&state.db, &id, &acting).await?;

    Ok(Json(serde_json::json!({
        "message": {
            "id": message.id,
            "read_at": message.read_at,
        }
    })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(send_message_handler))
        .route("/:id", get(get_message_handler))
        .route("/:id/read", post(mark_read_handler))
}
