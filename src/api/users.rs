use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use std::sync::Arc;

use crate::api::AppState;
use crate::services::identity::{get_user, list_users};
use crate::services::projection::{messages_from, messages_to};
use crate::utils::error::AppResult;

async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<serde_json::Value>> {
    let users = list_users(&state.db).await?;
    Ok(Json(serde_json::json!({ "users": users })))
}

async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user = get_user(&state.db, &username).await?;
    Ok(Json(serde_json::json!({ "user": user })))
}

async fn messages_to_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let messages = messages_to(&state.db, &username).await?;
    Ok(Json(serde_json::json!({ "messages": messages })))
}

async fn messages_from_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let messages = messages_from(&state.db, &username).await?;
    Ok(Json(serde_json::json!({ "messages": messages })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users_handler))
        .route("/:username", get(get_user_handler))
        .route("/:username/to", get(messages_to_handler))
        .route("/:username/from", get(messages_from_handler))
}
