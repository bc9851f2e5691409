use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::database::DbPool;
use crate::models::user::{RegisterRequest, UserDetail};
use crate::services::identity::{authenticate, get_user, register_user, touch_last_seen};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt::JwtService;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: Arc<JwtService>,
}

async fn health_check() -> &'static str {
    "OK"
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let user = register_user(&state.db, payload).await?;
    let token = state.jwt_service.generate_token(&user.username)?;

    tracing::info!("Registered user {}", user.username);

    Ok(Json(serde_json::json!({
        "token": token,
        "user": UserDetail::from(user),
    })))
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<serde_json::Value>> {
    // Uniform rejection: unknown user and wrong password are not
    // distinguishable from the outside.
    if !authenticate(&state.db, &payload.username, &payload.password).await? {
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    touch_last_seen(&state.db, &payload.username).await?;
    let user = get_user(&state.db, &payload.username).await?;
    let token = state.jwt_service.generate_token(&payload.username)?;

    Ok(Json(serde_json::json!({
        "token": token,
        "user": user,
    })))
}

async fn logout() -> StatusCode {
    StatusCode::OK
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}
