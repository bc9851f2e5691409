use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::AppState;
use crate::services::identity::user_exists;
use crate::utils::error::AppError;

pub const AUTH_USERNAME_HEADER: &str = "x-username";

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Auth("Missing or invalid authorization header".to_string()))?;

    let username = state
        .jwt_service
        .extract_username(token)
        .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

    if !user_exists(&state.db, &username)
        .await
        .map_err(|_| AppError::Internal("Database error during auth check".to_string()))?
    {
        return Err(AppError::Auth("User no longer exists".to_string()));
    }

    request.headers_mut().insert(
        AUTH_USERNAME_HEADER,
        username
            .parse()
            .map_err(|_| AppError::Internal("Failed to set username header".to_string()))?,
    );

    Ok(next.run(request).await)
}
