use axum::http::HeaderMap;

use crate::utils::error::{AppError, AppResult};

pub fn extract_username(headers: &HeaderMap) -> Option<String> {
    headers
        .get(crate::middleware::auth::AUTH_USERNAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Acting identity for an authorized call. The auth middleware stamps the
/// header for every route behind it, so absence means a wiring error.
pub fn require_username(headers: &HeaderMap) -> AppResult<String> {
    extract_username(headers)
        .ok_or_else(|| AppError::Auth("Missing authenticated identity".to_string()))
}
