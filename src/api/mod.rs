pub mod auth;
pub mod messages;
pub mod users;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use auth::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .nest("/messages", messages::router().with_state(state.clone()))
        .nest("/users", users::router().with_state(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    Router::new()
        .nest("/auth", auth::routes(state.clone()))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
