use std::sync::Arc;

use messagely::api::{self, AppState};
use messagely::database;
use messagely::utils::jwt::JwtService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "messagely=info,tower_http=info".into()),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:messagely.db".to_string());
    let db = database::create_pool(&database_url).await?;

    let jwt_service = Arc::new(JwtService::from_env().map_err(|e| anyhow::anyhow!("{}", e))?);

    let state = Arc::new(AppState { db, jwt_service });
    let app = api::routes(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
