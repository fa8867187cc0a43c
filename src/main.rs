mod app;
mod auth;
mod config;
mod dates;
mod errors;
mod feed;
mod images;
mod inference;
mod meals;
mod nutrition;
mod pantry;
mod profile;
mod progress;
mod state;
mod storage;
mod summary;
mod tdee;
mod water;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutrio=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    sqlx::migrate!("./migrations").run(&app_state.db).await?;
    tracing::info!("migrations applied");

    let server = app_state.config.server.clone();
    app::serve(app::build_app(app_state), &server).await
}
