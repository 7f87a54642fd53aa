use std::net::SocketAddr;

use blogapi::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "blogapi=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env()?;
    if config.jwt.insecure_fallback {
        tracing::warn!(
            "JWT_SECRET is not set; signing tokens with the built-in development secret. \
             INSECURE DEVELOPMENT MODE, never deploy like this"
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let grace = config.shutdown_grace();

    let app_state = AppState::init(config).await?;
    let store = app_state.store.clone();

    app::serve(app::build_app(app_state), addr, grace).await?;

    store.close().await;
    tracing::info!("server exited gracefully");
    Ok(())
}
