//! Portfolio server - Main entry point.

use std::sync::Arc;

use anyhow::Context;
use portfolio_server::config::ServerConfig;
use portfolio_server::repository::init_db;
use portfolio_server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Prefer local overrides
    for filename in [".env.local", ".env"] {
        let _ = dotenvy::from_filename(filename);
    }

    let config = ServerConfig::from_env()?;
    rolling_logger::init_logger(&config.log_dir, "portfolio-server")
        .context("failed to init rolling logger")?;

    tracing::info!(db = %config.db_path.display(), "Starting portfolio server");

    let db = match init_db(&config.db_path).await {
        Ok(db) => db,
        Err(e) => {
            let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            return Err(e.into());
        }
    };
    let state = Arc::new(AppState::new(db));
    let app = router(state, config.cors_origins.as_deref());

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let _ = rolling_logger::info(&format!("Listening on {}", addr));

    axum::serve(listener, app).await?;
    Ok(())
}
