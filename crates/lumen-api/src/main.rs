//! Lumen API Server
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use lumen_api::{create_router, state::AppState};
use lumen_core::{logging::init_tracing, AppConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration comes first so the log level can follow it
    let config = match std::env::var("LUMEN_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging, "lumen_api=debug,tower_http=debug")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(AppState::new(config));
    if !state.initialize().await {
        tracing::warn!("Vector store failed to initialize; /ready will report 503");
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Lumen API Server starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
