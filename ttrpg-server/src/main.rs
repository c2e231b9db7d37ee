//! TTRPG Server - HTTP front door for the AI Dungeon Master
//!
//! Serves one adventure:
//! - `GET /api/health` for liveness probes
//! - `POST /api/adventure` to play a turn
//!
//! The transcript is exported when the server is stopped with Ctrl+C.

mod config;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ttrpg_core::{DungeonMaster, GameSession};

use crate::config::ServerConfig;
use crate::routes::Table;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttrpg_server=debug,ttrpg_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TTRPG server");

    let config = ServerConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Model: {}", config.model.as_deref().unwrap_or("default"));
    tracing::info!(
        "  Transcripts: {}",
        config
            .transcript_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "disabled".to_string())
    );

    let dm = DungeonMaster::from_env()
        .context("ANTHROPIC_API_KEY must be set to run the Dungeon Master")?
        .with_config(config.dm_config());
    let session = GameSession::new(config.session_config());
    let state = Arc::new(Mutex::new(Table::new(session, dm)));

    let app = routes::create_routes()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let table = state.lock().await;
    match table.session.export_transcript().await {
        Ok(Some(path)) => tracing::info!("Transcript saved to {}", path.display()),
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not export transcript: {}", e),
    }

    Ok(())
}
