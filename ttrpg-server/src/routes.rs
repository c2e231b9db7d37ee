//! HTTP routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use ttrpg_core::{GameSession, Narrator};

/// One adventure: the session and whoever narrates it.
pub struct Table {
    pub session: GameSession,
    pub narrator: Box<dyn Narrator>,
}

impl Table {
    pub fn new(session: GameSession, narrator: impl Narrator + 'static) -> Self {
        Self {
            session,
            narrator: Box::new(narrator),
        }
    }
}

/// Turns are serialized through the mutex.
pub type AppState = Arc<Mutex<Table>>;

#[derive(Debug, Deserialize)]
pub struct AdventureRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AdventureReply {
    pub reply: String,
}

/// Create all API routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/adventure", post(adventure))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run one turn of the adventure
async fn adventure(
    State(state): State<AppState>,
    Json(request): Json<AdventureRequest>,
) -> Result<Json<AdventureReply>, (StatusCode, Json<Value>)> {
    let mut table = state.lock().await;
    let Table { session, narrator } = &mut *table;

    match narrator.narrate(&request.message, session).await {
        Ok(reply) => Ok(Json(AdventureReply { reply })),
        Err(e) => {
            tracing::error!("Narrator failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}
