//! Health check endpoints

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub api_key_configured: bool,
    pub root_folder_configured: bool,
}

/// Health check - always returns OK if the server is running
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check - the catalog can be served without query overrides
async fn readyz(State(state): State<AppState>) -> Json<ReadyResponse> {
    let api_key_configured = state.config.api_key.is_some();
    let root_folder_configured = state.config.root_folder_id.is_some();

    Json(ReadyResponse {
        ready: api_key_configured && root_folder_configured,
        api_key_configured,
        root_folder_configured,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
