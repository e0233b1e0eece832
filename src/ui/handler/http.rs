//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::domain::ConnectionInfo;
use crate::ui::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint listing registered connections (for testing purposes)
pub async fn debug_connections(State(state): State<Arc<AppState>>) -> Json<Vec<ConnectionInfo>> {
    Json(state.hub.connections().await)
}
