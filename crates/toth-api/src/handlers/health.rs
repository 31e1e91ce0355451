//! Liveness endpoint.

use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = if state.files.root().is_degraded() {
        "degraded"
    } else {
        "ready"
    };
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
    }))
}
