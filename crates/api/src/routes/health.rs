use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Current controller state (`loading`, `settings`, `list`, `detail`).
    pub view: &'static str,
    /// Whether any catalog fetch has succeeded.
    pub catalog_loaded: bool,
}

/// GET /health -- service liveness plus a summary of the catalog.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let controller = state.controller.lock().await;

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        view: controller.state().name(),
        catalog_loaded: controller.is_loaded(),
    })
}

/// Mount health check routes (root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
