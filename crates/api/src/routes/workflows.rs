use axum::routing::{get, post};
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes mounted at `/workflows`.
///
/// ```text
/// GET    /                  -> list_workflows
/// GET    /{id}              -> get_workflow
/// POST   /{id}/select       -> select_workflow
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::list_workflows))
        .route("/{id}", get(catalog::get_workflow))
        .route("/{id}/select", post(catalog::select_workflow))
}
