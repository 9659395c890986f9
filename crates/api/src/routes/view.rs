use axum::routing::{get, post};
use axum::Router;

use crate::handlers::navigation;
use crate::state::AppState;

/// View and history routes mounted at the `/api/v1` root.
///
/// ```text
/// GET    /view                -> get_view
/// POST   /navigation          -> navigate
/// POST   /navigation/back     -> back
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/view", get(navigation::get_view))
        .route("/navigation", post(navigation::navigate))
        .route("/navigation/back", post(navigation::back))
}
