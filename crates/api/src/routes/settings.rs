use axum::routing::{get, post};
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Settings routes mounted at `/settings`.
///
/// ```text
/// GET    /          -> get_settings
/// PUT    /          -> save_settings (403 when environment-managed)
/// POST   /open      -> open_settings
/// POST   /close     -> close_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(settings::get_settings).put(settings::save_settings),
        )
        .route("/open", post(settings::open_settings))
        .route("/close", post(settings::close_settings))
}
