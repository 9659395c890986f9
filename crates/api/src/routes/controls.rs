use axum::routing::{delete, post, put};
use axum::Router;

use crate::handlers::controls;
use crate::state::AppState;

/// Browse-control routes mounted at `/controls`.
///
/// ```text
/// PUT    /                    -> update_controls
/// DELETE /tags                -> clear_tags
/// POST   /tags/{tag}/toggle   -> toggle_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(controls::update_controls))
        .route("/tags", delete(controls::clear_tags))
        .route("/tags/{tag}/toggle", post(controls::toggle_tag))
}
