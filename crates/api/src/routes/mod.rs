pub mod controls;
pub mod health;
pub mod settings;
pub mod view;
pub mod workflows;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /view                                 current state, path and controls (GET)
/// /navigation                           history back/forward (POST)
/// /navigation/back                      detail -> list (POST)
/// /refresh                              re-fetch with current settings (POST)
///
/// /workflows                            current page (GET)
/// /workflows/{id}                       single record (GET)
/// /workflows/{id}/select                list -> detail (POST)
///
/// /tags                                 tag index and all tags (GET)
///
/// /controls                             partial update (PUT)
/// /controls/tags                        clear tag filter (DELETE)
/// /controls/tags/{tag}/toggle           toggle one tag (POST)
///
/// /settings                             get, save (GET, PUT)
/// /settings/open                        show settings (POST)
/// /settings/close                       leave settings (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(view::router())
        .nest("/workflows", workflows::router())
        .route("/tags", get(handlers::catalog::list_tags))
        .nest("/controls", controls::router())
        .nest("/settings", settings::router())
        .route("/refresh", post(handlers::settings::refresh))
}
