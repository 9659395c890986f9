use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::{ActionResponse, DataResponse, ViewSnapshot};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub path: String,
}

/// GET /api/v1/view
pub async fn get_view(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let controller = state.controller.lock().await;

    Ok(Json(DataResponse {
        data: ViewSnapshot::of(&controller),
    }))
}

/// POST /api/v1/navigation
///
/// The client's history moved (back/forward) to `path`. State is derived
/// from the path against the records already loaded; nothing is fetched.
pub async fn navigate(
    State(state): State<AppState>,
    Json(input): Json<NavigateRequest>,
) -> AppResult<impl IntoResponse> {
    if !input.path.starts_with('/') {
        return Err(AppError::BadRequest(format!(
            "Navigation path must start with '/', got '{}'",
            input.path
        )));
    }

    let mut controller = state.controller.lock().await;
    let navigation = controller.navigate(&input.path);

    Ok(Json(DataResponse {
        data: ActionResponse::new(navigation, &controller),
    }))
}

/// POST /api/v1/navigation/back
///
/// Detail to list. Anywhere else the answer is `stay`.
pub async fn back(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    let navigation = controller.back();

    Ok(Json(DataResponse {
        data: ActionResponse::new(navigation, &controller),
    }))
}
