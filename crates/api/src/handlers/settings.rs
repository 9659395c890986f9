//! Handlers for the data-source settings screen and re-fetching.
//!
//! Saving settings and refreshing both start a background fetch; they
//! answer `202 Accepted` with the `loading` snapshot while it runs, or
//! `200 OK` with the settings screen when the settings are incomplete.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use flowshelf_core::controller::FetchTicket;
use flowshelf_core::error::CoreError;
use flowshelf_core::settings::{SourceSettings, DEFAULT_SHEET_NAME};
use serde::Deserialize;

use crate::error::AppResult;
use crate::fetch::spawn_fetch;
use crate::response::{ActionResponse, DataResponse, ViewSnapshot};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveSettingsRequest {
    pub sheet_id: String,
    /// Defaults to `Sheet1` when omitted.
    pub sheet_name: Option<String>,
    pub api_key: String,
}

impl SaveSettingsRequest {
    fn into_settings(self) -> SourceSettings {
        let sheet_name = self
            .sheet_name
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        SourceSettings::new(self.sheet_id.trim(), sheet_name.trim(), self.api_key.trim())
    }
}

/// GET /api/v1/settings
///
/// The API key is masked.
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let controller = state.controller.lock().await;

    Ok(Json(DataResponse {
        data: controller.settings_view(),
    }))
}

/// PUT /api/v1/settings
///
/// Persist the settings and re-fetch with them. Rejected with 403 when the
/// settings come from the environment.
pub async fn save_settings(
    State(state): State<AppState>,
    Json(input): Json<SaveSettingsRequest>,
) -> AppResult<impl IntoResponse> {
    let settings = input.into_settings();
    let (ticket, snapshot) = state
        .with_controller_blocking(move |controller| {
            let ticket = controller.save_settings(settings)?;
            Ok::<_, CoreError>((ticket, ViewSnapshot::of(controller)))
        })
        .await??;

    Ok(respond_with_fetch(&state, ticket, snapshot))
}

/// POST /api/v1/refresh
///
/// Re-fetch with the current settings. Controls are kept.
pub async fn refresh(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    let ticket = controller.refresh();
    let snapshot = ViewSnapshot::of(&controller);
    drop(controller);

    Ok(respond_with_fetch(&state, ticket, snapshot))
}

/// POST /api/v1/settings/open
pub async fn open_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    controller.show_settings();

    Ok(Json(DataResponse {
        data: controller.settings_view(),
    }))
}

/// POST /api/v1/settings/close
///
/// 400 during initial setup, when there is no list to return to.
pub async fn close_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    let navigation = controller.close_settings()?;

    Ok(Json(DataResponse {
        data: ActionResponse::new(navigation, &controller),
    }))
}

fn respond_with_fetch(
    state: &AppState,
    ticket: Option<FetchTicket>,
    snapshot: ViewSnapshot,
) -> impl IntoResponse {
    let status = match ticket {
        Some(ticket) => {
            tracing::info!(generation = ticket.generation(), "Catalog fetch started");
            spawn_fetch(state.clone(), ticket);
            StatusCode::ACCEPTED
        }
        None => StatusCode::OK,
    };

    (status, Json(DataResponse { data: snapshot }))
}
