//! Shared response types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use chrono::{DateTime, Utc};
use flowshelf_core::browse::ViewControls;
use flowshelf_core::controller::{CatalogController, Navigation, ViewState};
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Everything a client needs to render the current screen frame.
#[derive(Debug, Serialize)]
pub struct ViewSnapshot {
    pub view: ViewState,
    pub path: String,
    pub controls: ViewControls,
    pub record_count: usize,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl ViewSnapshot {
    pub fn of(controller: &CatalogController) -> Self {
        Self {
            view: controller.state().clone(),
            path: controller.path().to_string(),
            controls: controller.controls().clone(),
            record_count: controller.records().len(),
            last_fetched_at: controller.last_fetched_at(),
        }
    }
}

/// Result of a user action that may move through navigation history.
///
/// The client applies `navigation` to its own history (push / replace /
/// nothing) and renders `snapshot`.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub navigation: Navigation,
    pub snapshot: ViewSnapshot,
}

impl ActionResponse {
    pub fn new(navigation: Navigation, controller: &CatalogController) -> Self {
        Self {
            navigation,
            snapshot: ViewSnapshot::of(controller),
        }
    }
}
