//! Handlers for the browse controls: search, tag filter, paging, sort,
//! view mode and theme.
//!
//! Control changes never change the view state or trigger a fetch.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use flowshelf_core::browse::{PageSize, SortDirection, ViewControls, ViewMode};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Page size as sent by a client: a number or `"all"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PageSizeInput {
    Count(usize),
    Text(String),
}

/// Partial update of the browse controls. Absent fields are left alone.
///
/// Fields are applied in declaration order, so an explicit `page` wins over
/// the reset to page 1 caused by `search`, `page_size` or `tags`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateControls {
    pub search: Option<String>,
    /// Replaces the whole tag selection.
    pub tags: Option<Vec<String>>,
    pub page_size: Option<PageSizeInput>,
    pub page: Option<usize>,
    pub sort: Option<SortDirection>,
    pub view_mode: Option<ViewMode>,
    pub dark_mode: Option<bool>,
}

impl UpdateControls {
    fn apply(self, controls: &mut ViewControls) -> AppResult<()> {
        // Parse first so an invalid page size leaves the controls untouched.
        let page_size = match self.page_size {
            Some(PageSizeInput::Count(n)) => Some(PageSize::parse(&n.to_string())?),
            Some(PageSizeInput::Text(s)) => Some(PageSize::parse(&s)?),
            None => None,
        };

        if let Some(search) = self.search {
            controls.set_search(search);
        }
        if let Some(tags) = self.tags {
            controls.clear_tags();
            for tag in &tags {
                if !controls.selected_tags().contains(tag) {
                    controls.toggle_tag(tag);
                }
            }
        }
        if let Some(page_size) = page_size {
            controls.set_page_size(page_size);
        }
        if let Some(page) = self.page {
            controls.set_page(page);
        }
        if let Some(sort) = self.sort {
            if controls.sort() != sort {
                controls.toggle_sort();
            }
        }
        if let Some(view_mode) = self.view_mode {
            controls.set_view_mode(view_mode);
        }
        if let Some(dark_mode) = self.dark_mode {
            if controls.dark_mode() != dark_mode {
                controls.toggle_dark_mode();
            }
        }
        Ok(())
    }
}

/// PUT /api/v1/controls
///
/// Returns the resulting controls.
pub async fn update_controls(
    State(state): State<AppState>,
    Json(input): Json<UpdateControls>,
) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    input.apply(controller.controls_mut())?;

    Ok(Json(DataResponse {
        data: controller.controls().clone(),
    }))
}

/// POST /api/v1/controls/tags/{tag}/toggle
pub async fn toggle_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    controller.controls_mut().toggle_tag(&tag);

    Ok(Json(DataResponse {
        data: controller.controls().clone(),
    }))
}

/// DELETE /api/v1/controls/tags
pub async fn clear_tags(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    controller.controls_mut().clear_tags();

    Ok(Json(DataResponse {
        data: controller.controls().clone(),
    }))
}
