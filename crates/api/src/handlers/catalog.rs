//! Handlers for reading the catalog: the visible page, single records and
//! the tag index.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use flowshelf_core::browse::{BrowsePage, TagCount, PAGE_SIZE_OPTIONS};
use flowshelf_core::error::CoreError;
use flowshelf_core::record::Workflow;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;

/// A record plus its process summary split into steps.
#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    #[serde(flatten)]
    pub workflow: Workflow,
    /// More than one entry only when the summary is a numbered list.
    pub process_steps: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    /// Most frequent tags, descending.
    pub top: Vec<TagCount>,
    /// Every distinct tag, alphabetically.
    pub all: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub page: BrowsePage,
    pub page_size_options: [usize; 4],
}

/// GET /api/v1/workflows
///
/// The current page for the active search, tag filter, sort and page size.
pub async fn list_workflows(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let controller = state.controller.lock().await;

    Ok(Json(DataResponse {
        data: PageResponse {
            page: controller.current_page(),
            page_size_options: PAGE_SIZE_OPTIONS,
        },
    }))
}

/// GET /api/v1/workflows/{id}
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let controller = state.controller.lock().await;
    let workflow = controller
        .find(&id)
        .cloned()
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id,
        }))?;

    let process_steps = workflow.process_steps();
    Ok(Json(DataResponse {
        data: WorkflowDetail {
            workflow,
            process_steps,
        },
    }))
}

/// POST /api/v1/workflows/{id}/select
///
/// Open the detail view. The response tells the client to push
/// `/workflow/<id>` onto its history. 400 while loading or on the settings
/// screen.
pub async fn select_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut controller = state.controller.lock().await;
    let navigation = controller.select(&id)?;

    tracing::debug!(%id, "Workflow selected");

    Ok(Json(DataResponse {
        data: ActionResponse::new(navigation, &controller),
    }))
}

/// GET /api/v1/tags
pub async fn list_tags(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let controller = state.controller.lock().await;

    Ok(Json(DataResponse {
        data: TagsResponse {
            top: controller.tag_index(),
            all: controller.all_tags(),
        },
    }))
}
