//! Integration tests for `SheetsSource` against an in-process stand-in for
//! the Sheets API.

use assert_matches::assert_matches;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;

use flowshelf_core::settings::{SettingsField, SourceSettings};
use flowshelf_core::source::{FetchError, WorkflowSource};
use flowshelf_sheets::{SheetsApi, SheetsSource};

const VALID_KEY: &str = "test-key";

/// Canned responses keyed by sheet id.
async fn values(
    Path((sheet_id, range)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("key").map(String::as_str) != Some(VALID_KEY) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key."
                }
            })),
        )
            .into_response();
    }

    match sheet_id.as_str() {
        "catalog" => Json(json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [
                ["Title", "Description", "Tags", "Input Details", "Process Summary"],
                ["Alpha", "first", "a, b", "csv", "1. Load 2. Run"],
                ["", "untitled", "a"],
                ["Gamma", "third", "b"]
            ]
        }))
        .into_response(),
        "echo-range" => Json(json!({
            "values": [["Title", "Description", "Tags"], [range, "", ""]]
        }))
        .into_response(),
        "empty" => Json(json!({"range": range})).into_response(),
        "no-tags" => Json(json!({
            "values": [["Title", "Description"], ["Alpha", "first"]]
        }))
        .into_response(),
        "private" => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "The caller does not have permission"}})),
        )
            .into_response(),
        "broken" => (StatusCode::BAD_GATEWAY, "<html>upstream</html>").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": "Requested entity was not found."}})),
        )
            .into_response(),
    }
}

/// Start the stand-in server and return its base URL.
async fn spawn_server() -> String {
    let app = Router::new().route(
        "/v4/spreadsheets/{sheet_id}/values/{range}",
        get(values),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn source() -> SheetsSource {
    SheetsSource::new(SheetsApi::new(spawn_server().await))
}

fn settings(sheet_id: &str) -> SourceSettings {
    SourceSettings::new(sheet_id, "Sheet1", VALID_KEY)
}

// -- success ------------------------------------------------------------------

#[tokio::test]
async fn fetches_and_maps_rows() {
    let source = source().await;

    let workflows = source.fetch(&settings("catalog")).await.unwrap();

    assert_eq!(workflows.len(), 2);
    assert_eq!(workflows[0].id, "catalog-0");
    assert_eq!(workflows[0].tags, vec!["a", "b"]);
    assert_eq!(workflows[0].input_details, "csv");
    assert_eq!(workflows[0].process_steps(), vec!["Load", "Run"]);
    assert_eq!(workflows[1].id, "catalog-2");
    assert_eq!(workflows[1].title, "Gamma");
}

#[tokio::test]
async fn requests_the_sheet_range_with_encoded_name() {
    let source = source().await;

    let workflows = source
        .fetch(&SourceSettings::new("echo-range", "My Flows", VALID_KEY))
        .await
        .unwrap();

    assert_eq!(workflows[0].title, "My Flows!A:J");
}

#[tokio::test]
async fn missing_values_is_an_empty_catalog() {
    let source = source().await;
    let workflows = source.fetch(&settings("empty")).await.unwrap();
    assert!(workflows.is_empty());
}

// -- failures -----------------------------------------------------------------

#[tokio::test]
async fn missing_setting_fails_before_any_request() {
    // Nothing listens here; a request would surface as a network error.
    let source = SheetsSource::new(SheetsApi::new("http://127.0.0.1:1"));

    let err = source
        .fetch(&SourceSettings::new("", "Sheet1", ""))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetchError::Configuration {
            field: SettingsField::ApiKey
        }
    );
}

#[tokio::test]
async fn missing_required_column_is_a_schema_error() {
    let source = source().await;
    let err = source.fetch(&settings("no-tags")).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Schema {
            column: "tags".into()
        }
    );
}

#[tokio::test]
async fn error_status_carries_the_api_message() {
    let source = source().await;

    let err = source.fetch(&settings("private")).await.unwrap_err();

    assert_matches!(
        &err,
        FetchError::Remote { status: 403, message, sheet_id }
            if message == "The caller does not have permission" && sheet_id == "private"
    );
    assert!(err.to_string().contains("Anyone with the link can view"));
}

#[tokio::test]
async fn bad_key_is_a_remote_error() {
    let source = source().await;
    let err = source
        .fetch(&SourceSettings::new("catalog", "Sheet1", "wrong"))
        .await
        .unwrap_err();
    assert_matches!(err, FetchError::Remote { status: 400, .. });
}

#[tokio::test]
async fn unreadable_error_body_uses_fallback_message() {
    let source = source().await;
    let err = source.fetch(&settings("broken")).await.unwrap_err();
    assert_matches!(
        err,
        FetchError::Remote { status: 502, message, .. } if message == "Unknown API error."
    );
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let source = SheetsSource::new(SheetsApi::new("http://127.0.0.1:1"));
    let err = source.fetch(&settings("catalog")).await.unwrap_err();
    assert_matches!(err, FetchError::Network(_));
    assert!(err.to_string().contains("check your internet connection"));
}
