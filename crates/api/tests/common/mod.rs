#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use flowshelf_api::config::ServerConfig;
use flowshelf_api::fetch;
use flowshelf_api::router::build_app_router;
use flowshelf_api::state::AppState;
use flowshelf_core::browse::ViewControls;
use flowshelf_core::controller::{CatalogController, ViewState};
use flowshelf_core::record::{parse_rows, Workflow};
use flowshelf_core::settings::{SettingsRepository, SourceSettings};
use flowshelf_core::source::{FetchError, WorkflowSource};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        settings_path: "unused-settings.json".into(),
        sheets_api_base_url: "http://127.0.0.1:1".to_string(),
        dark_mode: false,
    }
}

pub fn complete_settings() -> SourceSettings {
    SourceSettings::new("sheet", "Sheet1", "secret-key-1234")
}

/// Twelve records `Flow 00`..`Flow 11`; even ones tagged `even`, every
/// third one tagged `third`, all tagged `all`.
pub fn catalog() -> Vec<Workflow> {
    let mut rows = vec![vec![
        "Title".to_string(),
        "Description".to_string(),
        "Tags".to_string(),
        "Process Summary".to_string(),
    ]];
    for i in 0..12 {
        let mut tags = vec!["all"];
        if i % 2 == 0 {
            tags.push("even");
        }
        if i % 3 == 0 {
            tags.push("third");
        }
        rows.push(vec![
            format!("Flow {i:02}"),
            format!("Description of flow {i}"),
            tags.join(", "),
            "1. Read 2. Transform 3. Write".to_string(),
        ]);
    }
    parse_rows(&rows, "sheet").unwrap()
}

// ---------------------------------------------------------------------------
// Fake source
// ---------------------------------------------------------------------------

/// `WorkflowSource` returning a configurable canned result.
pub struct FakeSource {
    result: Mutex<Result<Vec<Workflow>, FetchError>>,
    calls: AtomicUsize,
    last_settings: Mutex<Option<SourceSettings>>,
}

impl FakeSource {
    pub fn returning(result: Result<Vec<Workflow>, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(result),
            calls: AtomicUsize::new(0),
            last_settings: Mutex::new(None),
        })
    }

    pub fn set_result(&self, result: Result<Vec<Workflow>, FetchError>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_settings(&self) -> Option<SourceSettings> {
        self.last_settings.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowSource for FakeSource {
    async fn fetch(&self, settings: &SourceSettings) -> Result<Vec<Workflow>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_settings.lock().unwrap() = Some(settings.clone());
        self.result.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub source: Arc<FakeSource>,
}

/// Build the full router over a controller using `repository`, optionally
/// with environment-managed settings. Nothing is fetched yet.
pub fn build_test_app(
    repository: impl SettingsRepository + 'static,
    environment: Option<SourceSettings>,
    source: Arc<FakeSource>,
) -> TestApp {
    let config = test_config();
    let controller =
        CatalogController::new(Box::new(repository), environment, ViewControls::default());
    let state = AppState::new(controller, source.clone(), config.clone());
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        source,
    }
}

impl TestApp {
    /// Run the startup sequence at `path` and wait for its fetch.
    pub async fn start(&self, path: &str) {
        if let Some(handle) = fetch::start(&self.state, path).await {
            handle.await.unwrap();
        }
    }

    /// Wait until no fetch is outstanding.
    pub async fn settle(&self) {
        for _ in 0..200 {
            if *self.state.controller.lock().await.state() != ViewState::Loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("fetch did not complete");
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, uri, None).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

/// Collect a response body as JSON (`Null` when empty or not JSON).
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}
