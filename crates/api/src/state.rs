use std::sync::Arc;

use flowshelf_core::controller::CatalogController;
use flowshelf_core::error::CoreError;
use flowshelf_core::source::WorkflowSource;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The single view-state controller. Never held across a fetch.
    pub controller: Arc<Mutex<CatalogController>>,
    /// Where catalog fetches go.
    pub source: Arc<dyn WorkflowSource>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        controller: CatalogController,
        source: Arc<dyn WorkflowSource>,
        config: ServerConfig,
    ) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            source,
            config: Arc::new(config),
        }
    }

    /// Lock the controller and run `op` against it on the blocking pool.
    ///
    /// Used for operations that write through the settings repository,
    /// which does synchronous file I/O.
    pub async fn with_controller_blocking<R, F>(&self, op: F) -> Result<R, CoreError>
    where
        F: FnOnce(&mut CatalogController) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut controller = self.controller.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || op(&mut *controller))
            .await
            .map_err(|e| CoreError::Internal(format!("Controller task failed: {e}")))
    }
}
