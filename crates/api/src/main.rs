use std::net::SocketAddr;
use std::sync::Arc;

use flowshelf_core::browse::ViewControls;
use flowshelf_core::controller::CatalogController;
use flowshelf_core::routing::LIST_PATH;
use flowshelf_core::settings::environment_override;
use flowshelf_sheets::{SheetsApi, SheetsSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowshelf_api::config::ServerConfig;
use flowshelf_api::fetch;
use flowshelf_api::router::build_app_router;
use flowshelf_api::settings_store::JsonFileSettingsRepository;
use flowshelf_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flowshelf_api=debug,flowshelf_core=debug,flowshelf_sheets=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Data source settings ---
    let repository = JsonFileSettingsRepository::new(config.settings_path.clone());
    let environment = environment_override();
    if environment.is_some() {
        tracing::info!("Data source configured from environment; settings are read-only");
    } else {
        tracing::info!(path = %config.settings_path.display(), "Using stored data source settings");
    }

    let controller = CatalogController::new(
        Box::new(repository),
        environment,
        ViewControls::with_dark_mode(config.dark_mode),
    );

    // --- Sheets client ---
    let source = SheetsSource::new(SheetsApi::new(config.sheets_api_base_url.clone()));
    tracing::info!(base_url = %config.sheets_api_base_url, "Sheets client created");

    // --- App state ---
    let state = AppState::new(controller, Arc::new(source), config.clone());

    // --- Startup fetch ---
    if fetch::start(&state, LIST_PATH).await.is_none() {
        tracing::info!("Data source not configured; waiting for settings");
    }

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
