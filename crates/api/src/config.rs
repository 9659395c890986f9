use std::path::PathBuf;

use flowshelf_sheets::api::DEFAULT_BASE_URL;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running locally. The data-source
/// settings themselves are not part of this struct; see
/// [`flowshelf_core::settings::environment_override`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JSON file holding user-entered settings.
    pub settings_path: PathBuf,
    /// Sheets API host (overridable for local testing).
    pub sheets_api_base_url: String,
    /// Initial theme flag for the view controls.
    pub dark_mode: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                         |
    /// |---------------------------|---------------------------------|
    /// | `HOST`                    | `127.0.0.1`                     |
    /// | `PORT`                    | `3000`                          |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                            |
    /// | `FLOWSHELF_SETTINGS_PATH` | `flowshelf-settings.json`       |
    /// | `SHEETS_API_BASE_URL`     | `https://sheets.googleapis.com` |
    /// | `FLOWSHELF_DARK_MODE`     | `false`                         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let settings_path = std::env::var("FLOWSHELF_SETTINGS_PATH")
            .unwrap_or_else(|_| "flowshelf-settings.json".into())
            .into();

        let sheets_api_base_url =
            std::env::var("SHEETS_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let dark_mode: bool = std::env::var("FLOWSHELF_DARK_MODE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("FLOWSHELF_DARK_MODE must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            settings_path,
            sheets_api_base_url,
            dark_mode,
        }
    }
}
