//! REST client for the Google Sheets v4 values endpoint.
//!
//! Only one call is needed: reading a cell range as rows of strings.

use serde::Deserialize;

/// Default API host. Overridable so tests can point at a local server.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Message used when an error response carries no readable message.
pub const UNKNOWN_API_ERROR: &str = "Unknown API error.";

/// HTTP client for the Sheets API.
pub struct SheetsApi {
    client: reqwest::Client,
    base_url: String,
}

/// Body of a successful `values.get` call.
///
/// `values` is absent when the range holds no data.
#[derive(Debug, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Rows with every cell rendered as text. Nulls become empty strings.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }

    /// The range the API actually read (it widens `A:J` to the used
    /// cells), or `requested` when the response omits it.
    pub fn range_or<'a>(&'a self, requested: &'a str) -> &'a str {
        self.range.as_deref().unwrap_or(requested)
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Errors from the Sheets REST layer.
#[derive(Debug, thiserror::Error)]
pub enum SheetsApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Sheets API error ({status}): {message}")]
    ApiError {
        status: u16,
        /// `error.message` from the response envelope, or
        /// [`UNKNOWN_API_ERROR`].
        message: String,
    },
}

impl SheetsApi {
    /// Create a client for the given API host, e.g. [`DEFAULT_BASE_URL`].
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read `range` (A1 notation, e.g. `Sheet1!A:J`) of a spreadsheet.
    ///
    /// Sends `GET /v4/spreadsheets/{sheet_id}/values/{range}?key={api_key}`
    /// with both path segments percent-encoded.
    pub async fn get_values(
        &self,
        sheet_id: &str,
        range: &str,
        api_key: &str,
    ) -> Result<ValueRange, SheetsApiError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(sheet_id),
            urlencoding::encode(range),
        );

        let response = self
            .client
            .get(url)
            .query(&[("key", api_key)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`SheetsApiError::ApiError`] carrying the envelope message.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SheetsApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsApiError::ApiError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SheetsApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Extract `error.message` from an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string())
}
