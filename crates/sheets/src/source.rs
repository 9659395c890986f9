//! [`WorkflowSource`] backed by the Sheets API.

use async_trait::async_trait;
use flowshelf_core::record::{parse_rows, Workflow};
use flowshelf_core::settings::SourceSettings;
use flowshelf_core::source::{check_settings, FetchError, WorkflowSource};

use crate::api::{SheetsApi, SheetsApiError};

/// Columns read from the sheet.
pub const COLUMN_SPAN: &str = "A:J";

/// Reads the catalog from one sheet of a spreadsheet.
pub struct SheetsSource {
    api: SheetsApi,
}

impl SheetsSource {
    pub fn new(api: SheetsApi) -> Self {
        Self { api }
    }
}

/// A1 range covering the catalog columns of `sheet_name`.
pub fn sheet_range(sheet_name: &str) -> String {
    format!("{sheet_name}!{COLUMN_SPAN}")
}

#[async_trait]
impl WorkflowSource for SheetsSource {
    async fn fetch(&self, settings: &SourceSettings) -> Result<Vec<Workflow>, FetchError> {
        check_settings(settings)?;

        let range = sheet_range(&settings.sheet_name);
        tracing::debug!(sheet_id = %settings.sheet_id, %range, "Fetching sheet values");

        let values = self
            .api
            .get_values(&settings.sheet_id, &range, &settings.api_key)
            .await
            .map_err(|e| match e {
                SheetsApiError::ApiError { status, message } => {
                    tracing::error!(
                        status,
                        %message,
                        sheet_id = %settings.sheet_id,
                        "Sheets API error"
                    );
                    FetchError::Remote {
                        status,
                        message,
                        sheet_id: settings.sheet_id.clone(),
                    }
                }
                SheetsApiError::Request(e) => {
                    tracing::error!(error = %e, "Sheets request failed");
                    FetchError::Network(e.to_string())
                }
            })?;

        let rows = values.rows();
        if rows.is_empty() {
            tracing::warn!(
                sheet_id = %settings.sheet_id,
                range = values.range_or(&range),
                "No data found in sheet"
            );
            return Ok(Vec::new());
        }

        let workflows = parse_rows(&rows, &settings.sheet_id).inspect_err(|e| {
            tracing::error!(
                error = %e,
                sheet_id = %settings.sheet_id,
                "Sheet has an invalid header row"
            );
        })?;

        tracing::info!(
            sheet_id = %settings.sheet_id,
            range = values.range_or(&range),
            rows = rows.len() - 1,
            count = workflows.len(),
            "Sheet parsed"
        );
        Ok(workflows)
    }
}
