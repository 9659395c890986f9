//! The fetch seam between the controller and a remote catalog.

use async_trait::async_trait;

use crate::record::Workflow;
use crate::settings::{SettingsField, SourceSettings};

/// Why a catalog fetch failed.
///
/// Every variant is shown to the user on the settings screen, so the
/// display strings are written as end-user guidance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// A required setting is empty. Raised before any network call.
    #[error(
        "Configuration Error: The {field} is missing. Please provide it on the settings page."
    )]
    Configuration { field: SettingsField },

    /// The header row lacks a required column.
    #[error("Missing required column in Google Sheet: {}", capitalize(.column))]
    Schema { column: String },

    /// The remote API answered with a non-success status.
    #[error(
        "Google Sheets API Error: {message} (Status: {status}).\n\n{}",
        remediation_checklist(.sheet_id)
    )]
    Remote {
        status: u16,
        message: String,
        sheet_id: String,
    },

    /// The request never produced a usable response.
    #[error("A network error occurred while fetching workflow data ({0}). Please check your internet connection.")]
    Network(String),
}

/// Checklist appended to remote failures.
pub fn remediation_checklist(sheet_id: &str) -> String {
    format!(
        "Please check the following:\n\
         1. Is your API Key correct and valid?\n\
         2. Is the Google Sheets API enabled in your Google Cloud project?\n\
         3. Is the Google Sheet ID ('{sheet_id}') correct?\n\
         4. Is your Google Sheet shared publicly ('Anyone with the link can view')?"
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A remote catalog that can be read as a list of workflows.
///
/// Implementations perform exactly one read per call and must not touch any
/// shared state; the controller decides what to do with the result.
#[async_trait]
pub trait WorkflowSource: Send + Sync {
    async fn fetch(&self, settings: &SourceSettings) -> Result<Vec<Workflow>, FetchError>;
}

/// Fail with [`FetchError::Configuration`] if any setting is empty.
pub fn check_settings(settings: &SourceSettings) -> Result<(), FetchError> {
    match settings.missing_field() {
        Some(field) => Err(FetchError::Configuration { field }),
        None => Ok(()),
    }
}
