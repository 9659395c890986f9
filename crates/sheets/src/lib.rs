//! Google Sheets client for the flowshelf catalog.
//!
//! [`api`] is a thin wrapper over the spreadsheet values endpoint;
//! [`source`] adapts it to the core [`WorkflowSource`] seam.
//!
//! [`WorkflowSource`]: flowshelf_core::source::WorkflowSource

pub mod api;
pub mod source;

pub use api::{SheetsApi, SheetsApiError};
pub use source::SheetsSource;
