//! Workflow records and their ingestion from spreadsheet rows.
//!
//! The first row of a sheet is a header row. Header text is normalized to a
//! lookup key so that `Input Details`, `input details` and `InputDetails`
//! all address the same column. Every later row becomes one [`Workflow`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::source::FetchError;

// ---------------------------------------------------------------------------
// Column keys
// ---------------------------------------------------------------------------

pub const COLUMN_TITLE: &str = "title";
pub const COLUMN_DESCRIPTION: &str = "description";
pub const COLUMN_TAGS: &str = "tags";
pub const COLUMN_INPUT_DETAILS: &str = "inputDetails";
pub const COLUMN_PROCESS_SUMMARY: &str = "processSummary";
pub const COLUMN_OUTPUT_DETAILS: &str = "outputDetails";
pub const COLUMN_WORKFLOW_URL: &str = "workflowUrl";
pub const COLUMN_MARKDOWN_URL: &str = "markdownUrl";
pub const COLUMN_WORKFLOW_JSON: &str = "workflowJson";

/// Columns that must be present in the header row, in check order.
pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_TITLE, COLUMN_DESCRIPTION, COLUMN_TAGS];

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One catalog entry, built from one data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// `"{sheet_id}-{row_index}"`; only unique within one fetch.
    pub id: String,
    pub title: String,
    pub description: String,
    pub input_details: String,
    pub process_summary: String,
    pub output_details: String,
    pub workflow_url: String,
    pub markdown_url: String,
    /// Serialized workflow diagram, passed through untouched.
    pub workflow_json: String,
    pub tags: Vec<String>,
}

impl Workflow {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Split the process summary on inline enumerators (`1. a 2. b`).
    ///
    /// Returns more than one step only when the summary is written as a
    /// numbered list; otherwise the trimmed summary is the single step.
    pub fn process_steps(&self) -> Vec<String> {
        split_numbered_steps(&self.process_summary)
    }
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Normalize a header cell to its lookup key.
///
/// The cell is trimmed, its first character lowercased, and all whitespace
/// in the remainder removed: `"Process Summary"` becomes `"processSummary"`.
pub fn normalize_header(header: &str) -> String {
    let mut chars = header.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_lowercase()
            .chain(chars.filter(|c| !c.is_whitespace()))
            .collect(),
        None => String::new(),
    }
}

/// Split a raw tags cell on commas.
///
/// Pieces are trimmed, empty pieces dropped, and exact duplicates removed
/// keeping the first occurrence.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for piece in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !tags.iter().any(|t| t == piece) {
            tags.push(piece.to_string());
        }
    }
    tags
}

/// Map raw sheet rows to workflows.
///
/// Fewer than two rows (no data) yields an empty list. Otherwise the header
/// row must contain every column in [`REQUIRED_COLUMNS`]; the first missing
/// one fails with [`FetchError::Schema`] before any data row is read. Rows
/// whose title is empty are dropped.
pub fn parse_rows(rows: &[Vec<String>], sheet_id: &str) -> Result<Vec<Workflow>, FetchError> {
    let Some((header, data_rows)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    if data_rows.is_empty() {
        return Ok(Vec::new());
    }

    // Later duplicates win, matching a plain key/value overwrite.
    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(index, cell)| (normalize_header(cell), index))
        .collect();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|key| !columns.contains_key(**key))
    {
        return Err(FetchError::Schema {
            column: (*missing).to_string(),
        });
    }

    let workflows = data_rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let cell = |key: &str| -> String {
                columns
                    .get(key)
                    .and_then(|&col| row.get(col))
                    .cloned()
                    .unwrap_or_default()
            };

            Workflow {
                id: format!("{sheet_id}-{index}"),
                title: cell(COLUMN_TITLE),
                description: cell(COLUMN_DESCRIPTION),
                input_details: cell(COLUMN_INPUT_DETAILS),
                process_summary: cell(COLUMN_PROCESS_SUMMARY),
                output_details: cell(COLUMN_OUTPUT_DETAILS),
                workflow_url: cell(COLUMN_WORKFLOW_URL),
                markdown_url: cell(COLUMN_MARKDOWN_URL),
                workflow_json: cell(COLUMN_WORKFLOW_JSON),
                tags: split_tags(&cell(COLUMN_TAGS)),
            }
        })
        .filter(|workflow| !workflow.title.is_empty())
        .collect();

    Ok(workflows)
}

/// Split text on `N.` enumerators, dropping empty pieces.
fn split_numbered_steps(summary: &str) -> Vec<String> {
    let mut steps = Vec::new();
    let mut current = String::new();
    let mut chars = summary.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_ascii_digit() {
            let mut end = start + c.len_utf8();
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            if let Some(&(_, '.')) = chars.peek() {
                chars.next();
                steps.push(std::mem::take(&mut current));
                continue;
            }
            current.push_str(&summary[start..end]);
            continue;
        }
        current.push(c);
    }
    steps.push(current);

    steps
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
