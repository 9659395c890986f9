//! Data-source settings and the persistence seam behind them.
//!
//! A catalog is addressed by three strings: the spreadsheet id, the tab
//! (sheet) name, and the API key used as a query credential. Settings either
//! come from the process environment (externally managed, read-only) or from
//! a [`SettingsRepository`] the host provides.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Tab name used when nothing has been stored yet.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Environment prefixes checked in order for each override variable.
pub const ENV_PREFIXES: [&str; 2] = ["FLOWSHELF_", ""];

/// Variable (after prefix) carrying the API key.
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";

/// Variable (after prefix) carrying the spreadsheet id.
pub const ENV_SHEET_ID: &str = "GOOGLE_SHEET_ID";

/// Variable (after prefix) carrying the tab name.
pub const ENV_SHEET_NAME: &str = "GOOGLE_SHEET_NAME";

// ---------------------------------------------------------------------------
// Settings values
// ---------------------------------------------------------------------------

/// One of the three required settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsField {
    ApiKey,
    SheetId,
    SheetName,
}

impl SettingsField {
    /// Human-readable label, as shown next to the settings input.
    pub fn label(self) -> &'static str {
        match self {
            Self::ApiKey => "Google API Key",
            Self::SheetId => "Google Sheet ID",
            Self::SheetName => "Sheet Name",
        }
    }

    /// Machine name matching the serialized field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::SheetId => "sheet_id",
            Self::SheetName => "sheet_name",
        }
    }
}

impl std::fmt::Display for SettingsField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The three strings that address a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub sheet_id: String,
    pub sheet_name: String,
    pub api_key: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            api_key: String::new(),
        }
    }
}

impl SourceSettings {
    pub fn new(
        sheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            sheet_name: sheet_name.into(),
            api_key: api_key.into(),
        }
    }

    /// First empty field, checked as API key, sheet id, then sheet name.
    pub fn missing_field(&self) -> Option<SettingsField> {
        if self.api_key.is_empty() {
            Some(SettingsField::ApiKey)
        } else if self.sheet_id.is_empty() {
            Some(SettingsField::SheetId)
        } else if self.sheet_name.is_empty() {
            Some(SettingsField::SheetName)
        } else {
            None
        }
    }

    /// `true` when a fetch may be attempted.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    /// API key with everything but the last four characters masked.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{visible}", "*".repeat(chars.len() - 4))
    }
}

/// Where the active settings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsOrigin {
    /// Persisted or entered by the user; editable.
    Stored,
    /// Supplied by the process environment; read-only.
    Environment,
}

/// Everything a [`SettingsRepository`] persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(default)]
    pub settings: SourceSettings,
    #[serde(default)]
    pub last_fetched_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Environment override
// ---------------------------------------------------------------------------

/// Resolve the environment override using the given variable lookup.
///
/// Each key is checked as `FLOWSHELF_<KEY>` first and then as bare `<KEY>`.
/// The override only applies when both the API key and the sheet id are
/// present; the sheet name falls back to [`DEFAULT_SHEET_NAME`].
pub fn environment_override_with<F>(lookup: F) -> Option<SourceSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| {
        ENV_PREFIXES
            .iter()
            .find_map(|prefix| lookup(&format!("{prefix}{key}")).filter(|v| !v.trim().is_empty()))
    };

    let api_key = value(ENV_API_KEY)?;
    let sheet_id = value(ENV_SHEET_ID)?;
    let sheet_name = value(ENV_SHEET_NAME).unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());

    Some(SourceSettings {
        sheet_id,
        sheet_name,
        api_key,
    })
}

/// Resolve the environment override from the real process environment.
pub fn environment_override() -> Option<SourceSettings> {
    environment_override_with(|key| std::env::var(key).ok())
}

// ---------------------------------------------------------------------------
// Repository seam
// ---------------------------------------------------------------------------

/// Persistence capability for user-entered settings.
///
/// Implementations must be cheap to call from the controller; they are
/// treated as synchronous and always available. A failing `load` is
/// tolerated by the caller, which falls back to defaults.
pub trait SettingsRepository: Send + Sync {
    fn load(&self) -> Result<StoredSettings, CoreError>;

    fn save(&self, settings: &SourceSettings) -> Result<(), CoreError>;

    /// Record the time of the last successful fetch.
    fn record_fetch(&self, at: DateTime<Utc>) -> Result<(), CoreError>;
}

/// In-memory repository. Clones share the same storage, so a test can keep
/// a handle after giving one to the controller.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsRepository {
    inner: Arc<Mutex<StoredSettings>>,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SourceSettings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoredSettings {
                settings,
                last_fetched_at: None,
            })),
        }
    }

    /// Snapshot of what is currently stored.
    pub fn snapshot(&self) -> StoredSettings {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsRepository for MemorySettingsRepository {
    fn load(&self) -> Result<StoredSettings, CoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, settings: &SourceSettings) -> Result<(), CoreError> {
        let mut stored = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        stored.settings = settings.clone();
        Ok(())
    }

    fn record_fetch(&self, at: DateTime<Utc>) -> Result<(), CoreError> {
        let mut stored = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        stored.last_fetched_at = Some(at);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // -- SourceSettings ------------------------------------------------------

    #[test]
    fn default_settings_use_sheet1() {
        let settings = SourceSettings::default();
        assert_eq!(settings.sheet_name, "Sheet1");
        assert!(settings.sheet_id.is_empty());
        assert!(settings.api_key.is_empty());
    }

    #[test]
    fn missing_field_checks_api_key_first() {
        let settings = SourceSettings::new("", "", "");
        assert_eq!(settings.missing_field(), Some(SettingsField::ApiKey));
    }

    #[test]
    fn missing_field_reports_sheet_id_then_name() {
        assert_eq!(
            SourceSettings::new("", "Sheet1", "key").missing_field(),
            Some(SettingsField::SheetId)
        );
        assert_eq!(
            SourceSettings::new("abc", "", "key").missing_field(),
            Some(SettingsField::SheetName)
        );
    }

    #[test]
    fn complete_settings_have_no_missing_field() {
        let settings = SourceSettings::new("abc", "Sheet1", "key");
        assert!(settings.is_complete());
    }

    #[test]
    fn masked_api_key_keeps_last_four() {
        let settings = SourceSettings::new("abc", "Sheet1", "AIzaSy123456");
        assert_eq!(settings.masked_api_key(), "********3456");
    }

    #[test]
    fn masked_api_key_hides_short_keys_entirely() {
        let settings = SourceSettings::new("abc", "Sheet1", "abc");
        assert_eq!(settings.masked_api_key(), "***");
    }

    // -- Environment override ------------------------------------------------

    #[test]
    fn override_requires_key_and_sheet_id() {
        let lookup = lookup_from(&[("GOOGLE_API_KEY", "k")]);
        assert_eq!(environment_override_with(lookup), None);
    }

    #[test]
    fn override_accepts_bare_names() {
        let lookup = lookup_from(&[("GOOGLE_API_KEY", "k"), ("GOOGLE_SHEET_ID", "s")]);
        let settings = environment_override_with(lookup).unwrap();
        assert_eq!(settings, SourceSettings::new("s", "Sheet1", "k"));
    }

    #[test]
    fn override_prefers_prefixed_names() {
        let lookup = lookup_from(&[
            ("FLOWSHELF_GOOGLE_API_KEY", "prefixed"),
            ("GOOGLE_API_KEY", "bare"),
            ("GOOGLE_SHEET_ID", "s"),
            ("FLOWSHELF_GOOGLE_SHEET_NAME", "Catalog"),
        ]);
        let settings = environment_override_with(lookup).unwrap();
        assert_eq!(settings.api_key, "prefixed");
        assert_eq!(settings.sheet_name, "Catalog");
    }

    #[test]
    fn override_ignores_blank_values() {
        let lookup = lookup_from(&[("FLOWSHELF_GOOGLE_API_KEY", "  "), ("GOOGLE_SHEET_ID", "s")]);
        assert_eq!(environment_override_with(lookup), None);
    }

    // -- MemorySettingsRepository --------------------------------------------

    #[test]
    fn memory_repository_shares_state_between_clones() {
        let repo = MemorySettingsRepository::new();
        let handle = repo.clone();

        let settings = SourceSettings::new("abc", "Tab", "key");
        repo.save(&settings).unwrap();

        assert_eq!(handle.snapshot().settings.sheet_id, "abc");
        assert!(handle.snapshot().last_fetched_at.is_none());
    }

    #[test]
    fn memory_repository_records_fetch_time() {
        let repo = MemorySettingsRepository::new();
        let at = Utc::now();
        repo.record_fetch(at).unwrap();
        assert_eq!(repo.load().unwrap().last_fetched_at, Some(at));
    }
}
