//! File-backed [`SettingsRepository`].
//!
//! Settings and the last fetch time are stored together as one JSON
//! document. Every write replaces the file through a temporary sibling so a
//! crash never leaves a half-written document behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flowshelf_core::error::CoreError;
use flowshelf_core::settings::{SettingsRepository, SourceSettings, StoredSettings};

pub struct JsonFileSettingsRepository {
    path: PathBuf,
}

impl JsonFileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document, or defaults when the file does not exist yet.
    fn read(&self) -> Result<StoredSettings, CoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredSettings::default()),
            Err(e) => {
                return Err(CoreError::Storage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_str(&text).map_err(|e| {
            CoreError::Storage(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }

    fn write(&self, stored: &StoredSettings) -> Result<(), CoreError> {
        let storage_err = |e: std::io::Error| {
            CoreError::Storage(format!("Failed to write {}: {e}", self.path.display()))
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let json = serde_json::to_string_pretty(stored)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize settings: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(storage_err)?;
        std::fs::rename(&tmp, &self.path).map_err(storage_err)?;
        Ok(())
    }

    /// Read-modify-write. An unreadable document is replaced rather than
    /// blocking the save.
    fn update(&self, apply: impl FnOnce(&mut StoredSettings)) -> Result<(), CoreError> {
        let mut stored = self.read().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Replacing unreadable settings file");
            StoredSettings::default()
        });
        apply(&mut stored);
        self.write(&stored)
    }
}

impl SettingsRepository for JsonFileSettingsRepository {
    fn load(&self) -> Result<StoredSettings, CoreError> {
        self.read()
    }

    fn save(&self, settings: &SourceSettings) -> Result<(), CoreError> {
        self.update(|stored| stored.settings = settings.clone())
    }

    fn record_fetch(&self, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.update(|stored| stored.last_fetched_at = Some(at))
    }
}
