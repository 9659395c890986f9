//! The view-state controller.
//!
//! [`CatalogController`] is the single owner of the record list, the view
//! controls, the navigation path and the active [`ViewState`]. It never does
//! I/O itself beyond the [`SettingsRepository`] it is given: fetches are
//! split into [`CatalogController::refresh`] (which hands out a
//! [`FetchTicket`]) and [`CatalogController::complete_fetch`], so a host can
//! run the network call without holding the controller.
//!
//! State machine:
//!
//! ```text
//! loading  --config incomplete / fetch failed-->  settings { error }
//! loading  --fetch ok, path is a known id----->   detail
//! loading  --fetch ok------------------------->   list
//! list     --select------------------------->     detail   (push /workflow/<id>)
//! detail   --back--------------------------->     list     (push /)
//! loading, settings: back is ignored, select is a validation error
//! any      --show settings------------------->    settings
//! settings --save---------------------------->    loading
//! ```
//!
//! Concurrent fetches are neither cancelled nor deduplicated. Every
//! completion is applied in the order it arrives, so the last one to
//! resolve wins even if it was issued first.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::browse::{self, BrowsePage, TagCount, ViewControls};
use crate::error::CoreError;
use crate::record::Workflow;
use crate::routing::{self, LIST_PATH};
use crate::settings::{SettingsOrigin, SettingsRepository, SourceSettings};
use crate::source::{check_settings, FetchError};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Which top-level screen is shown, with the data valid for it.
///
/// Fetch errors do not have a state of their own: they are carried by
/// `Settings` so the user always lands somewhere they can act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Settings { error: Option<String> },
    List,
    Detail { workflow: Workflow },
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Settings { .. } => "settings",
            Self::List => "list",
            Self::Detail { .. } => "detail",
        }
    }
}

/// What the host should do with its navigation history after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "snake_case")]
pub enum Navigation {
    Push(String),
    Replace(String),
    Stay,
}

/// Permission to run one fetch, issued by the controller.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    settings: SourceSettings,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Settings snapshot the fetch must use.
    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }
}

/// Read model for the settings screen.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub sheet_id: String,
    pub sheet_name: String,
    /// Masked; the raw key never leaves the controller.
    pub api_key: String,
    pub origin: SettingsOrigin,
    /// Environment-managed settings are display-only.
    pub read_only: bool,
    /// No catalog has been loaded yet, so there is nothing to go back to.
    pub initial_setup: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchReason {
    Startup,
    User,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct CatalogController {
    repository: Box<dyn SettingsRepository>,
    settings: SourceSettings,
    origin: SettingsOrigin,
    last_fetched_at: Option<DateTime<Utc>>,
    state: ViewState,
    records: Vec<Workflow>,
    loaded: bool,
    controls: ViewControls,
    path: String,
    issued: u64,
}

impl CatalogController {
    /// Build a controller in the `Loading` state.
    ///
    /// `environment` takes precedence over whatever the repository holds and
    /// makes the settings read-only. A repository that fails to load is
    /// treated as empty.
    pub fn new(
        repository: Box<dyn SettingsRepository>,
        environment: Option<SourceSettings>,
        controls: ViewControls,
    ) -> Self {
        let stored = repository.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load stored settings, using defaults");
            Default::default()
        });

        let (settings, origin) = match environment {
            Some(env) => (env, SettingsOrigin::Environment),
            None => (stored.settings, SettingsOrigin::Stored),
        };

        Self {
            repository,
            settings,
            origin,
            last_fetched_at: stored.last_fetched_at,
            state: ViewState::Loading,
            records: Vec::new(),
            loaded: false,
            controls,
            path: LIST_PATH.to_string(),
            issued: 0,
        }
    }

    // -- accessors -----------------------------------------------------------

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn records(&self) -> &[Workflow] {
        &self.records
    }

    /// `true` once any fetch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    pub fn origin(&self) -> SettingsOrigin {
        self.origin
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    /// Mutable access to the browse controls. Control changes never change
    /// the view state.
    pub fn controls_mut(&mut self) -> &mut ViewControls {
        &mut self.controls
    }

    pub fn find(&self, id: &str) -> Option<&Workflow> {
        self.records.iter().find(|w| w.id == id)
    }

    /// The visible page for the current controls.
    pub fn current_page(&self) -> BrowsePage {
        browse::browse(&self.records, &self.controls)
    }

    pub fn tag_index(&self) -> Vec<TagCount> {
        browse::tag_index(&self.records)
    }

    pub fn all_tags(&self) -> Vec<String> {
        browse::all_tags(&self.records)
    }

    pub fn settings_view(&self) -> SettingsView {
        let error = match &self.state {
            ViewState::Settings { error } => error.clone(),
            _ => None,
        };
        SettingsView {
            sheet_id: self.settings.sheet_id.clone(),
            sheet_name: self.settings.sheet_name.clone(),
            api_key: self.settings.masked_api_key(),
            origin: self.origin,
            read_only: self.origin == SettingsOrigin::Environment,
            initial_setup: !self.loaded,
            last_fetched_at: self.last_fetched_at,
            error,
        }
    }

    // -- fetch lifecycle -----------------------------------------------------

    /// Begin the startup load for the path the application was opened at.
    ///
    /// Incomplete settings go straight to the settings screen with no error
    /// and no ticket.
    pub fn start(&mut self, initial_path: &str) -> Option<FetchTicket> {
        self.path = initial_path.to_string();
        self.begin_fetch(FetchReason::Startup)
    }

    /// User-initiated re-fetch with the current settings.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.begin_fetch(FetchReason::User)
    }

    /// Persist new settings and re-fetch with them.
    ///
    /// Rejected when settings are environment-managed.
    pub fn save_settings(
        &mut self,
        settings: SourceSettings,
    ) -> Result<Option<FetchTicket>, CoreError> {
        if self.origin == SettingsOrigin::Environment {
            return Err(CoreError::Forbidden(
                "Configuration is managed by environment variables and cannot be changed here"
                    .into(),
            ));
        }

        self.repository.save(&settings)?;
        tracing::info!(
            sheet_id = %settings.sheet_id,
            sheet_name = %settings.sheet_name,
            "Settings saved"
        );
        self.settings = settings;

        Ok(self.begin_fetch(FetchReason::User))
    }

    fn begin_fetch(&mut self, reason: FetchReason) -> Option<FetchTicket> {
        if let Err(e) = check_settings(&self.settings) {
            let error = match reason {
                FetchReason::Startup => None,
                FetchReason::User => Some(e.to_string()),
            };
            tracing::debug!(?reason, "Settings incomplete, showing settings");
            self.state = ViewState::Settings { error };
            return None;
        }

        self.issued += 1;
        self.state = ViewState::Loading;
        tracing::debug!(generation = self.issued, ?reason, "Fetch issued");

        Some(FetchTicket {
            generation: self.issued,
            settings: self.settings.clone(),
        })
    }

    /// Apply the outcome of a fetch.
    ///
    /// Success replaces the record list and routes by the current path;
    /// failure moves to the settings screen with the error message. Records
    /// from the last successful fetch are kept on failure.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Workflow>, FetchError>,
    ) -> Navigation {
        if ticket.generation < self.issued {
            tracing::warn!(
                generation = ticket.generation,
                latest = self.issued,
                "Older fetch resolved after a newer one was issued; applying it"
            );
        }

        match result {
            Ok(records) => {
                tracing::info!(
                    generation = ticket.generation,
                    count = records.len(),
                    sheet_id = %ticket.settings.sheet_id,
                    "Catalog loaded"
                );
                self.records = records;
                self.loaded = true;

                let now = Utc::now();
                if let Err(e) = self.repository.record_fetch(now) {
                    tracing::warn!(error = %e, "Could not persist fetch timestamp");
                }
                self.last_fetched_at = Some(now);

                self.route_from_path()
            }
            Err(e) => {
                tracing::error!(generation = ticket.generation, error = %e, "Catalog fetch failed");
                self.state = ViewState::Settings {
                    error: Some(e.to_string()),
                };
                Navigation::Stay
            }
        }
    }

    // -- navigation ----------------------------------------------------------

    /// Open the detail view for `id`.
    ///
    /// Only the list and detail screens offer a selection; anywhere else
    /// (including while a fetch is outstanding) this is a validation error.
    pub fn select(&mut self, id: &str) -> Result<Navigation, CoreError> {
        if !matches!(self.state, ViewState::List | ViewState::Detail { .. }) {
            return Err(CoreError::Validation(format!(
                "Cannot open a workflow from the {} screen",
                self.state.name()
            )));
        }

        let workflow = self.find(id).cloned().ok_or_else(|| CoreError::NotFound {
            entity: "Workflow",
            id: id.to_string(),
        })?;

        self.path = routing::detail_path(id);
        self.state = ViewState::Detail { workflow };
        Ok(Navigation::Push(self.path.clone()))
    }

    /// Leave the detail view for the list.
    ///
    /// Outside the detail view there is nothing to go back from, so the
    /// state and path are left alone.
    pub fn back(&mut self) -> Navigation {
        if !matches!(self.state, ViewState::Detail { .. }) {
            tracing::debug!(
                state = self.state.name(),
                "Back ignored outside detail view"
            );
            return Navigation::Stay;
        }
        self.path = LIST_PATH.to_string();
        self.state = ViewState::List;
        Navigation::Push(self.path.clone())
    }

    /// React to a history (back/forward) event.
    ///
    /// The target state is derived from `path` against the records already
    /// in memory; nothing is fetched. Until a catalog has been loaded, and
    /// while a fetch is outstanding, the path is only remembered.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        self.path = path.to_string();
        if !self.loaded || self.state == ViewState::Loading {
            return Navigation::Stay;
        }
        self.route_from_path()
    }

    /// Show the settings screen. Always permitted.
    pub fn show_settings(&mut self) {
        if !matches!(self.state, ViewState::Settings { .. }) {
            self.state = ViewState::Settings { error: None };
        }
    }

    /// Leave the settings screen for the list.
    ///
    /// Fails while no catalog has been loaded, since there is no list yet.
    pub fn close_settings(&mut self) -> Result<Navigation, CoreError> {
        if !self.loaded {
            return Err(CoreError::Validation(
                "No workflows have been loaded yet; save valid settings first".into(),
            ));
        }
        self.state = ViewState::List;
        if self.path == LIST_PATH {
            Ok(Navigation::Stay)
        } else {
            self.path = LIST_PATH.to_string();
            Ok(Navigation::Replace(self.path.clone()))
        }
    }

    /// Derive list/detail from the current path. An id that is not in the
    /// record list falls back to the list with a corrected path.
    fn route_from_path(&mut self) -> Navigation {
        let Some(id) = routing::parse_detail_id(&self.path) else {
            self.state = ViewState::List;
            return Navigation::Stay;
        };

        match self.find(&id).cloned() {
            Some(workflow) => {
                self.state = ViewState::Detail { workflow };
                Navigation::Stay
            }
            None => {
                tracing::debug!(%id, "Requested workflow not found, redirecting to list");
                self.path = LIST_PATH.to_string();
                self.state = ViewState::List;
                Navigation::Replace(self.path.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
