//! Dashboard state container
//!
//! One explicit owner for everything the dashboard knows:
//!
//! - server-derived: the latest runtime snapshot and settings, replaced
//!   atomically per poll
//! - locally-derived: view state, the settings form, the edit guard and the
//!   uptime clock, which survive polls untouched by the server
//!
//! The projection is cached and recomputed only when the snapshot, the view
//! state or the priority list changes.

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::guard::{EditGuard, FocusProbe, GuardDecision};
use crate::model::{RuntimeSnapshot, Settings, Snapshot};
use crate::projection::{self, Projection, RuntimeHeader};
use crate::settings_form::SettingsForm;
use crate::ticker::UptimeClock;
use crate::view_state::{ViewState, ViewStore};

/// Events that state poll methods can return.
/// These communicate results back to the app without direct mutation.
#[derive(Debug)]
pub enum StateEvent {
    /// Settings were stored by the agent
    SettingsSaved(Settings),

    /// Log an error message
    LogError(String),

    /// Log an info message
    LogInfo(String),
}

/// What applying a snapshot changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    pub runtime_replaced: bool,
    pub settings: Option<GuardDecision>,
    pub uptime_started: bool,
}

/// All dashboard state
pub struct DashboardState {
    runtime: Option<RuntimeSnapshot>,
    settings: Option<Settings>,
    last_update: Option<DateTime<Utc>>,
    last_error: Option<String>,

    view: ViewStore,
    pub form: SettingsForm,
    guard: EditGuard,
    pub clock: UptimeClock,

    header: RuntimeHeader,
    projection: Projection,
    projection_dirty: bool,
}

impl DashboardState {
    /// Fresh state with the view restored from a link
    pub fn new(view_link: &str) -> Self {
        Self {
            runtime: None,
            settings: None,
            last_update: None,
            last_error: None,
            view: ViewStore::from_query(view_link),
            form: SettingsForm::default(),
            guard: EditGuard::default(),
            clock: UptimeClock::default(),
            header: projection::project_header(None),
            projection: Projection::default(),
            projection_dirty: true,
        }
    }

    /// Apply a decoded snapshot. Parts missing from the payload keep their
    /// previous values.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot, probe: &dyn FocusProbe) -> ApplyReport {
        let mut report = ApplyReport::default();

        if let Some(settings) = snapshot.settings {
            let previous_priority = self.guard.priority().to_vec();
            report.settings = Some(self.guard.offer(&settings, &mut self.form, probe));
            if self.guard.priority() != previous_priority.as_slice() {
                self.projection_dirty = true;
            }
            self.settings = Some(settings);
        }

        if let Some(runtime) = snapshot.runtime {
            report.uptime_started = self.clock.observe(runtime.started_at);
            self.header = projection::project_header(Some(&runtime));
            self.runtime = Some(runtime);
            self.projection_dirty = true;
            report.runtime_replaced = true;
        }

        self.last_update = Some(Utc::now());
        self.last_error = None;
        report
    }

    /// Record a failed poll. Nothing else changes.
    pub fn record_poll_failure(&mut self, error: &ApiError) {
        tracing::warn!("Poll failed: {}", error);
        self.last_error = Some(error.message());
    }

    /// Remember the form contents about to be sent to the agent
    pub fn settings_submitted(&mut self, submitted: &Settings) {
        self.guard.note_submitted(submitted);
    }

    /// Settings stored by the agent after a save
    pub fn settings_saved(&mut self, saved: Settings, probe: &dyn FocusProbe) -> GuardDecision {
        let decision = self.guard.mark_saved(&saved, &mut self.form, probe);
        self.settings = Some(saved);
        self.projection_dirty = true;
        decision
    }

    /// Mutate the view state; re-projects lazily on the next read
    pub fn update_view(&mut self, mutate: impl FnOnce(&mut ViewState)) -> bool {
        let changed = self.view.update(mutate);
        if changed {
            self.projection_dirty = true;
        }
        changed
    }

    pub fn view(&self) -> &ViewState {
        self.view.state()
    }

    /// Shareable link for the current view
    pub fn view_link(&self) -> &str {
        self.view.link()
    }

    /// Current projection, recomputed if inputs changed
    pub fn projection(&mut self) -> &Projection {
        if self.projection_dirty {
            self.projection = projection::project(
                self.runtime.as_ref(),
                self.view.state(),
                self.guard.priority(),
            );
            self.projection_dirty = false;
        }
        &self.projection
    }

    pub fn header(&self) -> &RuntimeHeader {
        &self.header
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn guard(&self) -> &EditGuard {
        &self.guard
    }

    pub fn has_unsaved_settings(&self) -> bool {
        self.guard.has_unsaved_edits(&self.form)
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
