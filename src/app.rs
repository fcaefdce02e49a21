use chrono::Utc;
use eframe::egui;
use std::time::{Duration, Instant};

use crate::api::AgentClient;
use crate::config::Config;
use crate::dispatcher::{Action, ActionDispatcher};
use crate::poller::{PollOutcome, SnapshotPoller};
use crate::state::{DashboardState, StateEvent};
use crate::ui::{self, UiState};

/// Delay before a changed view link is written to the config file
const VIEW_SAVE_DELAY: Duration = Duration::from_secs(1);

/// Repaint cadence while requests are in flight
const IN_FLIGHT_REPAINT: Duration = Duration::from_millis(100);

/// Main application state
pub struct DropdeckApp {
    /// Application configuration
    pub config: Config,
    /// `None` when the configured agent URL is unusable
    pub client: Option<AgentClient>,
    /// Why `client` could not be built
    pub client_error: Option<String>,
    /// Server-derived and local dashboard state
    pub state: DashboardState,
    pub poller: SnapshotPoller,
    pub dispatcher: ActionDispatcher,
    pub ui: UiState,
    /// When the view link last changed without being saved
    view_dirty_since: Option<Instant>,
}

impl DropdeckApp {
    /// Create a new application instance. `view` overrides the saved view link.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config, view: Option<String>) -> Self {
        let (client, client_error) = match AgentClient::from_config(&config.server) {
            Ok(client) => {
                tracing::info!("Using agent at {}", client.base_url());
                (Some(client), None)
            }
            Err(e) => {
                tracing::error!("Failed to create agent client: {}", e);
                (None, Some(e.to_string()))
            }
        };

        let link = view.unwrap_or_else(|| config.view.link.clone());
        let state = DashboardState::new(&link);
        let poller = SnapshotPoller::new(config.polling.interval());
        let dispatcher = ActionDispatcher::new(config.polling.status_clear_after());
        let ui = UiState::new(config.launcher.theme.theme());

        Self {
            config,
            client,
            client_error,
            state,
            poller,
            dispatcher,
            ui,
            view_dirty_since: None,
        }
    }

    /// Send an action to the agent. Never blocks.
    pub fn dispatch(&mut self, action: Action) {
        match &self.client {
            Some(client) => self.dispatcher.dispatch(action, client),
            None => tracing::warn!("Cannot {}: no agent client", action.name()),
        }
    }

    /// Write the dashboard's own preferences (view link and theme) to the
    /// config file. `self.config` also carries environment and `--url`
    /// overrides, so it is never saved as a whole.
    pub fn save_preferences(&self) {
        let link = self.config.view.link.clone();
        let theme = self.config.launcher.theme;
        let result = Config::update_saved(|file| {
            file.view.link = link;
            file.launcher.theme = theme;
            Ok(())
        });
        if let Err(e) = result {
            tracing::error!("Failed to save config: {}", e);
        }
    }

    /// Collect finished polls and apply them
    fn poll_snapshots(&mut self, ctx: &egui::Context, now: Instant) {
        let minimized = ctx.input(|i| i.viewport().minimized).unwrap_or(false);
        self.poller.schedule_mut().set_visible(!minimized);

        if let Some(client) = &self.client {
            self.poller.tick(now, client);
        }

        let probe = ui::EguiFocusProbe::new(ctx, &self.ui.form_ids);
        for outcome in self.poller.poll() {
            match outcome {
                PollOutcome::Snapshot(snapshot) => {
                    self.state.apply_snapshot(snapshot, &probe);
                }
                PollOutcome::Failed(err) => self.state.record_poll_failure(&err),
                PollOutcome::Stale { seq } => tracing::trace!("Ignored stale poll #{}", seq),
            }
        }
    }

    /// Collect finished actions
    fn poll_actions(&mut self, ctx: &egui::Context, now: Instant) {
        let events = self.dispatcher.poll(now);
        let probe = ui::EguiFocusProbe::new(ctx, &self.ui.form_ids);

        for event in events {
            match event {
                StateEvent::SettingsSaved(saved) => {
                    self.state.settings_saved(saved, &probe);
                    // Pick up anything else the save changed on the agent
                    self.poller.schedule_mut().poll_now();
                }
                StateEvent::LogError(msg) => tracing::error!("{}", msg),
                StateEvent::LogInfo(msg) => tracing::info!("{}", msg),
            }
        }
    }

    /// Send the settings form to the agent
    pub fn save_settings(&mut self) {
        let settings = self.state.form.to_settings();
        self.state.settings_submitted(&settings);
        self.dispatch(Action::SaveSettings(settings));
    }

    /// Persist the view link once it has settled
    fn persist_view(&mut self, now: Instant) {
        if self.state.view_link() != self.config.view.link {
            self.config.view.link = self.state.view_link().to_string();
            self.view_dirty_since = Some(now);
        }

        if let Some(since) = self.view_dirty_since {
            if now.duration_since(since) >= VIEW_SAVE_DELAY {
                self.view_dirty_since = None;
                self.save_preferences();
            }
        }
    }

    /// Wake up for the next poll, clock tick or status expiry
    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        let mut wait = self.state.clock.until_next_tick(now);

        if let Some(poll) = self.poller.schedule().remaining(now) {
            wait = wait.min(poll);
        }
        if let Some(deadline) = self.dispatcher.next_deadline() {
            wait = wait.min(deadline.saturating_duration_since(now));
        }
        if self.view_dirty_since.is_some() {
            wait = wait.min(VIEW_SAVE_DELAY);
        }
        if self.poller.in_flight() > 0 || self.dispatcher.pending() > 0 {
            wait = wait.min(IN_FLIGHT_REPAINT);
        }

        ctx.request_repaint_after(wait);
    }
}

impl eframe::App for DropdeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_snapshots(ctx, now);
        self.poll_actions(ctx, now);
        self.state.clock.tick(now, Utc::now());

        if self.ui.theme_dirty {
            self.ui.current_theme.apply(ctx);
            self.ui.theme_dirty = false;
        }

        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::new()
                    .fill(self.ui.current_theme.bg_darkest)
                    .inner_margin(egui::Margin::symmetric(12, 8)),
            )
            .show(ctx, |ui| ui::render_header(self, ui));

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| ui::render_status_bar(self, ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::render_tab_bar(self, ui);
            ui.add_space(8.0);

            match self.state.view().tab {
                crate::view_state::Tab::Campaigns => ui::render_campaigns_tab(self, ui),
                crate::view_state::Tab::Channels => ui::render_channels_tab(self, ui),
                crate::view_state::Tab::Activity => ui::render_activity_tab(self, ui),
                crate::view_state::Tab::Settings => ui::render_settings_tab(self, ui),
            }
        });

        self.persist_view(now);
        self.schedule_repaint(ctx, now);
    }
}
