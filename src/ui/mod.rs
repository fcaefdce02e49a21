//! Dashboard UI
//!
//! Rendering only. Every tab reads from `DashboardState` and writes back
//! through `DashboardState::update_view`, the settings form, or an `Action`.

mod activity_tab;
mod campaigns_tab;
mod channels_tab;
mod components;
mod header;
mod settings_tab;
pub mod theme;

pub use activity_tab::render_activity_tab;
pub use campaigns_tab::render_campaigns_tab;
pub use channels_tab::render_channels_tab;
pub use components::render_tab_bar;
pub use header::{render_header, render_status_bar};
pub use settings_tab::render_settings_tab;

use eframe::egui;

use crate::guard::FocusProbe;
use theme::Theme;

/// UI-related state
pub struct UiState {
    /// Current theme
    pub current_theme: Theme,
    /// Whether theme needs to be applied
    pub theme_dirty: bool,
    /// Free-text channel for the switch box
    pub switch_input: String,
    /// Widget ids of the settings form from the last frame it was drawn
    pub form_ids: Vec<egui::Id>,
}

impl UiState {
    pub fn new(theme: Theme) -> Self {
        Self {
            current_theme: theme,
            theme_dirty: true, // Apply theme on first frame
            switch_input: String::new(),
            form_ids: Vec::new(),
        }
    }
}

/// Focus probe backed by egui's keyboard focus
pub struct EguiFocusProbe<'a> {
    focused: Option<egui::Id>,
    form_ids: &'a [egui::Id],
}

impl<'a> EguiFocusProbe<'a> {
    pub fn new(ctx: &egui::Context, form_ids: &'a [egui::Id]) -> Self {
        Self {
            focused: ctx.memory(|m| m.focused()),
            form_ids,
        }
    }
}

impl FocusProbe for EguiFocusProbe<'_> {
    fn settings_form_focused(&self) -> bool {
        self.focused.is_some_and(|id| self.form_ids.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_probe_matches_form_ids() {
        let form_ids = [egui::Id::new("language"), egui::Id::new("priority")];

        let probe = EguiFocusProbe {
            focused: Some(egui::Id::new("priority")),
            form_ids: &form_ids,
        };
        assert!(probe.settings_form_focused());

        let probe = EguiFocusProbe {
            focused: Some(egui::Id::new("campaign_search")),
            form_ids: &form_ids,
        };
        assert!(!probe.settings_form_focused());

        let probe = EguiFocusProbe {
            focused: None,
            form_ids: &form_ids,
        };
        assert!(!probe.settings_form_focused());
    }
}
