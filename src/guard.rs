//! Edit-safety guard for the settings form.
//!
//! A poll must not clobber a settings form the user is typing into. Before
//! server settings are written into the form, the guard asks a `FocusProbe`
//! whether focus is inside the form; if so the write is skipped for this
//! poll and retried on the next one.
//!
//! This is a focus heuristic, not a lock. An unfocused form with unsaved
//! edits is still overwritten.

use crate::model::Settings;
use crate::settings_form::SettingsForm;

/// Answers whether the settings form currently holds input focus
pub trait FocusProbe {
    fn settings_form_focused(&self) -> bool;
}

/// Fixed answer, for headless callers
impl FocusProbe for bool {
    fn settings_form_focused(&self) -> bool {
        *self
    }
}

/// What the guard did with incoming settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Applied,
    Suppressed,
}

/// Tracks the last settings written into the form and the priority list
#[derive(Debug, Clone, Default)]
pub struct EditGuard {
    /// Priority games from the most recent snapshot, applied or not
    priority: Vec<String>,
    /// Settings the form was last synced to (by a poll or a save)
    last_known_good: Option<Settings>,
    /// Form contents sent with the save that is still in flight
    submitted: Option<Settings>,
    suppressed: u64,
}

impl EditGuard {
    /// Offer server settings to the form.
    ///
    /// The priority cache is refreshed unconditionally; the form is only
    /// filled when it does not have focus.
    pub fn offer(
        &mut self,
        incoming: &Settings,
        form: &mut SettingsForm,
        probe: &dyn FocusProbe,
    ) -> GuardDecision {
        self.priority = incoming.priority.clone();

        if probe.settings_form_focused() {
            self.suppressed += 1;
            tracing::debug!("Settings form has focus, skipping server settings this poll");
            return GuardDecision::Suppressed;
        }

        form.fill(incoming);
        self.last_known_good = Some(incoming.clone());
        GuardDecision::Applied
    }

    /// Remember what the form held when it was submitted
    pub fn note_submitted(&mut self, submitted: &Settings) {
        self.submitted = Some(submitted.clone());
    }

    /// Record a successful save so the next poll does not look like a conflict.
    ///
    /// The agent's reply only replaces the form when the form is unfocused and
    /// has not been edited since it was submitted.
    pub fn mark_saved(
        &mut self,
        saved: &Settings,
        form: &mut SettingsForm,
        probe: &dyn FocusProbe,
    ) -> GuardDecision {
        self.priority = saved.priority.clone();
        self.last_known_good = Some(saved.clone());

        let edited_since_submit = self
            .submitted
            .take()
            .is_some_and(|submitted| form.to_settings() != submitted);

        if edited_since_submit || probe.settings_form_focused() {
            self.suppressed += 1;
            tracing::debug!("Settings form changed during save, keeping the user's input");
            return GuardDecision::Suppressed;
        }

        form.fill(saved);
        GuardDecision::Applied
    }

    /// Cached priority games
    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn last_known_good(&self) -> Option<&Settings> {
        self.last_known_good.as_ref()
    }

    /// Whether the form differs from the last synced settings
    pub fn has_unsaved_edits(&self, form: &SettingsForm) -> bool {
        match &self.last_known_good {
            Some(settings) => form.to_settings() != *settings,
            None => false,
        }
    }

    /// Number of polls whose settings were held back
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_settings(priority: &[&str]) -> Settings {
        Settings {
            priority: priority.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_focused_form_keeps_user_input() {
        let mut guard = EditGuard::default();
        let mut form = SettingsForm::default();
        guard.offer(&server_settings(&["Old"]), &mut form, &false);

        form.priority = "My unsaved, edit".to_string();
        let decision = guard.offer(&server_settings(&["New"]), &mut form, &true);

        assert_eq!(decision, GuardDecision::Suppressed);
        assert_eq!(form.priority, "My unsaved, edit");
        assert_eq!(guard.suppressed_count(), 1);
        // Priority cache still follows the server
        assert_eq!(guard.priority(), ["New".to_string()]);
    }

    #[test]
    fn test_unfocused_form_is_overwritten() {
        let mut guard = EditGuard::default();
        let mut form = SettingsForm::default();
        form.priority = "unsaved but unfocused".to_string();

        let decision = guard.offer(&server_settings(&["A", "B"]), &mut form, &false);
        assert_eq!(decision, GuardDecision::Applied);
        assert_eq!(form.priority, "A, B");
        assert!(!guard.has_unsaved_edits(&form));
    }

    #[test]
    fn test_suppressed_write_retried_next_poll() {
        let mut guard = EditGuard::default();
        let mut form = SettingsForm::default();
        let incoming = server_settings(&["A"]);

        guard.offer(&incoming, &mut form, &true);
        assert_eq!(form.priority, "");

        guard.offer(&incoming, &mut form, &false);
        assert_eq!(form.priority, "A");
    }

    #[test]
    fn test_mark_saved_updates_known_good() {
        let mut guard = EditGuard::default();
        let mut form = SettingsForm::default();
        guard.offer(&server_settings(&["A"]), &mut form, &false);

        form.priority = "A, B".to_string();
        assert!(guard.has_unsaved_edits(&form));

        let saved = form.to_settings();
        guard.note_submitted(&saved);
        assert_eq!(guard.mark_saved(&saved, &mut form, &false), GuardDecision::Applied);
        assert!(!guard.has_unsaved_edits(&form));
        assert_eq!(guard.priority(), ["A".to_string(), "B".to_string()]);
        assert_eq!(guard.last_known_good(), Some(&saved));
    }

    #[test]
    fn test_save_reply_keeps_edits_made_while_saving() {
        let mut guard = EditGuard::default();
        let mut form = SettingsForm::default();
        guard.offer(&server_settings(&["A"]), &mut form, &false);

        form.priority = "A, B".to_string();
        let submitted = form.to_settings();
        guard.note_submitted(&submitted);

        // Still typing when the reply lands
        form.priority = "A, B, C".to_string();
        assert_eq!(
            guard.mark_saved(&submitted, &mut form, &true),
            GuardDecision::Suppressed
        );
        assert_eq!(form.priority, "A, B, C");
        assert_eq!(guard.last_known_good(), Some(&submitted));
        assert!(guard.has_unsaved_edits(&form));
    }

    #[test]
    fn test_save_reply_keeps_edits_after_focus_left() {
        let mut guard = EditGuard::default();
        let mut form = SettingsForm::default();

        form.priority = "A".to_string();
        let submitted = form.to_settings();
        guard.note_submitted(&submitted);
        form.priority = "A, B".to_string();

        assert_eq!(
            guard.mark_saved(&submitted, &mut form, &false),
            GuardDecision::Suppressed
        );
        assert_eq!(form.priority, "A, B");
    }

    #[test]
    fn test_save_reply_normalizes_untouched_form() {
        let mut guard = EditGuard::default();
        let mut form = SettingsForm::default();

        form.priority = "Game A,, Game B ".to_string();
        let submitted = form.to_settings();
        guard.note_submitted(&submitted);

        assert_eq!(guard.mark_saved(&submitted, &mut form, &false), GuardDecision::Applied);
        assert_eq!(form.priority, "Game A, Game B");
    }
}
