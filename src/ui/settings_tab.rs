//! Settings tab UI rendering

use eframe::egui::{self, RichText};

use crate::api::Credentials;
use crate::app::DropdeckApp;
use crate::model::PriorityMode;
use crate::settings_form::SettingsForm;
use crate::ui::components::{section_frame, status_label};
use crate::ui::theme::{Theme, ThemePreset};

/// Render the settings tab
pub fn render_settings_tab(app: &mut DropdeckApp, ui: &mut egui::Ui) {
    let theme = app.ui.current_theme.clone();

    egui::ScrollArea::vertical()
        .id_salt("settings_scroll")
        .show(ui, |ui| {
            render_agent_settings(app, ui, &theme);
            ui.add_space(12.0);
            render_appearance(app, ui, &theme);
            ui.add_space(12.0);
            render_connection(app, ui, &theme);
        });
}

fn render_agent_settings(app: &mut DropdeckApp, ui: &mut egui::Ui, theme: &Theme) {
    let loaded = app.state.settings().is_some();
    let unsaved = app.state.has_unsaved_settings();
    let connected = app.client.is_some();

    section_frame(theme, ui, "Agent", |ui| {
        if !loaded {
            ui.label(RichText::new("Waiting for the agent to report its settings...").color(theme.text_muted));
            return;
        }

        let ids = render_form(&mut app.state.form, ui, theme);
        app.ui.form_ids = ids;

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(connected, egui::Button::new("Save")).clicked() {
                app.save_settings();
            }
            if ui
                .add_enabled(unsaved, egui::Button::new("Revert"))
                .on_hover_text("Discard edits and show the agent's settings")
                .clicked()
            {
                if let Some(settings) = app.state.guard().last_known_good().cloned() {
                    app.state.form.fill(&settings);
                }
            }
            if unsaved {
                ui.label(RichText::new("Unsaved changes").color(theme.warning).size(11.0));
            }
            if let Some(status) = app.dispatcher.settings_status() {
                status_label(theme, ui, status);
            }
        });
    });
}

/// Render the form fields and return the ids of every input widget
fn render_form(form: &mut SettingsForm, ui: &mut egui::Ui, theme: &Theme) -> Vec<egui::Id> {
    let mut ids = Vec::new();

    egui::Grid::new("settings_form_grid")
        .num_columns(2)
        .spacing([16.0, 8.0])
        .show(ui, |ui| {
            let text_row = |ui: &mut egui::Ui, label: &str, value: &mut String, hint: &str| {
                ui.label(RichText::new(label).color(theme.text_muted));
                let response = ui.add(
                    egui::TextEdit::singleline(value)
                        .id_salt(("settings_form", label))
                        .hint_text(hint)
                        .desired_width(360.0),
                );
                ui.end_row();
                response.id
            };

            ids.push(text_row(ui, "Priority games:", &mut form.priority, "Game A, Game B"));
            ids.push(text_row(ui, "Excluded games:", &mut form.exclude, "comma separated"));
            ids.push(text_row(ui, "Language:", &mut form.language, "e.g. English"));
            ids.push(text_row(ui, "Proxy:", &mut form.proxy, "http://host:port"));

            ui.label(RichText::new("Priority mode:").color(theme.text_muted));
            let combo = egui::ComboBox::from_id_salt("settings_form_priority_mode")
                .selected_text(form.priority_mode.label())
                .show_ui(ui, |ui| {
                    for mode in PriorityMode::all() {
                        ui.selectable_value(&mut form.priority_mode, *mode, mode.label());
                    }
                });
            ids.push(combo.response.id);
            ui.end_row();

            ui.label(RichText::new("Connection quality:").color(theme.text_muted));
            let drag = ui.add(egui::DragValue::new(&mut form.connection_quality).range(1..=6));
            ids.push(drag.id);
            ui.end_row();

            let checkboxes: [(&str, &mut bool); 4] = [
                ("Check available drops", &mut form.available_drops_check),
                ("Enable badges and emotes", &mut form.enable_badges_emotes),
                ("Tray notifications", &mut form.tray_notifications),
                ("Autostart to tray", &mut form.autostart_tray),
            ];
            for (label, value) in checkboxes {
                ui.label("");
                ids.push(ui.checkbox(value, label).id);
                ui.end_row();
            }
        });

    ids
}

fn render_appearance(app: &mut DropdeckApp, ui: &mut egui::Ui, theme: &Theme) {
    section_frame(theme, ui, "Appearance", |ui| {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Theme:").color(theme.text_muted));

            egui::ComboBox::from_id_salt("theme_select")
                .selected_text(app.config.launcher.theme.name())
                .show_ui(ui, |ui| {
                    for preset in ThemePreset::all() {
                        if ui
                            .selectable_label(app.config.launcher.theme == *preset, preset.name())
                            .clicked()
                        {
                            app.config.launcher.theme = *preset;
                            app.ui.current_theme = preset.theme();
                            app.ui.theme_dirty = true;
                            app.save_preferences();
                        }
                    }
                });
        });
    });
}

fn render_connection(app: &mut DropdeckApp, ui: &mut egui::Ui, theme: &Theme) {
    section_frame(theme, ui, "Connection", |ui| {
        egui::Grid::new("connection_grid")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Agent URL:").color(theme.text_muted));
                ui.label(RichText::new(&app.config.server.base_url).color(theme.text_primary));
                ui.end_row();

                let auth = match app.config.server.credentials() {
                    Some(Credentials::Token(_)) => "API token",
                    Some(Credentials::Basic { .. }) => "Basic auth",
                    None => "None",
                };
                ui.label(RichText::new("Authentication:").color(theme.text_muted));
                ui.label(RichText::new(auth).color(theme.text_primary));
                ui.end_row();

                ui.label(RichText::new("Poll interval:").color(theme.text_muted));
                ui.label(
                    RichText::new(format!("{} ms", app.poller.schedule().interval().as_millis()))
                        .color(theme.text_primary),
                );
                ui.end_row();

                ui.label(RichText::new("Settings updates held:").color(theme.text_muted))
                    .on_hover_text("Polls whose settings were not applied because you were editing");
                ui.label(
                    RichText::new(app.state.guard().suppressed_count().to_string())
                        .color(theme.text_primary),
                );
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.label(
            RichText::new("Edit with `dropdeck config set server.base_url <url>`")
                .color(theme.text_muted)
                .size(11.0),
        );
    });
}
