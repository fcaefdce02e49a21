//! Header and status bar

use eframe::egui::{self, RichText};

use crate::app::DropdeckApp;
use crate::dispatcher::Action;
use crate::ui::components::{status_dot, status_label};

/// Render the runtime header: agent state, watched channel, uptime,
/// control buttons and the shareable view link.
pub fn render_header(app: &mut DropdeckApp, ui: &mut egui::Ui) {
    let theme = app.ui.current_theme.clone();
    let header = app.state.header().clone();

    ui.horizontal(|ui| {
        let dot = if header.active { theme.online } else { theme.offline };
        status_dot(ui, dot);
        ui.label(
            RichText::new(&header.state_label)
                .color(theme.text_primary)
                .size(16.0)
                .strong(),
        );

        ui.add_space(16.0);
        ui.label(RichText::new("Watching:").color(theme.text_muted));
        match &header.watching {
            Some(watching) => ui.label(RichText::new(watching).color(theme.text_primary)),
            None => ui.label(RichText::new("Idle").color(theme.text_muted)),
        };

        if let Some(pending) = &header.pending_switch {
            ui.add_space(8.0);
            ui.label(RichText::new(format!("→ {}", pending)).color(theme.warning));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let uptime = app.state.clock.display().unwrap_or("--:--:--");
            let label = ui.label(RichText::new(uptime).color(theme.text_primary).monospace());
            if let Some(started_at) = app.state.clock.started_at() {
                label.on_hover_text(format!(
                    "Running since {}",
                    started_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
                ));
            }
            ui.label(RichText::new("Uptime").color(theme.text_muted).size(11.0));
        });
    });

    ui.add_space(6.0);

    ui.horizontal(|ui| {
        let connected = app.client.is_some();
        if ui.add_enabled(connected, egui::Button::new("▶ Start")).clicked() {
            app.dispatch(Action::Start);
        }
        if ui.add_enabled(connected, egui::Button::new("■ Stop")).clicked() {
            app.dispatch(Action::Stop);
        }
        if ui.add_enabled(connected, egui::Button::new("↻ Reload")).clicked() {
            app.dispatch(Action::Reload);
        }

        if app.dispatcher.pending() > 0 {
            ui.spinner();
        }
        if let Some(status) = app.dispatcher.action_status() {
            status_label(&theme, ui, status);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Open web UI").clicked() {
                if let Some(client) = &app.client {
                    if let Err(e) = open::that(client.base_url().as_str()) {
                        tracing::error!("Failed to open browser: {}", e);
                    }
                }
            }

            let mut link = app.state.view_link().to_string();
            if ui.button("Copy").on_hover_text("Copy view link").clicked() {
                ui.ctx().copy_text(link.clone());
            }
            ui.add(
                egui::TextEdit::singleline(&mut link)
                    .interactive(false)
                    .desired_width(220.0)
                    .hint_text("default view"),
            );
            ui.label(RichText::new("View:").color(theme.text_muted));
        });
    });
}

/// Render the bottom status bar
pub fn render_status_bar(app: &mut DropdeckApp, ui: &mut egui::Ui) {
    let theme = &app.ui.current_theme;

    ui.horizontal(|ui| {
        if let Some(err) = &app.client_error {
            ui.label(RichText::new(format!("Invalid agent URL: {}", err)).color(theme.error));
            return;
        }

        match app.state.last_error() {
            Some(err) => {
                ui.label(RichText::new(format!("Poll failed: {}", err)).color(theme.error));
            }
            None => match app.state.last_update() {
                Some(at) => {
                    let local = at.with_timezone(&chrono::Local);
                    ui.label(
                        RichText::new(format!("Updated {}", local.format("%H:%M:%S")))
                            .color(theme.text_muted),
                    );
                }
                None => {
                    ui.label(RichText::new("Connecting...").color(theme.text_muted));
                }
            },
        }

        if app.poller.schedule().is_suspended() {
            ui.label(RichText::new("(paused)").color(theme.text_muted));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(client) = &app.client {
                ui.label(RichText::new(client.base_url().as_str()).color(theme.text_muted).size(11.0));
            }
            if let Some(load) = &app.state.header().sys_load {
                ui.label(RichText::new(load).color(theme.text_muted).size(11.0));
            }
        });
    });
}
