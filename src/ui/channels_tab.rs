//! Channels tab UI rendering

use eframe::egui::{self, RichText};

use crate::app::DropdeckApp;
use crate::dispatcher::Action;
use crate::model::{Channel, ChannelRef, ChannelStatus};
use crate::ui::components::{placeholder, section_frame, status_dot};
use crate::ui::theme::Theme;

/// Render the channels tab
pub fn render_channels_tab(app: &mut DropdeckApp, ui: &mut egui::Ui) {
    let theme = app.ui.current_theme.clone();
    let channels = app.state.projection().channels.clone();
    let connected = app.client.is_some();

    section_frame(&theme, ui, "Switch channel", |ui| {
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut app.ui.switch_input)
                    .id_salt("switch_channel_input")
                    .hint_text("login or channel id")
                    .desired_width(200.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.add_enabled(connected, egui::Button::new("Switch")).clicked() || submitted {
                let target = ChannelRef::classify(&app.ui.switch_input);
                app.dispatch(Action::SwitchChannel(target));
                app.ui.switch_input.clear();
            }
            if ui
                .add_enabled(connected, egui::Button::new("Auto"))
                .on_hover_text("Let the agent pick the best channel")
                .clicked()
            {
                app.dispatch(Action::SwitchChannel(None));
            }
        });
    });

    ui.add_space(12.0);

    if channels.is_empty() {
        placeholder(&theme, ui, "No channels tracked");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("channels_scroll")
        .show(ui, |ui| {
            egui::Grid::new("channels_grid")
                .num_columns(5)
                .striped(true)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    for heading in ["Channel", "Status", "Game", "Viewers", ""] {
                        ui.label(RichText::new(heading).color(theme.text_muted).size(11.0));
                    }
                    ui.end_row();

                    for channel in &channels {
                        if render_channel_row(&theme, ui, channel, connected) {
                            let target = channel_target(channel);
                            app.dispatch(Action::SwitchChannel(Some(target)));
                        }
                        ui.end_row();
                    }
                });
        });
}

/// Render one row. Returns true when its switch button was clicked.
fn render_channel_row(theme: &Theme, ui: &mut egui::Ui, channel: &Channel, enabled: bool) -> bool {
    ui.horizontal(|ui| {
        ui.label(RichText::new(channel.name()).color(theme.text_primary));
        if channel.acl_based {
            ui.label(RichText::new("ACL").color(theme.text_muted).size(10.0))
                .on_hover_text("Channel comes from a campaign allow list");
        }
    });

    ui.horizontal(|ui| {
        let color = match channel.status {
            ChannelStatus::Online => theme.online,
            ChannelStatus::PendingOnline => theme.warning,
            ChannelStatus::Offline | ChannelStatus::Unknown => theme.offline,
        };
        status_dot(ui, color);
        ui.label(RichText::new(channel.status.label()).color(theme.text_secondary));
    });

    ui.label(RichText::new(channel.game.as_deref().unwrap_or("-")).color(theme.text_secondary));

    let viewers = channel
        .viewers
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    ui.label(RichText::new(viewers).color(theme.text_secondary));

    ui.add_enabled(enabled, egui::Button::new("Switch")).clicked()
}

/// Prefer the numeric id when the agent reported one
fn channel_target(channel: &Channel) -> ChannelRef {
    match channel.id {
        Some(id) => ChannelRef::Id(id),
        None => ChannelRef::Login(channel.login.clone()),
    }
}
