//! Campaigns tab UI rendering

use eframe::egui::{self, RichText};

use crate::app::DropdeckApp;
use crate::projection::{CampaignView, EmptyState};
use crate::ui::components::placeholder;
use crate::ui::theme::Theme;
use crate::view_state::{FilterMode, SortMode};

/// Render the campaigns tab
pub fn render_campaigns_tab(app: &mut DropdeckApp, ui: &mut egui::Ui) {
    let theme = app.ui.current_theme.clone();

    render_controls(app, ui, &theme);
    ui.add_space(8.0);

    let projection = app.state.projection().clone();

    ui.label(
        RichText::new(format!(
            "Showing {} of {} campaigns",
            projection.visible_count, projection.total_count
        ))
        .color(theme.text_muted)
        .size(11.0),
    );
    ui.add_space(4.0);

    match projection.empty {
        Some(EmptyState::NoCampaigns) => {
            placeholder(&theme, ui, "No campaigns reported by the agent");
            return;
        }
        Some(EmptyState::NoMatches) => {
            placeholder(&theme, ui, "No campaigns match the current filters");
            return;
        }
        None => {}
    }

    egui::ScrollArea::vertical()
        .id_salt("campaigns_scroll")
        .show(ui, |ui| {
            for campaign in &projection.campaigns {
                render_campaign(&theme, ui, campaign);
                ui.add_space(8.0);
            }
        });
}

fn render_controls(app: &mut DropdeckApp, ui: &mut egui::Ui, theme: &Theme) {
    let view = app.state.view().clone();

    ui.horizontal(|ui| {
        ui.label(RichText::new("Search:").color(theme.text_muted));
        let mut search = view.search.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut search)
                .id_salt("campaign_search")
                .hint_text("campaign or game")
                .desired_width(180.0),
        );
        if response.changed() {
            app.state.update_view(|v| v.search = search);
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Show:").color(theme.text_muted));
        egui::ComboBox::from_id_salt("campaign_filter")
            .selected_text(view.filter.label())
            .show_ui(ui, |ui| {
                for filter in FilterMode::all() {
                    if ui.selectable_label(view.filter == *filter, filter.label()).clicked() {
                        app.state.update_view(|v| v.filter = *filter);
                    }
                }
            });

        ui.add_space(12.0);
        ui.label(RichText::new("Sort:").color(theme.text_muted));
        egui::ComboBox::from_id_salt("campaign_sort")
            .selected_text(view.sort.label())
            .show_ui(ui, |ui| {
                for sort in SortMode::all() {
                    if ui.selectable_label(view.sort == *sort, sort.label()).clicked() {
                        app.state.update_view(|v| v.sort = *sort);
                    }
                }
            });

        ui.add_space(12.0);
        let mut priority_only = view.priority_only;
        if ui.checkbox(&mut priority_only, "Priority games only").changed() {
            app.state.update_view(|v| v.priority_only = priority_only);
        }
    });
}

fn render_campaign(theme: &Theme, ui: &mut egui::Ui, campaign: &CampaignView) {
    egui::Frame::new()
        .fill(theme.bg_medium)
        .corner_radius(8.0)
        .inner_margin(12.0)
        .stroke(egui::Stroke::new(1.0, theme.border))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());

            ui.horizontal(|ui| {
                if campaign.is_priority {
                    ui.label(RichText::new("★").color(theme.priority));
                }
                ui.label(RichText::new(&campaign.game).color(theme.accent).strong());
                ui.label(RichText::new(&campaign.name).color(theme.text_primary));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (text, color) = if campaign.active {
                        ("Active", theme.online)
                    } else {
                        ("Inactive", theme.offline)
                    };
                    ui.label(RichText::new(text).color(color).size(11.0));
                    ui.label(
                        RichText::new(format!(
                            "{}/{} claimed",
                            campaign.claimed_drops, campaign.total_drops
                        ))
                        .color(theme.text_secondary)
                        .size(11.0),
                    );
                    if let Some(ends_at) = campaign.ends_at {
                        let local = ends_at.with_timezone(&chrono::Local);
                        ui.label(
                            RichText::new(format!("ends {}", local.format("%Y-%m-%d %H:%M")))
                                .color(theme.text_muted)
                                .size(11.0),
                        );
                    }
                });
            });

            ui.add(
                egui::ProgressBar::new(campaign.aggregate_progress.clamp(0.0, 1.0) as f32)
                    .text(format!("{:.0}%", campaign.aggregate_progress * 100.0))
                    .desired_height(14.0),
            );

            if campaign.drops.is_empty() {
                return;
            }

            ui.add_space(6.0);
            egui::Grid::new(("drops", &campaign.game, &campaign.name))
                .num_columns(3)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for drop in &campaign.drops {
                        let name_color = if drop.claimed {
                            theme.success
                        } else {
                            theme.text_secondary
                        };
                        ui.label(RichText::new(&drop.name).color(name_color));
                        ui.add(
                            egui::ProgressBar::new(drop.fraction as f32)
                                .desired_width(200.0)
                                .desired_height(10.0),
                        );
                        let minutes = if drop.claimed {
                            "claimed".to_string()
                        } else {
                            format!("{}/{} min", drop.current_minutes, drop.required_minutes)
                        };
                        ui.label(RichText::new(minutes).color(theme.text_muted).size(11.0));
                        ui.end_row();
                    }
                });
        });
}
