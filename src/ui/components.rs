//! Shared UI components

use eframe::egui::{self, Color32, CornerRadius, RichText, Vec2};

use crate::app::DropdeckApp;
use crate::dispatcher::{StatusKind, StatusMessage};
use crate::ui::theme::Theme;
use crate::view_state::Tab;

/// Render the row of tab buttons
pub fn render_tab_bar(app: &mut DropdeckApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        for tab in Tab::all() {
            render_tab(app, ui, *tab);
        }
    });
    ui.separator();
}

/// Render a tab button
fn render_tab(app: &mut DropdeckApp, ui: &mut egui::Ui, tab: Tab) {
    let theme = &app.ui.current_theme;
    let is_active = app.state.view().tab == tab;

    let (bg, text_color) = if is_active {
        (theme.bg_medium, theme.accent)
    } else {
        (Color32::TRANSPARENT, theme.text_secondary)
    };

    let button = egui::Button::new(RichText::new(tab.label()).color(text_color))
        .fill(bg)
        .corner_radius(CornerRadius {
            nw: 6,
            ne: 6,
            sw: 0,
            se: 0,
        })
        .min_size(Vec2::new(90.0, 32.0));

    if ui.add(button).clicked() {
        app.state.update_view(|view| view.tab = tab);
    }
}

/// Render a titled section frame
pub fn section_frame<R>(
    theme: &Theme,
    ui: &mut egui::Ui,
    title: &str,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> R {
    egui::Frame::new()
        .fill(theme.bg_medium)
        .corner_radius(8.0)
        .inner_margin(16.0)
        .stroke(egui::Stroke::new(1.0, theme.border))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).color(theme.accent).size(13.0).strong());
            ui.add_space(10.0);
            add_contents(ui)
        })
        .inner
}

/// Small filled circle in front of a label
pub fn status_dot(ui: &mut egui::Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, color);
}

/// Render a status message in its severity color
pub fn status_label(theme: &Theme, ui: &mut egui::Ui, status: &StatusMessage) {
    let color = match status.kind {
        StatusKind::Success => theme.success,
        StatusKind::Error => theme.error,
    };
    ui.label(RichText::new(&status.text).color(color));
}

/// Muted placeholder shown instead of an empty list
pub fn placeholder(theme: &Theme, ui: &mut egui::Ui, text: &str) {
    ui.add_space(16.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(text).color(theme.text_muted).italics());
    });
    ui.add_space(16.0);
}
