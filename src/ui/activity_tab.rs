//! Activity tab UI rendering

use eframe::egui::{self, RichText};

use crate::app::DropdeckApp;
use crate::ui::components::{placeholder, section_frame};

/// Render the activity tab: recent errors and the journal feed
pub fn render_activity_tab(app: &mut DropdeckApp, ui: &mut egui::Ui) {
    let theme = app.ui.current_theme.clone();
    let header = app.state.header().clone();

    egui::ScrollArea::vertical()
        .id_salt("activity_scroll")
        .show(ui, |ui| {
            section_frame(&theme, ui, "Errors", |ui| {
                if header.errors.is_empty() {
                    ui.label(RichText::new("No errors").color(theme.text_muted));
                }
                for error in &header.errors {
                    ui.label(RichText::new(error).color(theme.error));
                }
            });

            ui.add_space(12.0);

            section_frame(&theme, ui, "Journal", |ui| {
                if let Some(reload) = header.last_reload {
                    let local = reload.with_timezone(&chrono::Local);
                    ui.label(
                        RichText::new(format!("Last reload {}", local.format("%Y-%m-%d %H:%M:%S")))
                            .color(theme.text_muted)
                            .size(11.0),
                    );
                    ui.add_space(6.0);
                }

                if header.journal.is_empty() {
                    placeholder(&theme, ui, "Nothing logged yet");
                    return;
                }

                egui::Grid::new("journal_grid")
                    .num_columns(3)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for entry in &header.journal {
                            let time = entry
                                .time
                                .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
                                .unwrap_or_default();
                            ui.label(RichText::new(time).color(theme.text_muted).monospace());
                            ui.label(
                                RichText::new(entry.category.as_deref().unwrap_or(""))
                                    .color(theme.accent)
                                    .size(11.0),
                            );
                            ui.label(RichText::new(&entry.message).color(theme.text_secondary));
                            ui.end_row();
                        }
                    });
            });
        });
}
