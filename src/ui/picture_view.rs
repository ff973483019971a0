//! Picture view rendering

use eframe::egui::{self, RichText, Vec2};
use egui_commonmark::CommonMarkViewer;

use crate::app::PotdApp;
use crate::fetch::View;

enum Action {
    Show,
    Reload,
    OpenImage(String),
}

/// Render the picture area for the current fetch state
pub fn render_picture_view(app: &mut PotdApp, ui: &mut egui::Ui) {
    let theme = app.theme.clone();
    let mut action = None;

    match app.retry_policy.view_of(&app.picture) {
        View::Loading => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.spinner();
                ui.label(RichText::new("Loading...").color(theme.text_secondary).size(18.0));
            });
        }
        View::Ready(picture) => {
            egui::ScrollArea::vertical()
                .id_salt("picture_scroll")
                .show(ui, |ui| {
                    ui.label(RichText::new(&picture.title).color(theme.text_primary).size(22.0).strong());
                    ui.label(RichText::new(picture.date_display()).color(theme.text_muted));
                    if let Some(credit) = picture.credit() {
                        ui.label(RichText::new(format!("Credit: {}", credit)).color(theme.text_muted).size(11.0));
                    }
                    ui.add_space(12.0);

                    egui::Frame::new()
                        .fill(theme.bg_medium)
                        .corner_radius(8.0)
                        .inner_margin(16.0)
                        .stroke(egui::Stroke::new(1.0, theme.border))
                        .show(ui, |ui| {
                            CommonMarkViewer::new().show(ui, &mut app.markdown_cache, &picture.explanation);
                        });

                    ui.add_space(12.0);
                    ui.horizontal(|ui| {
                        let open_label = if picture.is_video() { "Open video" } else { "Open image" };
                        if ui.button(open_label).clicked() {
                            action = Some(Action::OpenImage(picture.full_url().to_string()));
                        }
                        if ui.button("Reload").clicked() {
                            action = Some(Action::Reload);
                        }
                    });
                });
        }
        View::Unavailable => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(
                    RichText::new("Sorry it seems this functionality is not available at the moment")
                        .color(theme.warning)
                        .size(16.0),
                );
                ui.label(RichText::new("Please get in touch with our customer support.").color(theme.text_secondary));
            });
        }
        View::Retry { error_count } => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(RichText::new("Oops something went wrong!").color(theme.error).size(20.0).strong());
                ui.label(RichText::new(format!("Failed attempts: {}", error_count)).color(theme.text_muted));
                ui.add_space(8.0);
                if ui.button("Retry").clicked() {
                    action = Some(Action::Reload);
                }
            });
        }
        View::Prompt => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                let button = egui::Button::new(RichText::new("Show Picture").size(16.0)).min_size(Vec2::new(160.0, 40.0));
                if ui.add(button).clicked() {
                    action = Some(Action::Show);
                }
            });
        }
    }

    match action {
        Some(Action::Show) => app.show_picture(),
        Some(Action::Reload) => app.reload(),
        Some(Action::OpenImage(url)) => {
            if let Err(e) = open::that(&url) {
                tracing::error!("Failed to open {}: {}", url, e);
                app.status_message = format!("Could not open browser: {}", e);
            }
        }
        None => {}
    }
}
