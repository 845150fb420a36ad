// src/ui/elements/top_bar.rs
use bevy_egui::egui;

use crate::analysis::resources::ApiKeyDisplayStatus;
use crate::ui::state::AdvisorWindowState;
use crate::ui::UiFeedbackState;

pub fn show_top_bar(
    ui: &mut egui::Ui,
    state: &mut AdvisorWindowState,
    api_key_status: &ApiKeyDisplayStatus,
    ui_feedback: &UiFeedbackState,
) {
    ui.horizontal(|ui| {
        ui.heading("ChromaDev");
        ui.label("Multi-component chromatographic method advisor");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⚙ Settings").clicked() {
                state.show_settings_popup = true;
            }
            ui.label(api_key_status.status.as_str());
        });
    });

    if !ui_feedback.last_message.is_empty() {
        let text_color = if ui_feedback.is_error {
            egui::Color32::RED
        } else {
            ui.style().visuals.text_color()
        };
        ui.colored_label(text_color, &ui_feedback.last_message);
    }
}
