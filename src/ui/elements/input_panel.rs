// src/ui/elements/input_panel.rs
use bevy::prelude::*;
use bevy_egui::egui;

use crate::analysis::events::{RequestAnalysis, RequestClearAnalysis, RequestPickImages};
use crate::analysis::input::plan_components;
use crate::ui::state::{AdvisorWindowState, InputTab};

pub struct InputPanelWriters<'a, 'w> {
    pub analysis: &'a mut EventWriter<'w, RequestAnalysis>,
    pub clear: &'a mut EventWriter<'w, RequestClearAnalysis>,
    pub pick_images: &'a mut EventWriter<'w, RequestPickImages>,
}

pub fn show_input_panel(
    ui: &mut egui::Ui,
    state: &mut AdvisorWindowState,
    run_loading: bool,
    has_credential: bool,
    writers: InputPanelWriters,
) {
    ui.heading("Input");
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.input_tab, InputTab::Smiles, "SMILES");
        ui.selectable_value(&mut state.input_tab, InputTab::Images, "Images");
    });
    ui.separator();

    match state.input_tab {
        InputTab::Smiles => {
            ui.label("One SMILES string per line:");
            let response = ui.add(
                egui::TextEdit::multiline(&mut state.smiles_input)
                    .hint_text("CCO\nCC(=O)O")
                    .code_editor()
                    .desired_rows(10)
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                state.on_smiles_edited();
            }
        }
        InputTab::Images => {
            ui.add_enabled_ui(!state.encoding_images, |ui| {
                if ui.button("Choose structure images…").clicked() {
                    writers.pick_images.write(RequestPickImages);
                }
            });
            if state.encoding_images {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Encoding images…");
                });
            }
            for (i, image) in state.images.iter().enumerate() {
                ui.label(format!("{}. {} ({})", i + 1, image.name, image.mime_type));
            }
        }
    }

    if let Ok(planned) = plan_components(&state.smiles_input, state.images.len()) {
        ui.separator();
        ui.label(format!("{} component(s):", planned.len()));
        for label in planned {
            ui.small(label);
        }
    }

    ui.separator();
    ui.horizontal(|ui| {
        let can_analyze = state.has_input() && !state.encoding_images && !run_loading;
        let analyze = ui.add_enabled(can_analyze, egui::Button::new("Analyze"));
        if analyze.clicked() {
            if has_credential {
                writers.analysis.write(RequestAnalysis {
                    smiles_block: state.smiles_input.clone(),
                    images: state.images.clone(),
                });
            } else {
                state.show_settings_popup = true;
            }
        }
        if run_loading {
            ui.spinner();
        }
        if ui.button("Clear").clicked() {
            state.clear_inputs();
            writers.clear.write(RequestClearAnalysis);
        }
    });
}
