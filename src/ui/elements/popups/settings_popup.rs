// src/ui/elements/popups/settings_popup.rs
use bevy::log::{error, info, warn};
use bevy_egui::egui;

use crate::analysis::backend::Credential;
use crate::analysis::resources::{ApiKeyDisplayStatus, SessionCredential};
use crate::settings::{credential, io, AppSettings};
use crate::ui::state::AdvisorWindowState;

/// Returns the new settings when the user saved a change.
pub fn show_settings_popup(
    ctx: &egui::Context,
    state: &mut AdvisorWindowState,
    api_key_status: &mut ApiKeyDisplayStatus,
    session_credential: &mut SessionCredential,
    settings: &AppSettings,
) -> Option<AppSettings> {
    if !state.show_settings_popup {
        state.settings_form_loaded = false;
        return None;
    }
    if !state.settings_form_loaded {
        state.settings_model_input = settings.model_id.clone();
        state.settings_grounding = settings.grounding_with_google_search;
        state.settings_form_loaded = true;
    }

    let mut is_window_open = state.show_settings_popup;
    let mut close_requested = false;
    let mut saved = None;

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut is_window_open)
        .show(ctx, |ui| {
            ui.heading("Gemini API Key");
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Current Status:");
                ui.label(api_key_status.status.as_str());
            });

            ui.label("Enter API Key:");
            ui.add(
                egui::TextEdit::singleline(&mut state.settings_new_api_key_input)
                    .password(true)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                if ui.button("Save Key").clicked() {
                    match credential::store_credential(&state.settings_new_api_key_input) {
                        Ok(key) => {
                            session_credential.0 = Some(key);
                            api_key_status.status = "Key Set (Keyring)".to_string();
                        }
                        Err(credential::CredentialError::Blank) => {
                            info!("API Key input was empty, not saving.");
                        }
                        Err(e) => {
                            // Keep the key usable for this session even if the keyring is unavailable.
                            error!("Could not save API Key: {}", e);
                            if let Some(key) = Credential::new(&state.settings_new_api_key_input) {
                                session_credential.0 = Some(key);
                                api_key_status.status = "Key Set (Session)".to_string();
                            }
                        }
                    }
                    state.settings_new_api_key_input.clear();
                }

                if ui.button("Clear Key").clicked() {
                    if let Err(e) = credential::clear_credential() {
                        warn!("Could not remove API Key from keyring: {}", e);
                    }
                    session_credential.0 = None;
                    api_key_status.status = "No Key Set".to_string();
                }
            });

            ui.separator();
            ui.heading("Model");
            ui.horizontal(|ui| {
                ui.label("Model ID:");
                ui.text_edit_singleline(&mut state.settings_model_input);
            });
            ui.checkbox(&mut state.settings_grounding, "Ground answers with Google Search");

            ui.horizontal(|ui| {
                if ui.button("Save Settings").clicked() {
                    let model_id = state.settings_model_input.trim();
                    let mut updated = settings.clone();
                    if !model_id.is_empty() {
                        updated.model_id = model_id.to_string();
                        updated.curve_model_id = model_id.to_string();
                    }
                    updated.grounding_with_google_search = state.settings_grounding;
                    if let Err(e) = io::save_settings_to_file(&updated) {
                        error!("Failed to save settings: {}", e);
                    }
                    saved = Some(updated);
                }
                if ui.button("Close").clicked() {
                    close_requested = true;
                }
            });
        });

    if !is_window_open || close_requested {
        state.show_settings_popup = false;
    }
    saved
}
