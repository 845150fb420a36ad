// src/ui/elements/advisor.rs
use std::sync::Arc;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::analysis::client::GeminiClient;
use crate::analysis::events::{RequestAnalysis, RequestClearAnalysis, RequestCurveImage, RequestPickImages};
use crate::analysis::resources::{
    ActiveAnalysis, AdvisorSettings, ApiKeyDisplayStatus, SessionCredential, SharedBackend,
};
use crate::ui::curve_cache::CurveTextureCache;
use crate::ui::state::AdvisorWindowState;
use crate::ui::UiFeedbackState;

use super::input_panel::{show_input_panel, InputPanelWriters};
use super::popups::show_settings_popup;
use super::results_panel::show_results_panel;
use super::top_bar::show_top_bar;

#[allow(clippy::too_many_arguments)]
pub fn advisor_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<AdvisorWindowState>,
    active: Res<ActiveAnalysis>,
    ui_feedback: Res<UiFeedbackState>,
    mut api_key_status: ResMut<ApiKeyDisplayStatus>,
    mut session_credential: ResMut<SessionCredential>,
    mut settings: ResMut<AdvisorSettings>,
    mut backend: ResMut<SharedBackend>,
    mut curve_cache: ResMut<CurveTextureCache>,
    mut analysis_writer: EventWriter<RequestAnalysis>,
    mut clear_writer: EventWriter<RequestClearAnalysis>,
    mut curve_writer: EventWriter<RequestCurveImage>,
    mut pick_writer: EventWriter<RequestPickImages>,
) {
    let ctx = contexts.ctx_mut();

    if let Some(updated) = show_settings_popup(
        ctx,
        &mut state,
        &mut api_key_status,
        &mut session_credential,
        &settings.0,
    ) {
        info!("Settings updated; model '{}'.", updated.model_id);
        backend.0 = Arc::new(GeminiClient::new(updated.client_config()));
        settings.0 = updated;
    }

    egui::TopBottomPanel::top("advisor_top_bar").show(ctx, |ui| {
        show_top_bar(ui, &mut state, &api_key_status, &ui_feedback);
    });

    egui::SidePanel::left("advisor_input_panel")
        .resizable(true)
        .default_width(320.0)
        .show(ctx, |ui| {
            show_input_panel(
                ui,
                &mut state,
                active.session.is_loading(),
                session_credential.0.is_some(),
                InputPanelWriters {
                    analysis: &mut analysis_writer,
                    clear: &mut clear_writer,
                    pick_images: &mut pick_writer,
                },
            );
        });

    egui::CentralPanel::default().show(ctx, |ui| {
        show_results_panel(ui, &active.session, &mut curve_cache, &mut curve_writer);
    });
}
