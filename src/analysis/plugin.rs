// src/analysis/plugin.rs
use std::sync::Arc;

use bevy::prelude::*;

use super::client::GeminiClient;
use super::events::{
    AnalysisFeedback, ImagesEncoded, RequestAnalysis, RequestClearAnalysis, RequestCurveImage,
    RequestPickImages,
};
use super::resources::{
    ActiveAnalysis, AdvisorSettings, ApiKeyDisplayStatus, RunChannel, SessionCredential,
    SharedBackend,
};
use super::systems;
use crate::settings::{credential, io};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
enum AnalysisSystemSet {
    UserInput,    // Requests coming from the UI
    ApplyResults, // Draining the run channel
}

/// Owns the analysis session, the service client and the run channel.
pub struct AnalysisPlugin;

impl Plugin for AnalysisPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            AnalysisSystemSet::ApplyResults.after(AnalysisSystemSet::UserInput),
        );

        let settings = io::load_or_default();
        let backend = GeminiClient::new(settings.client_config());
        info!(
            "Using model '{}' (grounding: {}).",
            settings.model_id, settings.grounding_with_google_search
        );

        app.insert_resource(AdvisorSettings(settings))
            .insert_resource(SharedBackend(Arc::new(backend)))
            .init_resource::<SessionCredential>()
            .init_resource::<ApiKeyDisplayStatus>()
            .init_resource::<ActiveAnalysis>()
            .init_resource::<RunChannel>();

        app.add_event::<RequestAnalysis>()
            .add_event::<RequestClearAnalysis>()
            .add_event::<RequestCurveImage>()
            .add_event::<RequestPickImages>()
            .add_event::<ImagesEncoded>()
            .add_event::<AnalysisFeedback>();

        app.add_systems(Startup, load_session_credential);
        app.add_systems(
            Update,
            (
                systems::handle_clear_request,
                systems::handle_analysis_request,
                systems::handle_curve_request,
            )
                .chain()
                .in_set(AnalysisSystemSet::UserInput),
        );
        app.add_systems(
            Update,
            systems::drain_run_messages.in_set(AnalysisSystemSet::ApplyResults),
        );

        info!("AnalysisPlugin initialized.");
    }
}

fn load_session_credential(
    mut session_credential: ResMut<SessionCredential>,
    mut status: ResMut<ApiKeyDisplayStatus>,
) {
    match credential::load_credential() {
        Some((key, source)) => {
            session_credential.0 = Some(key);
            status.status = source.label().to_string();
        }
        None => {
            session_credential.0 = None;
            status.status = "No Key Set".to_string();
        }
    }
}
