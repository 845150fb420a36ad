// src/analysis/systems.rs
use std::sync::Arc;

use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;

use super::error::AnalysisError;
use super::events::{AnalysisFeedback, RequestAnalysis, RequestClearAnalysis, RequestCurveImage};
use super::backend::Credential;
use super::input::{normalize_inputs, ComponentInput};
use super::resources::{ActiveAnalysis, RunChannel, SessionCredential, SharedBackend};
use super::run::{dispatch_curve, dispatch_run};

/// Checks a run request before anything is dispatched. A missing credential
/// is reported first, then missing input.
fn prepare_run(
    credential: Option<&Credential>,
    request: &RequestAnalysis,
) -> Result<Vec<ComponentInput>, AnalysisError> {
    if credential.is_none() {
        return Err(AnalysisError::missing_credential());
    }
    normalize_inputs(&request.smiles_block, &request.images)
}

pub fn handle_analysis_request(
    mut events: EventReader<RequestAnalysis>,
    mut active: ResMut<ActiveAnalysis>,
    credential: Res<SessionCredential>,
    backend: Res<SharedBackend>,
    channel: Res<RunChannel>,
    runtime: Res<TokioTasksRuntime>,
    mut feedback_writer: EventWriter<AnalysisFeedback>,
) {
    // Only the latest click in a frame matters; earlier ones would be superseded anyway.
    let Some(request) = events.read().last() else {
        return;
    };

    let inputs = match prepare_run(credential.0.as_ref(), request) {
        Ok(inputs) => inputs,
        Err(e) => {
            feedback_writer.write(AnalysisFeedback { message: e.to_string(), is_error: true });
            return;
        }
    };

    let (run_id, inputs) = active.session.begin_run(inputs);
    info!("Started run {} for {} component(s).", run_id, inputs.len());
    feedback_writer.write(AnalysisFeedback {
        message: format!("Analyzing {} component(s)…", inputs.len()),
        is_error: false,
    });

    let backend = Arc::clone(&backend.0);
    let credential = credential.0.clone();
    let tx = channel.tx.clone();
    runtime.spawn_background_task(move |_ctx| async move {
        dispatch_run(backend, credential, inputs, run_id, tx).await;
    });
}

pub fn handle_clear_request(
    mut events: EventReader<RequestClearAnalysis>,
    mut active: ResMut<ActiveAnalysis>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();
    active.session.clear();
    info!("Analysis cleared.");
}

pub fn handle_curve_request(
    mut events: EventReader<RequestCurveImage>,
    mut active: ResMut<ActiveAnalysis>,
    credential: Res<SessionCredential>,
    backend: Res<SharedBackend>,
    channel: Res<RunChannel>,
    runtime: Res<TokioTasksRuntime>,
) {
    for event in events.read() {
        let Some(job) = active.session.request_curve(event.index) else {
            debug!("Curve request for component {} ignored.", event.index + 1);
            continue;
        };
        info!("Requesting pH-logD curve for {}.", job.input.display_id);
        let backend = Arc::clone(&backend.0);
        let credential = credential.0.clone();
        let tx = channel.tx.clone();
        runtime.spawn_background_task(move |_ctx| async move {
            dispatch_curve(backend, credential, job, tx).await;
        });
    }
}

/// The single consumer of the run channel.
pub fn drain_run_messages(
    mut active: ResMut<ActiveAnalysis>,
    mut channel: ResMut<RunChannel>,
    mut feedback_writer: EventWriter<AnalysisFeedback>,
) {
    let applied = active.session.apply_pending(channel.receiver());
    if applied > 0 {
        trace!("Applied {} run message(s).", applied);
    }
    if let Some(notice) = active.session.notice().map(str::to_string) {
        feedback_writer.write(AnalysisFeedback { message: notice, is_error: true });
        active.session.dismiss_notice();
    }
}
