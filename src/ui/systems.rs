// src/ui/systems.rs
use crate::{
    analysis::{
        events::{AnalysisFeedback, ImagesEncoded, RequestPickImages},
        input::load_images,
    },
    ui::{state::AdvisorWindowState, UiFeedbackState},
};
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;
use std::any;
use std::path::PathBuf;

pub fn handle_ui_feedback(
    mut feedback_events: EventReader<AnalysisFeedback>,
    mut ui_feedback_state: ResMut<UiFeedbackState>,
) {
    // An error in this frame outranks any progress message sent with it.
    let mut shown: Option<&AnalysisFeedback> = None;
    for event in feedback_events.read() {
        if event.is_error || !shown.is_some_and(|s| s.is_error) {
            shown = Some(event);
        }
    }
    if let Some(event) = shown {
        ui_feedback_state.last_message = event.message.clone();
        ui_feedback_state.is_error = event.is_error;
        if event.is_error {
            warn!("UI Feedback (Error): {}", ui_feedback_state.last_message);
        } else {
            info!("UI Feedback: {}", ui_feedback_state.last_message);
        }
    }
}

/// Carries an event out of a background task; `forward_events` turns it back
/// into a regular event on the main thread.
#[derive(Component)]
pub struct SendEvent<E: Event> {
    pub event: E,
}

pub fn forward_events<E: Event + Clone + std::fmt::Debug>(
    mut commands: Commands,
    mut writer: EventWriter<E>,
    query: Query<(Entity, &SendEvent<E>)>,
    mut event_type_name: Local<String>,
) {
    if event_type_name.is_empty() {
        *event_type_name = any::type_name::<E>().split("::").last().unwrap_or("UnknownEvent").to_string();
    }

    let mut count = 0;
    for (entity, send_event_component) in query.iter() {
        count += 1;
        debug!("Forwarding event type '{}' #{}", *event_type_name, count);
        writer.write(send_event_component.event.clone());
        commands.entity(entity).despawn();
    }

    if count > 0 {
        trace!("Forwarded {} instance(s) of event type '{}'.", count, *event_type_name);
    }
}

/// Opens the file dialog, then reads and encodes the picked files off the
/// main thread.
pub fn handle_pick_images(
    mut events: EventReader<RequestPickImages>,
    mut state: ResMut<AdvisorWindowState>,
    mut feedback_writer: EventWriter<AnalysisFeedback>,
    runtime: Res<TokioTasksRuntime>,
    mut commands: Commands,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    // Use blocking file dialog (appropriate for typical Bevy system)
    let picked: Option<Vec<PathBuf>> = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
        .pick_files();

    let Some(paths) = picked.filter(|p| !p.is_empty()) else {
        feedback_writer.write(AnalysisFeedback {
            message: "Image selection cancelled.".to_string(),
            is_error: false,
        });
        return;
    };

    info!("{} image(s) picked. Encoding in background.", paths.len());
    state.encoding_images = true;
    let entity = commands.spawn_empty().id();
    runtime.spawn_background_task(move |mut ctx| async move {
        let result = load_images(paths).await.map_err(|e| e.to_string());
        ctx.run_on_main_thread(move |world_ctx| {
            world_ctx
                .world
                .commands()
                .entity(entity)
                .insert(SendEvent::<ImagesEncoded> { event: ImagesEncoded { result } });
        })
        .await;
    });
}

pub fn handle_images_encoded(
    mut events: EventReader<ImagesEncoded>,
    mut state: ResMut<AdvisorWindowState>,
    mut feedback_writer: EventWriter<AnalysisFeedback>,
) {
    for event in events.read() {
        state.encoding_images = false;
        match &event.result {
            Ok(images) => {
                info!("{} image(s) ready.", images.len());
                state.set_images(images.clone());
            }
            Err(message) => {
                feedback_writer.write(AnalysisFeedback { message: message.clone(), is_error: true });
            }
        }
    }
}
