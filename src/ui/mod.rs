// src/ui/mod.rs
use bevy::prelude::*;
use bevy_egui::EguiContextPass;

pub mod curve_cache;
pub mod elements;
pub mod state;
pub mod systems;
pub mod view;

use crate::analysis::events::ImagesEncoded;
use curve_cache::CurveTextureCache;
use elements::advisor::advisor_ui;
use state::AdvisorWindowState;
use systems::{forward_events, handle_images_encoded, handle_pick_images, handle_ui_feedback};

#[derive(Resource, Default, Debug, Clone)]
pub struct UiFeedbackState {
    pub last_message: String,
    pub is_error: bool,
}

/// Plugin for the advisor window.
pub struct AdvisorUiPlugin;

impl Plugin for AdvisorUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiFeedbackState>()
            .init_resource::<AdvisorWindowState>()
            .init_resource::<CurveTextureCache>()
            .add_systems(
                Update,
                (
                    handle_pick_images,
                    forward_events::<ImagesEncoded>,
                    handle_images_encoded,
                    handle_ui_feedback,
                )
                    .chain(),
            )
            .add_systems(EguiContextPass, advisor_ui);

        info!("AdvisorUiPlugin initialized.");
    }
}
