// src/analysis/events.rs
use bevy::prelude::Event;

use super::input::EncodedImage;

/// Sent by the Analyze button. Handled by `analysis::systems::handle_analysis_request`.
#[derive(Event, Debug, Clone)]
pub struct RequestAnalysis {
    pub smiles_block: String,
    pub images: Vec<EncodedImage>,
}

/// Drops the current run and empties both input fields.
#[derive(Event, Debug, Clone)]
pub struct RequestClearAnalysis;

#[derive(Event, Debug, Clone)]
pub struct RequestCurveImage {
    pub index: usize,
}

/// Opens the image file dialog.
#[derive(Event, Debug, Clone)]
pub struct RequestPickImages;

/// Result of reading and encoding picked files in the background.
#[derive(Event, Debug, Clone)]
pub struct ImagesEncoded {
    pub result: Result<Vec<EncodedImage>, String>,
}

/// Transient user-facing message for the status bar.
#[derive(Event, Debug, Clone)]
pub struct AnalysisFeedback {
    pub message: String,
    pub is_error: bool,
}
