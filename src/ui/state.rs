// src/ui/state.rs
use bevy::prelude::Resource;

use crate::analysis::input::EncodedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputTab {
    #[default]
    Smiles,
    Images,
}

#[derive(Resource, Debug, Default)]
pub struct AdvisorWindowState {
    pub input_tab: InputTab,
    pub smiles_input: String,
    pub images: Vec<EncodedImage>,
    /// Picked files are still being read and encoded.
    pub encoding_images: bool,

    pub show_settings_popup: bool,
    pub settings_new_api_key_input: String,
    pub settings_model_input: String,
    pub settings_grounding: bool,
    pub settings_form_loaded: bool,
}

impl AdvisorWindowState {
    pub fn has_input(&self) -> bool {
        !self.smiles_input.trim().is_empty() || !self.images.is_empty()
    }

    /// Picking images replaces any SMILES text.
    pub fn set_images(&mut self, images: Vec<EncodedImage>) {
        self.images = images;
        if !self.images.is_empty() {
            self.smiles_input.clear();
        }
    }

    /// Typing SMILES drops any picked images.
    pub fn on_smiles_edited(&mut self) {
        if !self.smiles_input.is_empty() {
            self.images.clear();
        }
    }

    pub fn clear_inputs(&mut self) {
        self.smiles_input.clear();
        self.images.clear();
    }
}
