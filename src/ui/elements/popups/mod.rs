// src/ui/elements/popups/mod.rs
pub mod settings_popup;

pub use settings_popup::show_settings_popup;
