// src/ui/elements/mod.rs

// Main window layout
pub mod advisor;
pub mod input_panel;
pub mod popups;
pub mod results_panel;
pub mod top_bar;
