// src/analysis/mod.rs
pub mod aggregate;
pub mod backend;
pub mod client;
pub mod error;
pub mod events;
pub mod input;
pub mod plugin;
pub mod prompt;
pub mod resources;
pub mod run;
pub mod schema;
pub mod systems;

pub use plugin::AnalysisPlugin;
