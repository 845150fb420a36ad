// src/analysis/resources.rs
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use super::backend::{AnalysisBackend, Credential};
use super::run::{run_channel, AnalysisSession, RunReceiver, RunSender};
use crate::settings::AppSettings;

/// The API key for this process. Loaded once at startup, replaced from the
/// settings popup, and passed by value into every spawned request.
#[derive(Resource, Default, Debug, Clone)]
pub struct SessionCredential(pub Option<Credential>);

#[derive(Resource, Debug, Clone)]
pub struct ApiKeyDisplayStatus {
    pub status: String,
}

impl Default for ApiKeyDisplayStatus {
    fn default() -> Self {
        Self { status: "No Key Set".to_string() }
    }
}

#[derive(Resource, Default, Debug)]
pub struct ActiveAnalysis {
    pub session: AnalysisSession,
}

/// Sender side is cloned into background tasks; the receiver is drained once
/// per frame by `drain_run_messages`.
#[derive(Resource)]
pub struct RunChannel {
    pub tx: RunSender,
    rx: Mutex<RunReceiver>,
}

impl Default for RunChannel {
    fn default() -> Self {
        let (tx, rx) = run_channel();
        Self { tx, rx: Mutex::new(rx) }
    }
}

impl RunChannel {
    pub fn receiver(&mut self) -> &mut RunReceiver {
        match self.rx.get_mut() {
            Ok(rx) => rx,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[derive(Resource, Clone)]
pub struct SharedBackend(pub Arc<dyn AnalysisBackend>);

#[derive(Resource, Debug, Clone, Default)]
pub struct AdvisorSettings(pub AppSettings);
