// src/cli/analyze.rs
use std::path::PathBuf;
use std::sync::Arc;

use bevy::log::{info, warn};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use super::report::render_report;
use super::CliError;
use crate::analysis::aggregate::{AnalysisAggregate, ComponentResult};
use crate::analysis::backend::{AnalysisBackend, Credential};
use crate::analysis::client::GeminiClient;
use crate::analysis::error::AnalysisError;
use crate::analysis::input::{load_images, normalize_inputs, ComponentInput};
use crate::analysis::run::{
    dispatch_curve, dispatch_run, run_channel, AnalysisSession, RunEvent, RunMessage, RunPhase,
    RunReceiver,
};
use crate::settings::{credential, io, AppSettings};
use crate::ui::view::results_view;

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// SMILES strings, one per line
    #[arg(long)]
    pub smiles: Option<String>,

    /// File with one SMILES string per line
    #[arg(long)]
    pub smiles_file: Option<PathBuf>,

    /// Structure image (repeatable, kept in the given order)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// Also request the pH-logD curve of every analyzed component
    #[arg(long)]
    pub curves: bool,

    /// Write the full result as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Override the model ID from the settings file
    #[arg(long)]
    pub model: Option<String>,

    /// Disable Google Search grounding for this run
    #[arg(long)]
    pub no_grounding: bool,

    /// Debug-level logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl AnalyzeArgs {
    fn apply_overrides(&self, settings: &mut AppSettings) {
        if let Some(model) = self.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            settings.model_id = model.to_string();
            settings.curve_model_id = model.to_string();
        }
        if self.no_grounding {
            settings.grounding_with_google_search = false;
        }
    }

    async fn smiles_block(&self) -> Result<String, CliError> {
        let mut block = self.smiles.clone().unwrap_or_default();
        if let Some(path) = &self.smiles_file {
            let contents = tokio::fs::read_to_string(path).await?;
            if !block.is_empty() {
                block.push('\n');
            }
            block.push_str(&contents);
        }
        Ok(block)
    }
}

/// JSON written by `--json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport<'a> {
    pub generated_at: DateTime<Utc>,
    pub model_id: &'a str,
    pub aggregate: Option<&'a AnalysisAggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> AnalysisExport<'a> {
    pub fn new(session: &'a AnalysisSession, model_id: &'a str, generated_at: DateTime<Utc>) -> Self {
        let error = match session.phase() {
            RunPhase::Failed(message) => Some(message.as_str()),
            _ => None,
        };
        Self { generated_at, model_id, aggregate: session.aggregate(), error }
    }
}

fn log_message(message: &RunMessage) {
    match &message.event {
        RunEvent::Method(Ok(_)) => info!("Unified method received."),
        RunEvent::Method(Err(e)) => warn!("Unified method failed: {}", e),
        RunEvent::Component { index, result: Ok(outcome) } => {
            info!("Component {} received ({}).", index + 1, outcome.analysis.component_id)
        }
        RunEvent::Component { index, result: Err(e) } => warn!("Component {} failed: {}", index + 1, e),
        RunEvent::Curve { index, result: Ok(_) } => info!("Curve for component {} received.", index + 1),
        RunEvent::Curve { index, result: Err(e) } => warn!("Curve for component {} failed: {}", index + 1, e),
    }
}

async fn settle(session: &mut AnalysisSession, rx: &mut RunReceiver) {
    while !session.is_settled() {
        // All senders gone means no task is left to report.
        let Some(message) = rx.recv().await else { break };
        log_message(&message);
        session.apply(message);
    }
}

/// Runs one analysis to completion: every component resolved and, when
/// `curves` is set, every curve requested and resolved.
pub async fn run_headless(
    backend: Arc<dyn AnalysisBackend>,
    credential: Option<Credential>,
    inputs: Vec<ComponentInput>,
    curves: bool,
) -> AnalysisSession {
    let mut session = AnalysisSession::default();
    let (run_id, inputs) = session.begin_run(inputs);

    let (tx, mut rx) = run_channel();
    tokio::spawn(dispatch_run(Arc::clone(&backend), credential.clone(), inputs, run_id, tx));
    settle(&mut session, &mut rx).await;

    if curves && !matches!(session.phase(), RunPhase::Failed(_)) {
        let (tx, mut rx) = run_channel();
        let count = session.inputs().len();
        for index in 0..count {
            if let Some(job) = session.request_curve(index) {
                tokio::spawn(dispatch_curve(Arc::clone(&backend), credential.clone(), job, tx.clone()));
            }
        }
        drop(tx);
        settle(&mut session, &mut rx).await;
        if let Some(notice) = session.notice().map(str::to_string) {
            eprintln!("{}", notice);
            session.dismiss_notice();
        }
    }
    session
}

async fn analyze(args: AnalyzeArgs) -> Result<(), CliError> {
    let mut settings = io::load_or_default();
    args.apply_overrides(&mut settings);

    let smiles_block = args.smiles_block().await?;
    let images = if args.images.is_empty() {
        Vec::new()
    } else {
        load_images(args.images.clone()).await?
    };
    let inputs = normalize_inputs(&smiles_block, &images)?;
    let (key, _) = credential::load_credential().ok_or_else(AnalysisError::missing_credential)?;

    info!("Analyzing {} component(s) with model '{}'.", inputs.len(), settings.model_id);
    let backend: Arc<dyn AnalysisBackend> = Arc::new(GeminiClient::new(settings.client_config()));
    let session = run_headless(backend, Some(key), inputs, args.curves).await;

    print!("{}", render_report(&results_view(&session)));

    if let Some(path) = &args.json {
        let export = AnalysisExport::new(&session, &settings.model_id, Utc::now());
        tokio::fs::write(path, serde_json::to_vec_pretty(&export)?).await?;
        println!("Wrote {}", path.display());
    }

    match session.phase() {
        RunPhase::Failed(message) => Err(CliError::RunFailed(message.clone())),
        _ => {
            let failed = session
                .aggregate()
                .map(|a| a.components.iter().filter(|c| matches!(c, ComponentResult::Error { .. })).count())
                .unwrap_or(0);
            if failed > 0 {
                warn!("{} component(s) could not be analyzed.", failed);
            }
            Ok(())
        }
    }
}

pub fn run(args: AnalyzeArgs) -> Result<(), CliError> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(analyze(args))
}
